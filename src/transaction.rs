use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};
use tracing::{debug, info};

use std::{fs::File, io::BufReader, path::Path};

use crate::kr::Kr;

/// Text used for any missing product or group descriptor.
pub const UNKNOWN: &str = "Unknown";

/// Product code reserved for line items with no product code.
pub const UNKNOWN_CODE: i64 = 0;

/// Defines the JSON format of a receipt export.
///
/// Only the transaction list is read; anything else in the export is ignored.
#[derive(Debug, Deserialize)]
pub struct Export {
    #[serde(rename = "TransactionsInfo")]
    pub info: TransactionsInfo,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionsInfo {
    #[serde(rename = "Transactions", default)]
    pub transactions: Vec<Transaction>,
}

impl Export {
    /// Reads a receipt export from the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns any errors from opening the file or parsing its contents.
    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let export: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))?;
        info!(
            path = %path.display(),
            transactions = export.info.transactions.len(),
            "loaded receipt export"
        );
        Ok(export)
    }

    /// Consumes the export, returning its transactions sorted by purchase
    /// date.
    ///
    /// The sort is stable, so transactions with the same timestamp keep
    /// their order from the file.
    #[must_use]
    pub fn into_sorted_transactions(self) -> Vec<Transaction> {
        let mut transactions = self.info.transactions;
        if !transactions
            .windows(2)
            .all(|pair| pair[0].purchase_date <= pair[1].purchase_date)
        {
            debug!("export is not in purchase order, sorting");
            transactions.sort_by_key(|t| t.purchase_date);
        }
        transactions
    }
}

/// A single purchase: when it happened, and what was on the receipt.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Transaction {
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "PurchaseDate")]
    pub purchase_date: i64,
    #[serde(rename = "Receipt", default)]
    pub receipt: Vec<LineItem>,
}

/// One line of a receipt.
///
/// Missing codes become [`UNKNOWN_CODE`] and missing descriptors become
/// [`UNKNOWN`] while parsing, so no field here is optional.
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(rename = "ProductCode", default)]
    #[serde_as(as = "DefaultOnNull")]
    pub code: i64,
    #[serde(rename = "Prodtxt1", default = "unknown", deserialize_with = "unknown_if_null")]
    pub text: String,
    #[serde(
        rename = "ProductDescription",
        default = "unknown",
        deserialize_with = "unknown_if_null"
    )]
    pub description: String,
    #[serde(rename = "ProductGroupCode", default)]
    #[serde_as(as = "DefaultOnNull")]
    pub group_code: i64,
    #[serde(
        rename = "ProductGroupDescription",
        default = "unknown",
        deserialize_with = "unknown_if_null"
    )]
    pub group_description: String,
    #[serde(rename = "Volume", default)]
    #[serde_as(as = "DefaultOnNull")]
    pub volume: f64,
    #[serde(rename = "Amount", default)]
    #[serde_as(as = "DefaultOnNull<PickFirst<(_, DisplayFromStr)>>")]
    pub amount: Kr,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn unknown_if_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_json_fn_correctly_parses_export() {
        let export = Export::read_json("testdata/export.json").unwrap();
        let transactions = export.info.transactions;
        assert_eq!(transactions.len(), 4, "wrong transactions");
        assert_eq!(transactions[0].purchase_date, 1_704_103_200_000);
        let milk = &transactions[0].receipt[0];
        assert_eq!(milk.code, 7_038_010_000_737);
        assert_eq!(milk.text, "LETTMELK 1L");
        assert_eq!(milk.group_code, 410);
        assert_eq!(milk.amount, Kr::from(24.9));
        assert!((milk.volume - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn read_json_fn_substitutes_unknown_for_missing_fields() {
        let export = Export::read_json("testdata/export.json").unwrap();
        let bag = &export.info.transactions[0].receipt[2];
        assert_eq!(bag.code, UNKNOWN_CODE);
        assert_eq!(bag.text, UNKNOWN);
        assert_eq!(bag.description, UNKNOWN);
        assert_eq!(bag.group_code, 0);
        assert_eq!(bag.group_description, UNKNOWN);
        assert_eq!(bag.amount, Kr::from(3.5));
    }

    #[test]
    fn read_json_fn_returns_error_for_malformed_file() {
        let err = Export::read_json("testdata/export.bad.json").unwrap_err();
        assert!(format!("{err:#}").contains("export.bad.json"));
    }

    #[test]
    fn read_json_fn_returns_error_for_missing_file() {
        assert!(Export::read_json("testdata/bogus.json").is_err());
    }

    #[test]
    fn line_item_accepts_amount_as_string() {
        let item: LineItem =
            serde_json::from_str(r#"{"ProductCode": 5, "Amount": "12,40", "Volume": null}"#)
                .unwrap();
        assert_eq!(item.amount, Kr::from(12.4));
        assert_eq!(item.volume, 0.0);
        assert_eq!(item.text, UNKNOWN);
    }

    #[test]
    fn into_sorted_transactions_fn_orders_by_purchase_date() {
        let export: Export = serde_json::from_str(
            r#"{"TransactionsInfo": {"Transactions": [
                {"PurchaseDate": 3000, "Receipt": []},
                {"PurchaseDate": 1000, "Receipt": []},
                {"PurchaseDate": 2000}
            ]}}"#,
        )
        .unwrap();
        let dates: Vec<_> = export
            .into_sorted_transactions()
            .iter()
            .map(|t| t.purchase_date)
            .collect();
        assert_eq!(dates, vec![1000, 2000, 3000]);
    }
}
