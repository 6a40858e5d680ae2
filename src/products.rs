use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
};

use crate::{
    kr::Kr,
    transaction::{LineItem, Transaction, UNKNOWN_CODE},
};

/// A product, as identified by its product code.
///
/// Two products are equal if their codes are equal. The other fields are
/// for display only, taken from whichever line item introduced the product.
#[derive(Clone, Debug)]
pub struct Product {
    pub code: i64,
    pub text: String,
    pub description: String,
    pub group_code: i64,
    pub group_description: String,
    pub volume: f64,
    /// Price on the first line item seen for this product.
    pub amount: Kr,
}

impl Product {
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.code == UNKNOWN_CODE
    }
}

impl From<&LineItem> for Product {
    fn from(item: &LineItem) -> Self {
        Self {
            code: item.code,
            text: item.text.clone(),
            description: item.description.clone(),
            group_code: item.group_code,
            group_description: item.group_description.clone(),
            volume: item.volume,
            amount: item.amount,
        }
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

/// How many times a product was bought, and for how much in all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub count: u32,
    pub total: Kr,
}

/// Per-product tallies for a set of transactions.
///
/// Products are kept in the order they were first seen.
#[derive(Debug, Default)]
pub struct Aggregate {
    entries: Vec<(Product, Tally)>,
    by_code: HashMap<i64, usize>,
}

impl Aggregate {
    /// Returns the number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the tally for the product with `code`, if it was bought.
    #[must_use]
    pub fn get(&self, code: i64) -> Option<&Tally> {
        self.by_code.get(&code).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Product, &Tally)> {
        self.entries.iter().map(|(product, tally)| (product, tally))
    }

    /// Returns the amount spent on all products, unknown ones included.
    #[must_use]
    pub fn total(&self) -> Kr {
        self.entries.iter().map(|(_, tally)| tally.total).sum()
    }

    fn add(&mut self, item: &LineItem) {
        let next = self.entries.len();
        let index = *self.by_code.entry(item.code).or_insert(next);
        if index == next {
            self.entries.push((Product::from(item), Tally::default()));
        }
        let tally = &mut self.entries[index].1;
        tally.count += 1;
        tally.total += item.amount;
    }
}

/// Tallies every line item of every transaction in `transactions` by
/// product code.
///
/// # Examples
///
/// ```
/// # use groceries::{aggregate, Kr, LineItem, Transaction};
/// let item = |code, amount: f64| LineItem {
///     code,
///     text: "MELK".into(),
///     description: "Melk".into(),
///     group_code: 410,
///     group_description: "Meieri".into(),
///     volume: 1.0,
///     amount: Kr::from(amount),
/// };
/// let transactions = [
///     Transaction { purchase_date: 0, receipt: vec![item(5, 10.0), item(5, 5.0)] },
///     Transaction { purchase_date: 1, receipt: vec![item(0, 3.0)] },
/// ];
/// let products = aggregate(&transactions);
/// assert_eq!(products.len(), 2);
/// assert_eq!(products.get(5).unwrap().count, 2);
/// assert_eq!(products.get(5).unwrap().total, Kr::from(15.0));
/// ```
pub fn aggregate<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Aggregate {
    let mut products = Aggregate::default();
    for item in transactions.into_iter().flat_map(|t| &t.receipt) {
        products.add(item);
    }
    products
}
