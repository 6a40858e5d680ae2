//! Text charts of spending over time and of the top products per period.

use chrono::NaiveDate;

use std::fmt::Display;

use crate::{
    calendar::{Axis, Period},
    kr::Kr,
    products::Aggregate,
    ranking::{rank_top_n, Ranking},
};

/// Width in characters of the longest bar in a chart.
const BAR_WIDTH: usize = 40;

/// Returns a bar for `value`, scaled so that `max` fills [`BAR_WIDTH`].
fn bar(value: Kr, max: Kr) -> String {
    if max.ore() <= 0 || value.ore() <= 0 {
        return String::new();
    }
    let len = i128::from(value.ore()) * BAR_WIDTH as i128 / i128::from(max.ore());
    "█".repeat(usize::try_from(len).unwrap_or(BAR_WIDTH))
}

/// Returns the title for the period starting at `start`.
#[must_use]
pub fn period_title(period: Period, start: NaiveDate) -> String {
    match period {
        Period::Week => start.format("Week of %Y-%m-%d").to_string(),
        Period::Month => start.format("%B %Y").to_string(),
        Period::Year => start.format("%Y").to_string(),
    }
}

/// Amount spent in each period of an [`Axis`].
#[derive(Debug)]
pub struct Series {
    pub title: String,
    pub points: Vec<(NaiveDate, Kr)>,
}

impl Series {
    /// Sums the line items of every transaction in each period of `axis`.
    ///
    /// Periods with no transactions get a zero point, so the series has no
    /// gaps.
    #[must_use]
    pub fn from_axis(title: &str, axis: &Axis<'_>) -> Self {
        let points = axis
            .iter()
            .map(|(start, transactions)| {
                let spent = transactions
                    .iter()
                    .flat_map(|t| &t.receipt)
                    .map(|item| item.amount)
                    .sum();
                (*start, spent)
            })
            .collect();
        Self {
            title: title.to_string(),
            points,
        }
    }
}

impl Display for Series {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        let max = self.points.iter().map(|(_, spent)| *spent).max().unwrap_or_default();
        for (start, spent) in &self.points {
            let bar = bar(*spent, max);
            writeln!(f, "{start} {bar:BAR_WIDTH$} {spent:>12}")?;
        }
        Ok(())
    }
}

/// Several [`Series`] under one heading.
#[derive(Debug)]
pub struct SpendingChart {
    pub title: String,
    pub series: Vec<Series>,
}

impl SpendingChart {
    /// Builds the weekly and monthly spending chart.
    #[must_use]
    pub fn weekly_and_monthly(title: &str, weekly: &Axis<'_>, monthly: &Axis<'_>) -> Self {
        Self {
            title: title.to_string(),
            series: vec![
                Series::from_axis("Per week", weekly),
                Series::from_axis("Per month", monthly),
            ],
        }
    }
}

impl Display for SpendingChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{:=<length$}", "", length = self.title.chars().count())?;
        for series in &self.series {
            writeln!(f)?;
            write!(f, "{series}")?;
        }
        Ok(())
    }
}

/// One bar of a [`ProductChart`].
#[derive(Debug, PartialEq)]
pub struct Row {
    pub text: String,
    pub unit_price: Kr,
    pub count: u32,
    pub total: Kr,
}

#[derive(Debug, PartialEq)]
enum Body {
    Insufficient { unknown_total: Kr },
    Ranked { total: Kr, unknown_total: Kr, rows: Vec<Row> },
}

/// A horizontal bar chart of the top products bought in a period.
///
/// To get a printable version of the chart, use its [`Display`]
/// implementation.
#[derive(Debug)]
pub struct ProductChart {
    title: String,
    body: Body,
}

impl ProductChart {
    /// Ranks `products` and keeps the top `n` as bars.
    #[must_use]
    pub fn new(title: impl Into<String>, products: &Aggregate, n: usize) -> Self {
        let body = match rank_top_n(products, n) {
            Ranking::Insufficient { unknown_total } => Body::Insufficient { unknown_total },
            Ranking::Ranked(top) => Body::Ranked {
                total: top.total,
                unknown_total: top.unknown_total,
                rows: top
                    .ranked
                    .into_iter()
                    .map(|(product, tally)| Row {
                        text: product.text.clone(),
                        unit_price: product.amount,
                        count: tally.count,
                        total: tally.total,
                    })
                    .collect(),
            },
        };
        Self {
            title: title.into(),
            body,
        }
    }

    /// Returns the bars of the chart, largest first.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match &self.body {
            Body::Ranked { rows, .. } => rows,
            Body::Insufficient { .. } => &[],
        }
    }
}

impl Display for ProductChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (total, unknown_total, rows) = match &self.body {
            Body::Insufficient { unknown_total } => {
                return writeln!(
                    f,
                    "{} has unknown products worth kr {unknown_total} ,-",
                    self.title
                );
            }
            Body::Ranked {
                total,
                unknown_total,
                rows,
            } => (total, unknown_total, rows),
        };
        writeln!(f, "{} - kr {total},-", self.title)?;
        writeln!(f, "Ukjent: kr {unknown_total},-")?;
        let width = rows
            .iter()
            .map(|row| row.text.chars().count())
            .max()
            .unwrap_or(0);
        let max = rows.first().map(|row| row.total).unwrap_or_default();
        for row in rows {
            let bar = bar(row.total, max);
            writeln!(
                f,
                "{:width$} {bar:BAR_WIDTH$} {:<7.2} * {:>2} = {}",
                row.text, row.unit_price, row.count, row.total
            )?;
        }
        Ok(())
    }
}
