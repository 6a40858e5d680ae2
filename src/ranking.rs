use crate::{
    kr::Kr,
    products::{Aggregate, Product, Tally},
};

/// The best-selling products in an [`Aggregate`], by amount spent.
#[derive(Debug, PartialEq)]
pub struct TopProducts<'a> {
    /// Spent on all products, unknown ones included.
    pub total: Kr,
    /// Spent on line items with no product code.
    pub unknown_total: Kr,
    /// At most `n` known products, highest total first.
    pub ranked: Vec<(&'a Product, Tally)>,
}

/// The outcome of ranking an [`Aggregate`].
#[derive(Debug, PartialEq)]
pub enum Ranking<'a> {
    /// Fewer than two distinct products were bought, which is too few to
    /// rank. Everything spent is reported as unknown.
    Insufficient { unknown_total: Kr },
    Ranked(TopProducts<'a>),
}

/// Ranks the products in `products` by amount spent, keeping the top `n`.
///
/// Products with equal totals keep the order they were first bought in.
/// The unknown product never takes one of the `n` places; its spend is
/// reported separately.
///
/// # Examples
///
/// ```
/// # use groceries::{aggregate, rank_top_n, Kr, LineItem, Ranking, Transaction};
/// let item = |code, amount: f64| LineItem {
///     code,
///     text: "BRØD".into(),
///     description: "Brød".into(),
///     group_code: 210,
///     group_description: "Bakeri".into(),
///     volume: 0.75,
///     amount: Kr::from(amount),
/// };
/// let transactions = [Transaction {
///     purchase_date: 0,
///     receipt: vec![item(5, 10.0), item(5, 5.0), item(0, 3.0)],
/// }];
/// let products = aggregate(&transactions);
/// let Ranking::Ranked(top) = rank_top_n(&products, 1) else {
///     panic!("expected a ranking");
/// };
/// assert_eq!(top.total, Kr::from(18.0));
/// assert_eq!(top.unknown_total, Kr::from(3.0));
/// assert_eq!(top.ranked.len(), 1);
/// assert_eq!(top.ranked[0].0.code, 5);
/// ```
#[must_use]
pub fn rank_top_n(products: &Aggregate, n: usize) -> Ranking<'_> {
    if products.len() < 2 {
        return Ranking::Insufficient {
            unknown_total: products.total(),
        };
    }
    let mut entries: Vec<(&Product, Tally)> = products.iter().map(|(p, t)| (p, *t)).collect();
    entries.sort_by(|(_, a), (_, b)| b.total.cmp(&a.total));

    let mut unknown_total = Kr::default();
    let mut ranked = Vec::with_capacity(n.min(entries.len()));
    for (product, tally) in entries {
        if product.is_unknown() {
            unknown_total += tally.total;
        } else if ranked.len() < n {
            ranked.push((product, tally));
        }
    }
    Ranking::Ranked(TopProducts {
        total: products.total(),
        unknown_total,
        ranked,
    })
}
