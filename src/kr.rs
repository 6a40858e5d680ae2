use serde::Deserialize;

use std::{
    fmt::{Debug, Display},
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

/// Represents an amount of money in Norwegian kroner.
///
/// The amount is stored internally as an integer number of øre, so sums are
/// exact and don't depend on the order they're taken in. The [`Display`]
/// implementation formats it as kroner to 2 decimal places, unless the caller
/// asks for a different precision.
///
/// # Examples
///
/// ```
/// # use groceries::Kr;
/// let price = Kr::from(24.9) + "5,10".parse::<Kr>().unwrap();
/// assert_eq!(price.to_string(), "30.00");
/// assert_eq!(format!("{price:>8}"), "   30.00");
/// ```
#[derive(Clone, Copy, Default, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(from = "f64")]
pub struct Kr(i64);

impl Kr {
    /// Returns the amount as a number of øre.
    #[must_use]
    pub fn ore(self) -> i64 {
        self.0
    }

    /// Returns the amount in kroner, for scaling and plotting.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Debug for Kr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Kr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kroner = self.as_f64();
        if f.precision().is_some() {
            return Display::fmt(&kroner, f);
        }
        f.pad(&format!("{kroner:.2}"))
    }
}

impl From<f64> for Kr {
    #[allow(clippy::cast_possible_truncation)]
    fn from(kroner: f64) -> Self {
        Self((kroner * 100.0).round() as i64)
    }
}

impl FromStr for Kr {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let kroner: f64 = s.trim().replace(',', ".").parse()?;
        Ok(Self::from(kroner))
    }
}

impl Add for Kr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Kr {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Kr {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
