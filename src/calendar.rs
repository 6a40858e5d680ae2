//! Bucketing of transactions into calendar weeks, months and years.

use chrono::{DateTime, Datelike, Days, Local, Months, NaiveDate, TimeZone};
use tracing::debug;

use std::collections::BTreeMap;

use crate::{
    error::{Error, Result},
    transaction::Transaction,
};

/// Maps the first day of each period to the transactions made in it.
///
/// Every period between the first and last transaction has an entry, empty
/// or not.
pub type Axis<'a> = BTreeMap<NaiveDate, Vec<&'a Transaction>>;

/// The same transactions bucketed by week, month and year.
#[derive(Debug, Default)]
pub struct Buckets<'a> {
    pub weekly: Axis<'a>,
    pub monthly: Axis<'a>,
    pub yearly: Axis<'a>,
}

impl<'a> Buckets<'a> {
    #[must_use]
    pub fn axis(&self, period: Period) -> &Axis<'a> {
        match period {
            Period::Week => &self.weekly,
            Period::Month => &self.monthly,
            Period::Year => &self.yearly,
        }
    }
}

/// A calendar period length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    /// Monday to Sunday.
    Week,
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Week, Period::Month, Period::Year];

    /// Returns the first day of the period containing `date`.
    #[must_use]
    pub fn start(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Week => {
                date.checked_sub_days(Days::new(date.weekday().num_days_from_monday().into()))
            }
            Period::Month => date.with_day(1),
            Period::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }
    }

    /// Returns how many periods `to` lies after `from`.
    ///
    /// Zero means both dates are in the same period. The result is negative
    /// when `to` is in an earlier period than `from`.
    #[must_use]
    pub fn between(self, from: NaiveDate, to: NaiveDate) -> Option<i64> {
        match self {
            Period::Week => Some((self.start(to)? - self.start(from)?).num_days() / 7),
            Period::Month => Some(months_between(from, to)),
            Period::Year => Some(i64::from(to.year() - from.year())),
        }
    }

    /// Returns the start of the `n`th period after the one starting at
    /// `start`.
    #[must_use]
    pub fn advance(self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Period::Week => start.checked_add_days(Days::new(7 * u64::from(n))),
            Period::Month => start.checked_add_months(Months::new(n)),
            Period::Year => start.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }
}

/// Calendar months from `from` to `to`: the full years in between, plus the
/// months left in the first year and the months gone in the last.
fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if from > to {
        return -months_between(to, from);
    }
    let (from_month, to_month) = (i64::from(from.month()), i64::from(to.month()));
    if from.year() == to.year() {
        return to_month - from_month;
    }
    let years = i64::from(to.year() - from.year());
    (years - 1) * 12 + (12 - from_month) + to_month
}

/// Returns the calendar date in `tz` of a purchase made `millis`
/// milliseconds after the epoch.
///
/// Sub-second precision is discarded before conversion.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] if the instant is outside the range
/// of representable dates.
pub fn purchase_date<Tz: TimeZone>(millis: i64, tz: &Tz) -> Result<NaiveDate> {
    DateTime::from_timestamp(millis.div_euclid(1000), 0)
        .map(|utc| utc.with_timezone(tz).date_naive())
        .ok_or(Error::InvalidTimestamp(millis))
}

/// Buckets `transactions` by week, month and year of the local calendar.
///
/// See [`bucketize_in`].
///
/// # Errors
///
/// As for [`bucketize_in`].
pub fn bucketize(transactions: &[Transaction]) -> Result<Buckets<'_>> {
    bucketize_in(transactions, &Local)
}

/// Buckets `transactions` by week, month and year of the calendar in `tz`.
///
/// `transactions` must be sorted by purchase date: the first and last
/// transactions set the range of each axis, and every period in that range
/// gets an entry. Each transaction then goes in exactly one bucket per axis.
///
/// # Examples
///
/// ```
/// # use chrono::{NaiveDate, TimeZone, Utc};
/// # use groceries::{bucketize_in, Transaction};
/// let at = |y, m, d| Transaction {
///     purchase_date: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().timestamp_millis(),
///     receipt: Vec::new(),
/// };
/// let transactions = [at(2024, 1, 10), at(2024, 3, 5)];
/// let buckets = bucketize_in(&transactions, &Utc).unwrap();
/// let february = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
/// assert_eq!(buckets.monthly.len(), 3);
/// assert!(buckets.monthly[&february].is_empty());
/// ```
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] if there are no transactions,
/// [`Error::InvalidTimestamp`] if a purchase date can't be placed on the
/// calendar, and [`Error::OutOfOrder`] if a transaction falls outside the
/// range of the first and last transactions.
pub fn bucketize_in<'a, Tz: TimeZone>(
    transactions: &'a [Transaction],
    tz: &Tz,
) -> Result<Buckets<'a>> {
    let (Some(first), Some(last)) = (transactions.first(), transactions.last()) else {
        return Err(Error::EmptyInput);
    };
    let first_date = purchase_date(first.purchase_date, tz)?;
    let last_date = purchase_date(last.purchase_date, tz)?;

    let mut axes = Vec::with_capacity(Period::ALL.len());
    for period in Period::ALL {
        let start = period
            .start(first_date)
            .ok_or(Error::InvalidTimestamp(first.purchase_date))?;
        let count = period
            .between(first_date, last_date)
            .ok_or(Error::InvalidTimestamp(last.purchase_date))?
            + 1;
        if count < 1 {
            return Err(Error::OutOfOrder(last.purchase_date));
        }
        let axis = (0..count)
            .map(|n| {
                u32::try_from(n)
                    .ok()
                    .and_then(|n| period.advance(start, n))
                    .map(|date| (date, Vec::new()))
                    .ok_or(Error::InvalidTimestamp(last.purchase_date))
            })
            .collect::<Result<Vec<_>>>()?;
        axes.push((period, axis));
    }

    for transaction in transactions {
        let date = purchase_date(transaction.purchase_date, tz)?;
        for (period, axis) in &mut axes {
            let bucket = period
                .between(first_date, date)
                .and_then(|index| usize::try_from(index).ok())
                .and_then(|index| axis.get_mut(index))
                .ok_or(Error::OutOfOrder(transaction.purchase_date))?;
            bucket.1.push(transaction);
        }
    }

    let mut buckets = Buckets::default();
    for (period, axis) in axes {
        let map = match period {
            Period::Week => &mut buckets.weekly,
            Period::Month => &mut buckets.monthly,
            Period::Year => &mut buckets.yearly,
        };
        map.extend(axis);
    }
    debug!(
        transactions = transactions.len(),
        weeks = buckets.weekly.len(),
        months = buckets.monthly.len(),
        years = buckets.yearly.len(),
        "bucketed transactions"
    );
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> Transaction {
        Transaction {
            purchase_date: Utc
                .with_ymd_and_hms(year, month, day, hour, 30, 0)
                .unwrap()
                .timestamp_millis(),
            receipt: Vec::new(),
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn bucketize_fn_returns_error_for_empty_input() {
        assert_eq!(bucketize(&[]).unwrap_err(), Error::EmptyInput);
    }

    #[test]
    fn bucketize_fn_gives_single_transaction_one_bucket_per_axis() {
        let transactions = [at(2024, 5, 16, 9)];
        let buckets = bucketize_in(&transactions, &Utc).unwrap();
        assert_eq!(buckets.weekly.keys().collect::<Vec<_>>(), [&date(2024, 5, 13)]);
        assert_eq!(buckets.monthly.keys().collect::<Vec<_>>(), [&date(2024, 5, 1)]);
        assert_eq!(buckets.yearly.keys().collect::<Vec<_>>(), [&date(2024, 1, 1)]);
        for period in Period::ALL {
            assert_eq!(buckets.axis(period).values().next().unwrap().len(), 1);
        }
    }

    #[test]
    fn bucketize_fn_puts_week_spanning_new_year_in_one_bucket() {
        let transactions = [at(2023, 12, 28, 18), at(2024, 1, 3, 8)];
        let buckets = bucketize_in(&transactions, &Utc).unwrap();
        assert_eq!(buckets.weekly.len(), 1);
        assert_eq!(buckets.weekly[&date(2023, 12, 25)].len(), 2);
        assert_eq!(
            buckets.monthly.keys().collect::<Vec<_>>(),
            [&date(2023, 12, 1), &date(2024, 1, 1)]
        );
        assert_eq!(
            buckets.yearly.keys().collect::<Vec<_>>(),
            [&date(2023, 1, 1), &date(2024, 1, 1)]
        );
    }

    #[test]
    fn bucketize_fn_merges_same_week_regardless_of_hour() {
        let transactions = [at(2024, 4, 8, 0), at(2024, 4, 14, 23)];
        let buckets = bucketize_in(&transactions, &Utc).unwrap();
        assert_eq!(buckets.weekly.len(), 1);
        assert_eq!(buckets.weekly[&date(2024, 4, 8)].len(), 2);
    }

    #[test]
    fn bucketize_fn_fills_gaps_with_empty_buckets() {
        let transactions = [at(2024, 1, 1, 10), at(2024, 1, 2, 10), at(2024, 3, 20, 10)];
        let buckets = bucketize_in(&transactions, &Utc).unwrap();
        assert_eq!(buckets.weekly.len(), 12, "wrong weeks");
        assert_eq!(buckets.monthly.len(), 3, "wrong months");
        assert_eq!(buckets.yearly.len(), 1, "wrong years");
        assert_eq!(buckets.weekly[&date(2024, 1, 1)].len(), 2);
        assert!(buckets.weekly[&date(2024, 2, 12)].is_empty());
        assert!(buckets.monthly[&date(2024, 2, 1)].is_empty());
        assert_eq!(buckets.weekly[&date(2024, 3, 18)], vec![&transactions[2]]);
    }

    #[test]
    fn bucketize_fn_generates_contiguous_axes() {
        let transactions = [at(2021, 11, 30, 7), at(2022, 6, 1, 7), at(2024, 2, 29, 7)];
        let buckets = bucketize_in(&transactions, &Utc).unwrap();
        for period in Period::ALL {
            let starts: Vec<_> = buckets.axis(period).keys().copied().collect();
            for pair in starts.windows(2) {
                assert_eq!(period.advance(pair[0], 1), Some(pair[1]), "{period:?}");
                assert_eq!(period.between(pair[0], pair[1]), Some(1), "{period:?}");
            }
        }
        assert_eq!(buckets.monthly.len(), 28);
        assert_eq!(buckets.yearly.len(), 4);
    }

    #[test]
    fn bucketize_fn_places_each_transaction_exactly_once_per_axis() {
        let transactions = [
            at(2023, 12, 31, 23),
            at(2024, 1, 1, 0),
            at(2024, 1, 31, 12),
            at(2024, 2, 1, 12),
            at(2024, 7, 4, 15),
        ];
        let buckets = bucketize_in(&transactions, &Utc).unwrap();
        for period in Period::ALL {
            let mut placed: Vec<i64> = buckets
                .axis(period)
                .values()
                .flatten()
                .map(|t| t.purchase_date)
                .collect();
            placed.sort_unstable();
            let expected: Vec<i64> = transactions.iter().map(|t| t.purchase_date).collect();
            assert_eq!(placed, expected, "{period:?}");
        }
    }

    #[test]
    fn bucketize_fn_returns_error_for_unsorted_input() {
        let transactions = [at(2024, 2, 10, 10), at(2024, 1, 10, 10), at(2024, 3, 10, 10)];
        assert_eq!(
            bucketize_in(&transactions, &Utc).unwrap_err(),
            Error::OutOfOrder(transactions[1].purchase_date)
        );
    }

    #[test]
    fn months_between_fn_counts_partial_years_at_each_end() {
        assert_eq!(months_between(date(2024, 3, 31), date(2024, 3, 1)), 0);
        assert_eq!(months_between(date(2024, 1, 31), date(2024, 2, 1)), 1);
        assert_eq!(months_between(date(2022, 11, 15), date(2024, 2, 1)), 15);
        assert_eq!(months_between(date(2024, 2, 1), date(2022, 11, 15)), -15);
    }

    #[test]
    fn purchase_date_fn_floors_sub_second_remainder() {
        assert_eq!(purchase_date(-1, &Utc).unwrap(), date(1969, 12, 31));
        assert_eq!(purchase_date(86_399_999, &Utc).unwrap(), date(1970, 1, 1));
        assert_eq!(
            purchase_date(i64::MAX, &Utc).unwrap_err(),
            Error::InvalidTimestamp(i64::MAX)
        );
    }
}
