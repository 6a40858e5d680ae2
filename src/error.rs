use thiserror::Error;

/// Errors from bucketing transactions by calendar period.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// There were no transactions to define a date range from.
    #[error("no transactions to bucket")]
    EmptyInput,

    /// A purchase date can't be represented as a calendar date.
    #[error("purchase date {0} ms is out of range")]
    InvalidTimestamp(i64),

    /// A transaction falls outside the range set by the first and last
    /// transactions, which means the input wasn't sorted.
    #[error("purchase date {0} ms is outside the first..last range; transactions must be sorted by purchase date")]
    OutOfOrder(i64),
}

/// Result type alias for bucketing.
pub type Result<T> = std::result::Result<T, Error>;
