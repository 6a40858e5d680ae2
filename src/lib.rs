#![doc = include_str!("../README.md")]
pub mod calendar;
pub mod chart;
pub mod error;
pub mod kr;
pub mod products;
pub mod ranking;
pub mod transaction;

pub use calendar::{bucketize, bucketize_in, Axis, Buckets, Period};
pub use chart::{period_title, ProductChart, SpendingChart};
pub use error::Error;
pub use kr::Kr;
pub use products::{aggregate, Aggregate, Product, Tally};
pub use ranking::{rank_top_n, Ranking, TopProducts};
pub use transaction::{Export, LineItem, Transaction, UNKNOWN, UNKNOWN_CODE};
