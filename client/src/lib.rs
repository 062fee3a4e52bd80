//! Insert benchmark rows into the `phase1_benchmarks` table over its REST API.
//!
//! Build a [`Config`] once (normally with [`Config::from_env`]) and hand it to [`log_row`], or keep a [`RowLogger`]
//! around if you are logging more than one row.  Every call is exactly one POST; nothing is retried.
pub mod config;
pub mod error;
pub mod sender;

#[cfg(any(test, feature = "test-util"))]
pub mod test_support;

pub use benchlog_payloads::{BenchmarkRow, RowError};
pub use config::Config;
pub use error::{Error, Result};
pub use sender::{log_row, Inserted, RowLogger};
