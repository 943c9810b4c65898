//! Fetch intraday bars for a ticker and pivot their closing prices into a
//! date by time-of-day matrix.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod retry;

pub use errors::Error;
