//! Canonical in-memory representation of one intraday bar.
//!
//! Providers hand back a [`RawFrame`](crate::models::frame::RawFrame); the
//! pipeline turns its rows into [`Bar`]s once the frame's shape has been
//! validated.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// A single sampled observation.
///
/// The timestamp is the provider's local wall-clock time. No time zone is
/// attached because the pivot groups by the calendar date and clock time the
/// exchange reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Start of the bar interval, exchange-local.
    pub timestamp: NaiveDateTime,

    /// Opening price. Not every row carries one.
    pub open: Option<f64>,

    /// Highest price during the bar interval.
    pub high: Option<f64>,

    /// Lowest price during the bar interval.
    pub low: Option<f64>,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: Option<u64>,
}

impl Bar {
    /// A bar that only carries a close, which is all the pivot reads.
    pub fn from_close(timestamp: NaiveDateTime, close: f64) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.timestamp.time()
    }
}
