//! A collection of bars for one symbol and interval.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{bar::Bar, timeframe::Interval};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BarSeriesError {
    /// Two neighbouring bars are out of order or share a timestamp.
    #[error("bar timestamps must be strictly increasing; {current} follows {previous}")]
    NotIncreasing {
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
}

/// Represents a complete set of bars for a single symbol.
///
/// Timestamps are strictly increasing. The series may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    symbol: String,
    interval: Interval,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        bars: Vec<Bar>,
    ) -> Result<Self, BarSeriesError> {
        if let Some(pair) = bars
            .windows(2)
            .find(|pair| pair[0].timestamp >= pair[1].timestamp)
        {
            return Err(BarSeriesError::NotIncreasing {
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }

        Ok(Self {
            symbol: symbol.into(),
            interval,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}
