//! Shape validation and the close-price pivot.

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{
    bar::Bar,
    bar_series::{BarSeries, BarSeriesError},
    frame::{RawFrame, columns},
    price_matrix::PriceMatrix,
    timeframe::Interval,
};

/// Names the timestamp column may go by, in order of preference.
pub const TIMESTAMP_ALIASES: [&str; 2] = [columns::DATETIME, columns::DATE];

/// What to do when two rows land on the same date and time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail the request with a duplicate-key error.
    #[default]
    Reject,
    /// Keep the row that came later in the provider's response.
    LastWins,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Reject => f.write_str("reject"),
            DuplicatePolicy::LastWins => f.write_str("last-wins"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "last-wins" | "last_wins" | "last" => Ok(DuplicatePolicy::LastWins),
            other => Err(format!(
                "unknown duplicate policy '{other}': expected reject or last-wins"
            )),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ReshapeError {
    /// None of the accepted names for a required column is present with the
    /// expected type.
    #[error("no {} column found", quoted(.expected))]
    MissingColumn { expected: Vec<&'static str> },

    #[error("more than one bar at {timestamp}")]
    DuplicateTimestamp { timestamp: NaiveDateTime },
}

impl From<BarSeriesError> for ReshapeError {
    fn from(err: BarSeriesError) -> Self {
        match err {
            BarSeriesError::NotIncreasing { current, .. } => {
                ReshapeError::DuplicateTimestamp { timestamp: current }
            }
        }
    }
}

/// `'Datetime' or 'date'`
pub(crate) fn quoted(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Picks the first alias that names a timestamp column in `frame`.
pub fn resolve_timestamp_column(frame: &RawFrame) -> Option<(&'static str, &[NaiveDateTime])> {
    TIMESTAMP_ALIASES
        .into_iter()
        .find_map(|alias| frame.timestamps(alias).map(|ts| (alias, ts)))
}

/// Reads the frame's rows into a strictly increasing [`BarSeries`].
///
/// Rows are sorted by timestamp; rows without a close are skipped. Rows that
/// share a timestamp are handled per `policy`.
pub fn frame_to_series(
    symbol: &str,
    interval: Interval,
    frame: &RawFrame,
    policy: DuplicatePolicy,
) -> Result<BarSeries, ReshapeError> {
    let (ts_column, timestamps) =
        resolve_timestamp_column(frame).ok_or_else(|| ReshapeError::MissingColumn {
            expected: TIMESTAMP_ALIASES.to_vec(),
        })?;
    let closes = frame
        .floats(columns::CLOSE)
        .ok_or_else(|| ReshapeError::MissingColumn {
            expected: vec![columns::CLOSE],
        })?;
    debug!(symbol, ts_column, rows = frame.height(), "frame shape accepted");

    let opens = frame.floats(columns::OPEN);
    let highs = frame.floats(columns::HIGH);
    let lows = frame.floats(columns::LOW);
    let volumes = frame.integers(columns::VOLUME);
    let at = |col: Option<&[Option<f64>]>, i: usize| col.and_then(|c| c[i]);

    let mut bars: Vec<Bar> = timestamps
        .iter()
        .zip(closes)
        .enumerate()
        .filter_map(|(i, (&timestamp, close))| {
            Some(Bar {
                timestamp,
                open: at(opens, i),
                high: at(highs, i),
                low: at(lows, i),
                close: (*close)?,
                volume: volumes.and_then(|v| v[i]),
            })
        })
        .collect();

    // Stable, so equal timestamps keep response order for last-wins.
    bars.sort_by_key(|b| b.timestamp);
    let bars = collapse_duplicates(bars, policy)?;

    Ok(BarSeries::new(symbol, interval, bars)?)
}

fn collapse_duplicates(bars: Vec<Bar>, policy: DuplicatePolicy) -> Result<Vec<Bar>, ReshapeError> {
    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(prev) if prev.timestamp == bar.timestamp => match policy {
                DuplicatePolicy::Reject => {
                    return Err(ReshapeError::DuplicateTimestamp {
                        timestamp: bar.timestamp,
                    });
                }
                DuplicatePolicy::LastWins => {
                    debug!(timestamp = %bar.timestamp, "duplicate bar replaced");
                    *prev = bar;
                }
            },
            _ => out.push(bar),
        }
    }
    Ok(out)
}

/// Closing prices keyed by date, then time of day.
pub fn pivot_closes(series: &BarSeries) -> PriceMatrix {
    let mut matrix = PriceMatrix::new();
    for bar in series.bars() {
        matrix.insert(bar.date(), bar.time_of_day(), bar.close);
    }
    matrix
}
