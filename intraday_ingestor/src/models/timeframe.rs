//! The two enumerated time settings a request is made of: the sampling
//! [`Interval`] and the lookback [`Period`].
//!
//! Both parse from and print as the provider's short codes (`"15m"`, `"30d"`),
//! which is also how they appear in config files and on the command line.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFrameError {
    #[error("Invalid interval '{input}': expected one of 1m, 5m, 15m, 30m, 60m")]
    InvalidInterval { input: String },

    #[error("Invalid duration '{input}': expected one of 7d, 14d, 30d, 60d, 90d")]
    InvalidPeriod { input: String },
}

/// Sampling granularity of the bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[default]
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    SixtyMinutes,
}

impl Interval {
    /// Every supported interval, in the order they are offered to the user.
    pub const ALL: [Interval; 5] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::SixtyMinutes,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::SixtyMinutes => "60m",
        }
    }

    pub const fn minutes(&self) -> u32 {
        match self {
            Interval::OneMinute => 1,
            Interval::FiveMinutes => 5,
            Interval::FifteenMinutes => 15,
            Interval::ThirtyMinutes => 30,
            Interval::SixtyMinutes => 60,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == wanted)
            .ok_or_else(|| TimeFrameError::InvalidInterval {
                input: s.to_string(),
            })
    }
}

/// Lookback window, counted in calendar days back from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "14d")]
    FourteenDays,
    #[default]
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "60d")]
    SixtyDays,
    #[serde(rename = "90d")]
    NinetyDays,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::SevenDays,
        Period::FourteenDays,
        Period::ThirtyDays,
        Period::SixtyDays,
        Period::NinetyDays,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Period::SevenDays => "7d",
            Period::FourteenDays => "14d",
            Period::ThirtyDays => "30d",
            Period::SixtyDays => "60d",
            Period::NinetyDays => "90d",
        }
    }

    pub const fn days(&self) -> u32 {
        match self {
            Period::SevenDays => 7,
            Period::FourteenDays => 14,
            Period::ThirtyDays => 30,
            Period::SixtyDays => 60,
            Period::NinetyDays => 90,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| TimeFrameError::InvalidPeriod {
                input: s.to_string(),
            })
    }
}
