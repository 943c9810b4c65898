use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::timeframe::{Interval, Period};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("ticker symbol cannot be empty")]
pub struct EmptySymbolError;

/// One user request: which symbol, how far back, and at what granularity.
///
/// The symbol is free text. It is trimmed and upper-cased but never checked
/// against an exchange list; an unknown symbol is the provider's to reject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntradayRequest {
    pub symbol: String,
    pub period: Period,
    pub interval: Interval,
}

impl IntradayRequest {
    pub fn new(symbol: &str, period: Period, interval: Interval) -> Result<Self, EmptySymbolError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(EmptySymbolError);
        }
        Ok(Self {
            symbol: symbol.to_uppercase(),
            period,
            interval,
        })
    }

    /// Heading shown above a rendered matrix.
    pub fn title(&self) -> String {
        format!(
            "{} - {} Interval Closing Prices for the Last {}",
            self.symbol, self.interval, self.period
        )
    }
}

impl fmt::Display for IntradayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} @ {})", self.symbol, self.period, self.interval)
    }
}
