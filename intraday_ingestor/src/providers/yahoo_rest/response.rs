use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::debug;

use crate::{
    models::frame::{Column, RawFrame, columns},
    providers::{ApiSnafu, DecodeSnafu, ProviderError},
};

#[derive(Deserialize, Debug)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub exchange_timezone_name: Option<String>,
    pub gmtoffset: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

/// Where the exchange's wall clock sits relative to UTC.
#[derive(Debug, Clone, Copy)]
enum ExchangeClock {
    Named(Tz),
    Fixed(FixedOffset),
}

impl ExchangeClock {
    fn from_meta(meta: &ChartMeta) -> Self {
        if let Some(tz) = meta
            .exchange_timezone_name
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
        {
            return ExchangeClock::Named(tz);
        }
        let offset = meta
            .gmtoffset
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        ExchangeClock::Fixed(offset)
    }

    fn local(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        match self {
            ExchangeClock::Named(tz) => utc.with_timezone(tz).naive_local(),
            ExchangeClock::Fixed(offset) => utc.with_timezone(offset).naive_local(),
        }
    }
}

fn cell<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

impl ChartEnvelope {
    /// Turns the chart payload into a frame indexed by exchange-local
    /// `Datetime`, with `Open`, `High`, `Low`, `Close` and `Volume` columns.
    ///
    /// Rows where every price is null are dropped; Yahoo pads halted or
    /// not-yet-traded slots that way.
    pub fn into_frame(self) -> Result<RawFrame, ProviderError> {
        if let Some(err) = self.chart.error {
            let message = match err.description {
                Some(description) => format!("{}: {}", err.code, description),
                None => err.code,
            };
            return ApiSnafu { message }.fail();
        }

        let Some(result) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(RawFrame::new());
        };

        let clock = ExchangeClock::from_meta(&result.meta);
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let mut datetimes = Vec::with_capacity(result.timestamp.len());
        let mut open = Vec::with_capacity(result.timestamp.len());
        let mut high = Vec::with_capacity(result.timestamp.len());
        let mut low = Vec::with_capacity(result.timestamp.len());
        let mut close = Vec::with_capacity(result.timestamp.len());
        let mut volume = Vec::with_capacity(result.timestamp.len());
        let mut dropped = 0usize;

        for (i, &epoch) in result.timestamp.iter().enumerate() {
            let (o, h, l, c) = (
                cell(&quote.open, i),
                cell(&quote.high, i),
                cell(&quote.low, i),
                cell(&quote.close, i),
            );
            if o.is_none() && h.is_none() && l.is_none() && c.is_none() {
                dropped += 1;
                continue;
            }

            let utc = DateTime::from_timestamp(epoch, 0).ok_or_else(|| {
                DecodeSnafu {
                    message: format!("timestamp {epoch} is out of range"),
                }
                .build()
            })?;

            datetimes.push(clock.local(utc));
            open.push(o);
            high.push(h);
            low.push(l);
            close.push(c);
            volume.push(cell(&quote.volume, i));
        }

        debug!(
            symbol = result.meta.symbol.as_deref().unwrap_or("?"),
            rows = datetimes.len(),
            dropped,
            clock = ?clock,
            "decoded chart payload"
        );

        let decode = |e: crate::models::frame::FrameError| {
            DecodeSnafu {
                message: e.to_string(),
            }
            .build()
        };
        RawFrame::new()
            .with_column(columns::DATETIME, Column::Timestamps(datetimes))
            .and_then(|f| f.with_column(columns::OPEN, Column::Floats(open)))
            .and_then(|f| f.with_column(columns::HIGH, Column::Floats(high)))
            .and_then(|f| f.with_column(columns::LOW, Column::Floats(low)))
            .and_then(|f| f.with_column(columns::CLOSE, Column::Floats(close)))
            .and_then(|f| f.with_column(columns::VOLUME, Column::Integers(volume)))
            .map_err(decode)
    }
}
