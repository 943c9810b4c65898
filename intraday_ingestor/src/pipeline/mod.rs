//! Fetch, validate and reshape intraday bars into a [`PriceMatrix`].
//!
//! [`try_fetch_and_reshape`] returns every failure as a [`PipelineError`].
//! [`fetch_and_reshape`] is the user-facing form: it reports the failure
//! through a [`Reporter`] and returns [`FetchOutcome::Empty`] instead.

pub mod report;
pub mod reshape;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    models::{price_matrix::PriceMatrix, request_params::IntradayRequest},
    pipeline::{
        report::{Notice, Reporter, Severity},
        reshape::{DuplicatePolicy, ReshapeError, frame_to_series, pivot_closes, quoted},
    },
    providers::{DataProvider, ProviderError},
};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The provider call itself failed (after any retries).
    #[error("Error fetching data for {symbol}: {source}")]
    FetchFailed {
        symbol: String,
        #[source]
        source: ProviderError,
    },

    /// The provider answered with no usable rows.
    #[error("No data returned for {symbol}.")]
    NoData { symbol: String },

    /// The provider's table lacks a column the pivot needs.
    #[error("Invalid data format for {symbol}. No {} column found.", quoted(.expected))]
    MalformedSchema {
        symbol: String,
        expected: Vec<&'static str>,
    },

    /// Two rows share a date and time of day under [`DuplicatePolicy::Reject`].
    #[error("Duplicate bar for {symbol} at {date} {time}.")]
    DuplicateKey {
        symbol: String,
        date: NaiveDate,
        time: NaiveTime,
    },
}

impl PipelineError {
    pub fn symbol(&self) -> &str {
        match self {
            PipelineError::FetchFailed { symbol, .. }
            | PipelineError::NoData { symbol }
            | PipelineError::MalformedSchema { symbol, .. }
            | PipelineError::DuplicateKey { symbol, .. } => symbol,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            PipelineError::NoData { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    fn from_reshape(symbol: &str, err: ReshapeError) -> Self {
        match err {
            ReshapeError::MissingColumn { expected } => PipelineError::MalformedSchema {
                symbol: symbol.to_string(),
                expected,
            },
            ReshapeError::DuplicateTimestamp { timestamp } => PipelineError::DuplicateKey {
                symbol: symbol.to_string(),
                date: timestamp.date(),
                time: timestamp.time(),
            },
        }
    }
}

impl From<&PipelineError> for Notice {
    fn from(err: &PipelineError) -> Self {
        Notice {
            severity: err.severity(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub on_duplicate: DuplicatePolicy,
}

/// Result of one user-triggered fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Matrix(PriceMatrix),
    /// Nothing to show; the reason has already been reported.
    Empty(PipelineError),
}

impl FetchOutcome {
    pub fn matrix(&self) -> Option<&PriceMatrix> {
        match self {
            FetchOutcome::Matrix(m) => Some(m),
            FetchOutcome::Empty(_) => None,
        }
    }

    pub fn into_matrix(self) -> Option<PriceMatrix> {
        match self {
            FetchOutcome::Matrix(m) => Some(m),
            FetchOutcome::Empty(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FetchOutcome::Empty(_))
    }
}

pub async fn try_fetch_and_reshape<P: DataProvider + ?Sized>(
    provider: &P,
    request: &IntradayRequest,
    options: &PipelineOptions,
) -> Result<PriceMatrix, PipelineError> {
    let symbol = request.symbol.as_str();
    debug!(%request, "fetching intraday bars");

    let frame = provider
        .fetch_frame(request)
        .await
        .map_err(|source| PipelineError::FetchFailed {
            symbol: symbol.to_string(),
            source,
        })?;

    if frame.is_empty() {
        return Err(PipelineError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let series = frame_to_series(symbol, request.interval, &frame, options.on_duplicate)
        .map_err(|e| PipelineError::from_reshape(symbol, e))?;

    // Every row had a null close.
    if series.is_empty() {
        return Err(PipelineError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let matrix = pivot_closes(&series);
    info!(
        symbol,
        dates = matrix.row_count(),
        cells = matrix.len(),
        "reshaped closing prices"
    );
    Ok(matrix)
}

/// Runs the pipeline for one request. Failures are reported, never returned.
pub async fn fetch_and_reshape<P: DataProvider + ?Sized>(
    provider: &P,
    request: &IntradayRequest,
    options: &PipelineOptions,
    reporter: &dyn Reporter,
) -> FetchOutcome {
    match try_fetch_and_reshape(provider, request, options).await {
        Ok(matrix) => FetchOutcome::Matrix(matrix),
        Err(err) => {
            warn!(symbol = err.symbol(), error = %err, "no matrix produced");
            reporter.report(&Notice::from(&err));
            FetchOutcome::Empty(err)
        }
    }
}
