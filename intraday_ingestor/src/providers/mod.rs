//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the seam between the
//! pipeline and whichever vendor serves intraday bars. A provider's only job
//! is to turn an [`IntradayRequest`] into a [`RawFrame`] or an error; schema
//! validation and reshaping happen in [`crate::pipeline`].
//!
//! The trait is async and object safe, so providers can be chosen at runtime
//! (`Box<dyn DataProvider>`) and wrapped by middleware such as
//! [`RetryingProvider`](crate::retry::RetryingProvider).
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use intraday_ingestor::models::{frame::RawFrame, request_params::IntradayRequest};
//! use intraday_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_frame(&self, _request: &IntradayRequest) -> Result<RawFrame, ProviderError> {
//!         Ok(RawFrame::new())
//!     }
//! }
//! ```

pub mod yahoo_rest;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};
use tracing::info;

use crate::{
    config::AppConfig,
    errors::Error,
    models::{frame::RawFrame, request_params::IntradayRequest},
    retry::RetryingProvider,
};

/// Trait for fetching intraday bars from a market data provider.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetches the bars for one request as a named-column table.
    ///
    /// An empty frame is a successful answer (no bars in the window). Any
    /// failure to get an answer at all is an `Err`.
    async fn fetch_frame(&self, request: &IntradayRequest) -> Result<RawFrame, ProviderError>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Box<P> {
    async fn fetch_frame(&self, request: &IntradayRequest) -> Result<RawFrame, ProviderError> {
        (**self).fetch_frame(request).await
    }
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// User agent contains characters not allowed in a header.
    #[snafu(display("Invalid user agent: {source}"))]
    InvalidUserAgent {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with an error (e.g., unknown symbol).
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// The provider answered but the body could not be understood.
    #[snafu(display("Could not decode provider response: {message}"))]
    Decode {
        message: String,
        backtrace: Backtrace,
    },
}

/// Build the provider described by the configuration, wrapped in the retry
/// policy when retries are enabled.
pub fn build_provider(config: &AppConfig) -> Result<Box<dyn DataProvider>, Error> {
    let yahoo = yahoo_rest::provider::YahooProvider::with_config(&config.provider)?;
    match config.retry.policy()? {
        Some(policy) => {
            info!(
                max_attempts = policy.max_attempts.get(),
                delay_ms = policy.delay.as_millis() as u64,
                "retry enabled"
            );
            Ok(Box::new(RetryingProvider::new(yahoo, policy)))
        }
        None => Ok(Box::new(yahoo)),
    }
}
