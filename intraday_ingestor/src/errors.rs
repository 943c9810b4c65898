use thiserror::Error;

use crate::{config::ConfigError, io::sink::SinkError, providers::ProviderInitError};

/// The unified error type for the `intraday_ingestor` crate.
///
/// Pipeline failures are not here: they are reported to the user and never
/// propagate (see [`crate::pipeline::PipelineError`]).
#[derive(Debug, Error)]
pub enum Error {
    /// The provider could not be constructed (e.g., bad user agent).
    #[error("Provider error: {0}")]
    ProviderInit(#[from] ProviderInitError),

    /// An error from a matrix sink (e.g., file I/O, encoding).
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// An error related to configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
