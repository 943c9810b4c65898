use crate::{
    cli::commands::Cli,
    config::{AppConfig, ConfigError, DefaultsConfig, load_config_path},
    models::{
        request_params::{EmptySymbolError, IntradayRequest},
        timeframe::{Interval, Period},
    },
};

/// Layers the command-line flags over the config file and environment.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => AppConfig::default(),
    };
    config.apply_env_overrides();
    apply_flags(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_flags(config: &mut AppConfig, cli: &Cli) {
    if cli.retry.retry {
        config.retry.enabled = true;
    }
    if cli.retry.no_retry {
        config.retry.enabled = false;
    }
    if let Some(n) = cli.retry.max_attempts {
        config.retry.max_attempts = n;
    }
    if let Some(ms) = cli.retry.delay_ms {
        config.retry.delay_ms = ms;
    }
    if let Some(policy) = cli.on_duplicate {
        config.pivot.on_duplicate = policy;
    }
}

/// Fills omitted `fetch` arguments from the configured defaults.
pub fn resolve_request(
    symbol: Option<&str>,
    duration: Option<Period>,
    interval: Option<Interval>,
    defaults: &DefaultsConfig,
) -> Result<IntradayRequest, EmptySymbolError> {
    IntradayRequest::new(
        symbol.unwrap_or(&defaults.symbol),
        duration.unwrap_or(defaults.duration),
        interval.unwrap_or(defaults.interval),
    )
}
