use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use snafu::ResultExt;
use tracing::debug;

use crate::{
    config::ProviderConfig,
    models::{frame::RawFrame, request_params::IntradayRequest},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DecodeSnafu, InvalidUserAgentSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu,
        yahoo_rest::{
            params::{chart_url, construct_params, validate_request},
            response::ChartEnvelope,
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// The chart endpoint answers 429 to clients without a browser-like agent.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const ERROR_BODY_PREVIEW: usize = 200;

pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Creates a provider against the public endpoint with default settings.
    pub fn new() -> Result<Self, ProviderInitError> {
        Self::with_config(&ProviderConfig::default())
    }

    pub fn with_config(config: &ProviderConfig) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent).context(InvalidUserAgentSnafu)?,
        );
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DataProvider for YahooProvider {
    async fn fetch_frame(&self, request: &IntradayRequest) -> Result<RawFrame, ProviderError> {
        validate_request(request)?;
        let url = chart_url(&self.base_url, &request.symbol)?;
        debug!(%url, %request, "requesting chart");

        let response = self
            .client
            .get(url)
            .query(&construct_params(request))
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;

        // Yahoo reports unknown symbols as a 404 whose body still carries a
        // chart error; prefer that message over the bare status.
        match serde_json::from_str::<ChartEnvelope>(&body) {
            Ok(envelope) => {
                let frame = envelope.into_frame()?;
                if !status.is_success() {
                    return ApiSnafu {
                        message: format!("HTTP {status} without an error payload"),
                    }
                    .fail();
                }
                Ok(frame)
            }
            Err(_) if !status.is_success() => ApiSnafu {
                message: format!("HTTP {status}: {}", preview(&body)),
            }
            .fail(),
            Err(e) => DecodeSnafu {
                message: e.to_string(),
            }
            .fail(),
        }
    }
}

fn preview(body: &str) -> &str {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_caps_long_bodies() {
        let body = "x".repeat(500);
        assert_eq!(preview(&body).len(), ERROR_BODY_PREVIEW);
        assert_eq!(preview("  Too Many Requests \n"), "Too Many Requests");
    }

    #[test]
    fn rejects_user_agent_with_control_characters() {
        let config = ProviderConfig {
            user_agent: "bad\nagent".into(),
            ..ProviderConfig::default()
        };
        assert!(matches!(
            YahooProvider::with_config(&config),
            Err(ProviderInitError::InvalidUserAgent { .. })
        ));
    }

    #[tokio::test]
    async fn invalid_request_fails_before_any_network_call() {
        use crate::models::timeframe::{Interval, Period};

        // Unroutable base url: reaching the network would fail differently.
        let config = ProviderConfig {
            base_url: "http://0.0.0.0:9".into(),
            ..ProviderConfig::default()
        };
        let provider = YahooProvider::with_config(&config).unwrap();
        let request = IntradayRequest::new("AAPL", Period::NinetyDays, Interval::OneMinute).unwrap();

        let err = provider.fetch_frame(&request).await.unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
    }
}
