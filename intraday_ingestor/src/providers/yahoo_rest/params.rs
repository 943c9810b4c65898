use reqwest::Url;

use crate::{
    models::{request_params::IntradayRequest, timeframe::Interval},
    providers::{ProviderError, ValidationSnafu},
};

/// Longest window the chart endpoint serves for 1-minute bars in one request.
pub const MAX_ONE_MINUTE_DAYS: u32 = 7;

/// Rejects requests the endpoint is known to refuse, before spending a round
/// trip on them.
pub fn validate_request(request: &IntradayRequest) -> Result<(), ProviderError> {
    if request.symbol.trim().is_empty() {
        return ValidationSnafu {
            message: "symbol cannot be empty",
        }
        .fail();
    }
    if request.interval == Interval::OneMinute && request.period.days() > MAX_ONE_MINUTE_DAYS {
        return ValidationSnafu {
            message: format!(
                "1m bars are limited to {MAX_ONE_MINUTE_DAYS} days per request, got {}",
                request.period
            ),
        }
        .fail();
    }
    Ok(())
}

/// `{base}/v8/finance/chart/{symbol}`, with the symbol percent-encoded as a
/// single path segment (`^GSPC`, `EURUSD=X` and `BRK/B` stay one segment).
pub fn chart_url(base_url: &str, symbol: &str) -> Result<Url, ProviderError> {
    let mut url = Url::parse(base_url).map_err(|e| {
        ValidationSnafu {
            message: format!("invalid base url '{base_url}': {e}"),
        }
        .build()
    })?;

    url.path_segments_mut()
        .map_err(|_| {
            ValidationSnafu {
                message: format!("base url '{base_url}' cannot carry a path"),
            }
            .build()
        })?
        .pop_if_empty()
        .extend(["v8", "finance", "chart", symbol]);

    Ok(url)
}

pub fn construct_params(request: &IntradayRequest) -> Vec<(&'static str, String)> {
    vec![
        ("range", request.period.to_string()),
        ("interval", request.interval.to_string()),
        ("includePrePost", "false".to_string()),
        ("events", "div,splits".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timeframe::Period;

    #[test]
    fn one_minute_bars_are_capped_at_a_week() {
        let ok = IntradayRequest::new("AAPL", Period::SevenDays, Interval::OneMinute).unwrap();
        assert!(validate_request(&ok).is_ok());

        let too_long = IntradayRequest::new("AAPL", Period::FourteenDays, Interval::OneMinute).unwrap();
        let err = validate_request(&too_long).unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
        assert!(err.to_string().contains("limited to 7 days"));

        let coarse = IntradayRequest::new("AAPL", Period::NinetyDays, Interval::SixtyMinutes).unwrap();
        assert!(validate_request(&coarse).is_ok());
    }

    #[test]
    fn url_keeps_symbol_in_one_segment() {
        let url = chart_url("https://query1.finance.yahoo.com", "BRK/B").unwrap();
        assert_eq!(
            url.as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/BRK%2FB"
        );

        let url = chart_url("http://127.0.0.1:8080/", "7010.SR").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v8/finance/chart/7010.SR");
    }

    #[test]
    fn bad_base_url_is_a_validation_error() {
        assert!(matches!(
            chart_url("not a url", "AAPL"),
            Err(ProviderError::Validation { .. })
        ));
    }

    #[test]
    fn query_carries_range_and_interval() {
        let req = IntradayRequest::new("AAPL", Period::ThirtyDays, Interval::FifteenMinutes).unwrap();
        let params = construct_params(&req);
        assert!(params.contains(&("range", "30d".to_string())));
        assert!(params.contains(&("interval", "15m".to_string())));
        assert!(params.contains(&("includePrePost", "false".to_string())));
    }
}
