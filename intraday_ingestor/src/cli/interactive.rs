//! Terminal prompts standing in for the symbol box, the two dropdowns and
//! the fetch button.

use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

use crate::{
    config::DefaultsConfig,
    models::{
        request_params::IntradayRequest,
        timeframe::{Interval, Period},
    },
};

pub fn prompt_request(defaults: &DefaultsConfig) -> dialoguer::Result<IntradayRequest> {
    let theme = ColorfulTheme::default();

    let symbol: String = Input::with_theme(&theme)
        .with_prompt("Ticker symbol")
        .default(defaults.symbol.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("symbol cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let period = Period::ALL[Select::with_theme(&theme)
        .with_prompt("Duration")
        .items(&Period::ALL.map(|p| p.as_str()))
        .default(position(&Period::ALL, defaults.duration))
        .interact()?];

    let interval = Interval::ALL[Select::with_theme(&theme)
        .with_prompt("Interval")
        .items(&Interval::ALL.map(|i| i.as_str()))
        .default(position(&Interval::ALL, defaults.interval))
        .interact()?];

    IntradayRequest::new(&symbol, period, interval)
        .map_err(|e| dialoguer::Error::IO(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))
}

pub fn confirm_again() -> dialoguer::Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Fetch another?")
        .default(true)
        .interact()
}

fn position<T: PartialEq>(options: &[T], value: T) -> usize {
    options.iter().position(|o| *o == value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_follows_config() {
        assert_eq!(position(&Period::ALL, Period::ThirtyDays), 2);
        assert_eq!(position(&Interval::ALL, Interval::FifteenMinutes), 2);
    }
}
