//! Text encodings of a [`PriceMatrix`].

use std::{fmt, str::FromStr};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::models::{price_matrix::PriceMatrix, request_params::IntradayRequest};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Table => "table",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown output format '{other}' (expected table, csv or json)"
            )),
        }
    }
}

const DATE_HEADER: &str = "Date";

fn time_label(t: &NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

fn price_label(close: f64) -> String {
    if close.abs() >= 1.0 {
        format!("{close:.2}")
    } else {
        format!("{close:.4}")
    }
}

/// Titled, right-aligned table. Dates run down, times of day run across,
/// and a slot with no bar is left blank.
pub fn render_table(title: &str, matrix: &PriceMatrix) -> String {
    let times: Vec<NaiveTime> = matrix.times().into_iter().collect();

    let mut header = vec![DATE_HEADER.to_string()];
    header.extend(times.iter().map(time_label));

    let body: Vec<Vec<String>> = matrix
        .rows()
        .map(|(date, row)| {
            let mut cells = vec![date.to_string()];
            cells.extend(
                times
                    .iter()
                    .map(|t| row.get(t).map(|c| price_label(*c)).unwrap_or_default()),
            );
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            body.iter()
                .map(|r| r[col].len())
                .chain(std::iter::once(header[col].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    for line in std::iter::once(&header).chain(body.iter()) {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, w))| {
                if i == 0 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// `Date,<HH:MM...>` header, one record per date, empty fields for gaps.
pub fn render_csv(matrix: &PriceMatrix) -> Result<Vec<u8>, csv::Error> {
    let times: Vec<NaiveTime> = matrix.times().into_iter().collect();
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![DATE_HEADER.to_string()];
    header.extend(times.iter().map(time_label));
    writer.write_record(&header)?;

    for (date, row) in matrix.rows() {
        let mut record = vec![date.to_string()];
        record.extend(
            times
                .iter()
                .map(|t| row.get(t).map(|c| c.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[derive(Serialize)]
struct JsonReport<'a> {
    symbol: &'a str,
    duration: &'a str,
    interval: &'a str,
    title: String,
    closes: &'a PriceMatrix,
}

pub fn render_json(request: &IntradayRequest, matrix: &PriceMatrix) -> serde_json::Result<String> {
    let report = JsonReport {
        symbol: &request.symbol,
        duration: request.period.as_str(),
        interval: request.interval.as_str(),
        title: request.title(),
        closes: matrix,
    };
    let mut text = serde_json::to_string_pretty(&report)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::timeframe::{Interval, Period};

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample() -> PriceMatrix {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let mut m = PriceMatrix::new();
        m.insert(d1, hm(9, 30), 185.0);
        m.insert(d1, hm(9, 45), 185.5);
        m.insert(d2, hm(9, 45), 184.25);
        m
    }

    #[test]
    fn table_leaves_missing_slots_blank() {
        let text = render_table("AAPL - 15m Interval Closing Prices for the Last 30d", &sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "AAPL - 15m Interval Closing Prices for the Last 30d");
        assert_eq!(lines[1], "Date         09:30   09:45");
        assert_eq!(lines[2], "2024-01-02  185.00  185.50");
        assert_eq!(lines[3], "2024-01-03          184.25");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn small_prices_keep_more_digits() {
        assert_eq!(price_label(0.01234), "0.0123");
        assert_eq!(price_label(12.3), "12.30");
    }

    #[test]
    fn csv_has_date_then_times() {
        let bytes = render_csv(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "Date,09:30,09:45\n2024-01-02,185,185.5\n2024-01-03,,184.25\n"
        );
    }

    #[test]
    fn json_nests_closes_by_date_then_time() {
        let request = IntradayRequest::new("aapl", Period::ThirtyDays, Interval::FifteenMinutes).unwrap();
        let text = render_json(&request, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["interval"], "15m");
        assert_eq!(value["closes"]["2024-01-02"]["09:45:00"], 185.5);
        assert!(value["closes"]["2024-01-03"].get("09:30:00").is_none());
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
