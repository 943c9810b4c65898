use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, ResultExt, Snafu};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::{
    io::render::{OutputFormat, render_csv, render_json, render_table},
    models::{price_matrix::PriceMatrix, request_params::IntradayRequest},
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// Writing to stdout or the output file failed.
    #[snafu(display("I/O error: {source}"))]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The matrix could not be encoded as CSV.
    #[snafu(display("CSV encoding failed: {source}"))]
    Csv {
        source: csv::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("JSON encoding failed: {source}"))]
    Json {
        source: serde_json::Error,
        backtrace: Backtrace,
    },
}

/// Where a sink puts its bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SinkTarget {
    #[default]
    Stdout,
    File(PathBuf),
}

impl SinkTarget {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map_or(SinkTarget::Stdout, SinkTarget::File)
    }

    /// Writes `bytes` in full and returns how many were written.
    pub async fn write_all(&self, bytes: &[u8]) -> Result<usize, SinkError> {
        match self {
            SinkTarget::Stdout => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(bytes).await.context(IoSnafu)?;
                stdout.flush().await.context(IoSnafu)?;
            }
            SinkTarget::File(path) => {
                tokio::fs::write(path, bytes).await.context(IoSnafu)?;
                info!(path = %path.display(), bytes = bytes.len(), "wrote output file");
            }
        }
        Ok(bytes.len())
    }
}

#[async_trait]
pub trait MatrixSink {
    /// What a successful write reports back, e.g. bytes or records written.
    type Output;

    async fn write(
        &self,
        request: &IntradayRequest,
        matrix: &PriceMatrix,
    ) -> Result<Self::Output, SinkError>;
}

/// Aligned text table under the request title.
#[derive(Debug, Clone, Default)]
pub struct TableSink {
    pub target: SinkTarget,
}

#[async_trait]
impl MatrixSink for TableSink {
    /// Bytes written.
    type Output = usize;

    async fn write(&self, request: &IntradayRequest, matrix: &PriceMatrix) -> Result<usize, SinkError> {
        let text = render_table(&request.title(), matrix);
        self.target.write_all(text.as_bytes()).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvSink {
    pub target: SinkTarget,
}

#[async_trait]
impl MatrixSink for CsvSink {
    /// Data records written, header excluded.
    type Output = usize;

    async fn write(&self, _request: &IntradayRequest, matrix: &PriceMatrix) -> Result<usize, SinkError> {
        let bytes = render_csv(matrix).context(CsvSnafu)?;
        self.target.write_all(&bytes).await?;
        Ok(matrix.row_count())
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonSink {
    pub target: SinkTarget,
}

#[async_trait]
impl MatrixSink for JsonSink {
    /// The document that was written.
    type Output = String;

    async fn write(&self, request: &IntradayRequest, matrix: &PriceMatrix) -> Result<String, SinkError> {
        let text = render_json(request, matrix).context(JsonSnafu)?;
        self.target.write_all(text.as_bytes()).await?;
        Ok(text)
    }
}

/// Writes `matrix` with the sink matching `format`.
pub async fn write_matrix(
    format: OutputFormat,
    target: SinkTarget,
    request: &IntradayRequest,
    matrix: &PriceMatrix,
) -> Result<(), SinkError> {
    match format {
        OutputFormat::Table => {
            TableSink { target }.write(request, matrix).await?;
        }
        OutputFormat::Csv => {
            CsvSink { target }.write(request, matrix).await?;
        }
        OutputFormat::Json => {
            JsonSink { target }.write(request, matrix).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::tempdir;

    use super::*;
    use crate::models::timeframe::{Interval, Period};

    fn fixture() -> (IntradayRequest, PriceMatrix) {
        let request = IntradayRequest::new("AAPL", Period::ThirtyDays, Interval::FifteenMinutes).unwrap();
        let mut matrix = PriceMatrix::new();
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        matrix.insert(day, NaiveTime::from_hms_opt(9, 30, 0).unwrap(), 185.0);
        matrix.insert(day, NaiveTime::from_hms_opt(9, 45, 0).unwrap(), 185.5);
        (request, matrix)
    }

    #[tokio::test]
    async fn table_sink_writes_title_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aapl.txt");
        let (request, matrix) = fixture();

        let sink = TableSink {
            target: SinkTarget::File(path.clone()),
        };
        let written = sink.write(&request, &matrix).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, text.len());
        assert!(text.starts_with("AAPL - 15m Interval Closing Prices for the Last 30d\n"));
    }

    #[tokio::test]
    async fn csv_sink_counts_dates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aapl.csv");
        let (request, matrix) = fixture();

        let rows = CsvSink {
            target: SinkTarget::File(path.clone()),
        }
        .write(&request, &matrix)
        .await
        .unwrap();

        assert_eq!(rows, 1);
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Date", "09:30", "09:45"]);
    }

    #[tokio::test]
    async fn json_sink_output_matches_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aapl.json");
        let (request, matrix) = fixture();

        let doc = JsonSink {
            target: SinkTarget::File(path.clone()),
        }
        .write(&request, &matrix)
        .await
        .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), doc);
    }

    #[tokio::test]
    async fn missing_directory_is_an_io_error() {
        let dir = tempdir().unwrap();
        let target = SinkTarget::File(dir.path().join("nope").join("out.csv"));
        let (request, matrix) = fixture();

        let err = write_matrix(OutputFormat::Csv, target, &request, &matrix)
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }
}
