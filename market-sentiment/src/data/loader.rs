//! File-backed market data source.
//!
//! Price history is read from one file per ticker, CSV or parquet, with at
//! least these columns:
//! - date: ISO `YYYY-MM-DD` string or a date column
//! - close: adjusted close
//!
//! Option snapshots are read from `options/<TICKER>.json`, serialized in the
//! `OptionsSnapshot` shape.
//!
//! Layout:
//! ```text
//! <data_dir>/SPY.csv
//! <data_dir>/VIX.parquet
//! <data_dir>/options/SPY.json
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use super::types::{OptionsSnapshot, TimeSeries};

/// Columns every price file must carry.
pub const EXPECTED_PRICE_COLUMNS: &[&str] = &["date", "close"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the pipeline gets its prices and option chains.
pub trait MarketDataSource {
    /// Daily closes for `ticker`, from `start` onward when given.
    fn price_series(&self, ticker: &str, start: Option<NaiveDate>)
        -> Result<TimeSeries, LoaderError>;

    /// Latest option chain snapshot for `ticker`.
    fn options_snapshot(&self, ticker: &str) -> Result<OptionsSnapshot, LoaderError>;
}

/// Map a ticker to a file stem (`^VIX` -> `VIX`).
pub fn sanitize_ticker(ticker: &str) -> String {
    ticker
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// Reads prices and option snapshots from a directory.
pub struct FileDataSource {
    data_dir: PathBuf,
}

impl FileDataSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// First existing price file for a ticker, CSV preferred.
    fn price_path(&self, ticker: &str) -> Result<PathBuf, LoaderError> {
        let stem = sanitize_ticker(ticker);
        ["csv", "parquet"]
            .iter()
            .map(|ext| self.data_dir.join(format!("{}.{}", stem, ext)))
            .find(|path| path.exists())
            .ok_or_else(|| {
                LoaderError::FileNotFound(
                    self.data_dir
                        .join(format!("{}.{{csv,parquet}}", stem))
                        .display()
                        .to_string(),
                )
            })
    }

    fn options_path(&self, ticker: &str) -> PathBuf {
        self.data_dir
            .join("options")
            .join(format!("{}.json", sanitize_ticker(ticker)))
    }

    /// Scan a price file lazily, keeping only date and close.
    pub fn load_lazy(&self, ticker: &str) -> Result<LazyFrame, LoaderError> {
        let path = self.price_path(ticker)?;
        let lf = match path.extension().and_then(|e| e.to_str()) {
            Some("parquet") => LazyFrame::scan_parquet(&path, ScanArgsParquet::default())?,
            _ => LazyCsvReader::new(&path).with_has_header(true).finish()?,
        };
        Ok(lf.select([col("date"), col("close").cast(DataType::Float64)]))
    }

    pub fn load_dataframe(&self, ticker: &str) -> Result<DataFrame, LoaderError> {
        Ok(self.load_lazy(ticker)?.collect()?)
    }

    /// Tickers with a price file in the data directory.
    pub fn available_tickers(&self) -> Result<Vec<String>, LoaderError> {
        if !self.data_dir.exists() {
            return Ok(vec![]);
        }

        let mut tickers = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            let is_price_file = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("csv") | Some("parquet")
            );
            if is_price_file {
                if let Some(stem) = path.file_stem() {
                    tickers.push(stem.to_string_lossy().to_string());
                }
            }
        }
        tickers.sort();
        tickers.dedup();
        Ok(tickers)
    }
}

impl MarketDataSource for FileDataSource {
    fn price_series(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
    ) -> Result<TimeSeries, LoaderError> {
        let df = self.load_dataframe(ticker)?;
        let series = dataframe_to_series(&df, ticker)?;
        debug!("Loaded {} closes for {}", series.len(), ticker);

        Ok(match start {
            Some(start) => series.since(start),
            None => series,
        })
    }

    fn options_snapshot(&self, ticker: &str) -> Result<OptionsSnapshot, LoaderError> {
        let path = self.options_path(ticker);
        if !path.exists() {
            return Err(LoaderError::FileNotFound(path.display().to_string()));
        }

        let text = std::fs::read_to_string(&path)?;
        let snapshot: OptionsSnapshot = serde_json::from_str(&text)?;
        debug!(
            "Loaded {} option rows across {} expirations for {}",
            snapshot.total_contracts(),
            snapshot.chains.len(),
            ticker
        );
        Ok(snapshot)
    }
}

/// Price source backed by in-memory series, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataSource {
    prices: HashMap<String, TimeSeries>,
    options: HashMap<String, OptionsSnapshot>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prices(mut self, ticker: &str, series: TimeSeries) -> Self {
        self.prices.insert(ticker.to_string(), series);
        self
    }

    pub fn with_options(mut self, ticker: &str, snapshot: OptionsSnapshot) -> Self {
        self.options.insert(ticker.to_string(), snapshot);
        self
    }
}

impl MarketDataSource for MemoryDataSource {
    fn price_series(
        &self,
        ticker: &str,
        start: Option<NaiveDate>,
    ) -> Result<TimeSeries, LoaderError> {
        let series = self
            .prices
            .get(ticker)
            .ok_or_else(|| LoaderError::FileNotFound(ticker.to_string()))?;
        Ok(match start {
            Some(start) => series.since(start),
            None => series.clone(),
        })
    }

    fn options_snapshot(&self, ticker: &str) -> Result<OptionsSnapshot, LoaderError> {
        self.options
            .get(ticker)
            .cloned()
            .ok_or_else(|| LoaderError::FileNotFound(ticker.to_string()))
    }
}

/// Convert days since Unix epoch to NaiveDate.
fn date_from_days(days: i32) -> NaiveDate {
    NaiveDate::from_num_days_from_ce_opt(days + 719163).unwrap_or_default()
}

/// Read the date and close columns into a series.
fn dataframe_to_series(df: &DataFrame, ticker: &str) -> Result<TimeSeries, LoaderError> {
    let dates_col = df.column("date")?;

    // Handle both string and date column types
    let dates: Vec<Option<NaiveDate>> = if let Ok(str_col) = dates_col.str() {
        str_col
            .into_iter()
            .map(|s| s.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
            .collect()
    } else if let Ok(date_col) = dates_col.date() {
        date_col
            .into_iter()
            .map(|d| d.map(date_from_days))
            .collect()
    } else {
        return Err(LoaderError::InvalidData(format!(
            "{}: date column has unexpected type",
            ticker
        )));
    };

    let closes: Vec<Option<f64>> = df.column("close")?.f64()?.into_iter().collect();

    let pairs = dates
        .into_iter()
        .zip(closes)
        .filter_map(|(date, close)| Some((date?, close?)));
    let series = TimeSeries::new(ticker, pairs);

    if series.is_empty() && df.height() > 0 {
        return Err(LoaderError::InvalidData(format!(
            "{}: no parseable (date, close) rows",
            ticker
        )));
    }
    Ok(series)
}
