//! Trade logs and price histories stored as CSV.
//!
//! Trade log columns: `timestamp, ticker, side, size, price, commission`
//! (`instrument_id` is accepted for `ticker`; a missing `commission` column
//! means zero). Price columns: `timestamp, price`. Extra columns are ignored.

use super::{DataSource, DataSourceError};
use crate::domain::{Decimal, Instrument, PriceObservation, Side, TimeMs, TradeFill};
use crate::error::CurveError;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Where a CSV document comes from.
#[derive(Debug, Clone)]
pub enum CsvInput {
    Path(PathBuf),
    Text(String),
}

impl CsvInput {
    fn open(&self) -> Result<Box<dyn Read + '_>, DataSourceError> {
        match self {
            CsvInput::Path(path) => {
                let file = File::open(path).map_err(|e| {
                    DataSourceError::Io(format!("{}: {}", path.display(), e))
                })?;
                Ok(Box::new(file))
            }
            CsvInput::Text(text) => Ok(Box::new(text.as_bytes())),
        }
    }
}

/// A trade log plus a price history.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    tradelog: CsvInput,
    prices: CsvInput,
}

impl CsvDataSource {
    pub fn new(tradelog: CsvInput, prices: CsvInput) -> Self {
        Self { tradelog, prices }
    }

    pub fn from_paths(tradelog: impl Into<PathBuf>, prices: impl Into<PathBuf>) -> Self {
        Self::new(CsvInput::Path(tradelog.into()), CsvInput::Path(prices.into()))
    }

    pub fn from_text(tradelog: impl Into<String>, prices: impl Into<String>) -> Self {
        Self::new(CsvInput::Text(tradelog.into()), CsvInput::Text(prices.into()))
    }

    pub fn parse_tradelog<R: Read>(reader: R) -> Result<Vec<TradeFill>, DataSourceError> {
        #[derive(Debug, Deserialize)]
        struct Row {
            #[serde(default)]
            timestamp: Option<String>,
            #[serde(alias = "instrument_id")]
            ticker: String,
            side: String,
            size: String,
            price: String,
            #[serde(default)]
            commission: Option<String>,
        }

        let mut fills = Vec::new();
        for (line, record) in reader_for(reader).deserialize::<Row>().enumerate() {
            let row = record.map_err(|e| DataSourceError::Csv(e.to_string()))?;
            let timestamp = TimeMs::parse(row.timestamp.as_deref().unwrap_or(""))?;
            let side: Side = row.side.parse()?;
            let size = decimal_field("size", &row.size, line)?;
            let price = decimal_field("price", &row.price, line)?;
            let commission = match row.commission.as_deref().map(str::trim) {
                None | Some("") => Decimal::ZERO,
                Some(raw) => decimal_field("commission", raw, line)?,
            };

            fills.push(TradeFill::new(
                Instrument::new(row.ticker),
                timestamp,
                side,
                size,
                price,
                commission,
            )?);
        }

        debug!(rows = fills.len(), "parsed trade log");
        Ok(fills)
    }

    pub fn parse_prices<R: Read>(reader: R) -> Result<Vec<PriceObservation>, DataSourceError> {
        #[derive(Debug, Deserialize)]
        struct Row {
            #[serde(default)]
            timestamp: Option<String>,
            price: String,
        }

        let mut prices = Vec::new();
        for (line, record) in reader_for(reader).deserialize::<Row>().enumerate() {
            let row = record.map_err(|e| DataSourceError::Csv(e.to_string()))?;
            let timestamp = TimeMs::parse(row.timestamp.as_deref().unwrap_or(""))?;
            let price = decimal_field("price", &row.price, line)?;
            prices.push(PriceObservation::new(timestamp, price)?);
        }

        debug!(rows = prices.len(), "parsed price history");
        Ok(prices)
    }
}

impl DataSource for CsvDataSource {
    fn fetch_trades(&self) -> Result<Vec<TradeFill>, DataSourceError> {
        Self::parse_tradelog(self.tradelog.open()?)
    }

    fn fetch_prices(&self) -> Result<Vec<PriceObservation>, DataSourceError> {
        Self::parse_prices(self.prices.open()?)
    }
}

fn reader_for<R: Read>(reader: R) -> ::csv::Reader<R> {
    ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(reader)
}

/// `line` is the zero-based data row; reported one-based after the header.
fn decimal_field(name: &str, raw: &str, line: usize) -> Result<Decimal, CurveError> {
    Decimal::from_str_canonical(raw).map_err(|e| {
        CurveError::InvalidInput(format!("row {}: invalid {} '{}': {}", line + 2, name, raw, e))
    })
}
