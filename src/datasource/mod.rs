//! Sources of trade fills and price observations for a replay.

use crate::domain::{PriceObservation, TradeFill};
use crate::error::CurveError;
use std::fmt;
use thiserror::Error;

pub mod csv_source;
pub mod mock;

pub use csv_source::{CsvDataSource, CsvInput};
pub use mock::MockDataSource;

/// Supplies the two inputs of one replay.
///
/// Implementations return records already validated and parsed into domain
/// types; ordering is left to the merger.
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Trade fills, in source order.
    fn fetch_trades(&self) -> Result<Vec<TradeFill>, DataSourceError>;

    /// Price observations, in source order.
    fn fetch_prices(&self) -> Result<Vec<PriceObservation>, DataSourceError>;
}

#[derive(Debug, Clone, Error)]
pub enum DataSourceError {
    /// File could not be read.
    #[error("I/O error: {0}")]
    Io(String),
    /// Malformed CSV structure (bad quoting, missing column).
    #[error("CSV error: {0}")]
    Csv(String),
    /// A record parsed but its content is not acceptable.
    #[error(transparent)]
    Curve(#[from] CurveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datasource_error_display() {
        let err = DataSourceError::Io("no such file".to_string());
        assert_eq!(err.to_string(), "I/O error: no such file");

        let err = DataSourceError::Csv("line 3: missing field `price`".to_string());
        assert_eq!(err.to_string(), "CSV error: line 3: missing field `price`");

        let err: DataSourceError = CurveError::Ordering("missing timestamp".to_string()).into();
        assert_eq!(err.to_string(), "Ordering error: missing timestamp");
    }
}
