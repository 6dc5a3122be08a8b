//! In-memory data source for tests and embedding callers.

use super::{DataSource, DataSourceError};
use crate::domain::{PriceObservation, TradeFill};

/// Returns predefined fills and prices, optionally failing on demand.
#[derive(Debug, Clone, Default)]
pub struct MockDataSource {
    trades: Vec<TradeFill>,
    prices: Vec<PriceObservation>,
    failure: Option<DataSourceError>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trade(mut self, trade: TradeFill) -> Self {
        self.trades.push(trade);
        self
    }

    pub fn with_trades(mut self, trades: Vec<TradeFill>) -> Self {
        self.trades.extend(trades);
        self
    }

    pub fn with_price(mut self, price: PriceObservation) -> Self {
        self.prices.push(price);
        self
    }

    pub fn with_prices(mut self, prices: Vec<PriceObservation>) -> Self {
        self.prices.extend(prices);
        self
    }

    /// Make every fetch return `error`.
    pub fn failing_with(mut self, error: DataSourceError) -> Self {
        self.failure = Some(error);
        self
    }

    fn check(&self) -> Result<(), DataSourceError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl DataSource for MockDataSource {
    fn fetch_trades(&self) -> Result<Vec<TradeFill>, DataSourceError> {
        self.check()?;
        Ok(self.trades.clone())
    }

    fn fetch_prices(&self) -> Result<Vec<PriceObservation>, DataSourceError> {
        self.check()?;
        Ok(self.prices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, Instrument, Side, TimeMs};

    fn make_test_fill() -> TradeFill {
        TradeFill::new(
            Instrument::new("BTC"),
            TimeMs::new(1000),
            Side::Buy,
            Decimal::ONE,
            Decimal::from(50000),
            Decimal::from(10),
        )
        .unwrap()
    }

    #[test]
    fn test_mock_returns_fills_in_insertion_order() {
        let second = TradeFill {
            timestamp: TimeMs::new(500),
            ..make_test_fill()
        };
        let mock = MockDataSource::new()
            .with_trade(make_test_fill())
            .with_trades(vec![second.clone()]);
        let fills = mock.fetch_trades().unwrap();
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[1], second);
    }

    #[test]
    fn test_mock_returns_prices() {
        let obs = PriceObservation::new(TimeMs::new(1000), Decimal::from(3)).unwrap();
        let mock = MockDataSource::new().with_price(obs).with_prices(vec![obs]);
        assert_eq!(mock.fetch_prices().unwrap(), vec![obs, obs]);
    }

    #[test]
    fn test_mock_failure() {
        let mock = MockDataSource::new()
            .with_trade(make_test_fill())
            .failing_with(DataSourceError::Io("disk gone".to_string()));
        assert!(matches!(mock.fetch_trades(), Err(DataSourceError::Io(_))));
        assert!(matches!(mock.fetch_prices(), Err(DataSourceError::Io(_))));
    }
}
