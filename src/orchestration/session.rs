use crate::datasource::{DataSource, DataSourceError};
use crate::domain::{Decimal, PriceObservation, TradeFill};
use uuid::Uuid;

/// Inputs for one curve-generation run.
///
/// Built per request and consumed by [`Player::play`](super::Player::play);
/// nothing about a run outlives its session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub trades: Vec<TradeFill>,
    pub prices: Vec<PriceObservation>,
    pub base_capital: Decimal,
}

impl Session {
    pub fn new(
        trades: Vec<TradeFill>,
        prices: Vec<PriceObservation>,
        base_capital: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trades,
            prices,
            base_capital,
        }
    }

    /// Load both inputs from `source`.
    pub fn from_source(
        source: &dyn DataSource,
        base_capital: Decimal,
    ) -> Result<Self, DataSourceError> {
        let trades = source.fetch_trades()?;
        let prices = source.fetch_prices()?;
        Ok(Self::new(trades, prices, base_capital))
    }

    pub fn event_count(&self) -> usize {
        self.trades.len() + self.prices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::{CsvDataSource, MockDataSource};

    #[test]
    fn test_sessions_get_distinct_ids() {
        let a = Session::new(vec![], vec![], Decimal::ZERO);
        let b = Session::new(vec![], vec![], Decimal::ZERO);
        assert_ne!(a.id, b.id);
        assert_eq!(a.event_count(), 0);
    }

    #[test]
    fn test_from_source_loads_both_inputs() {
        let source = CsvDataSource::from_text(
            "timestamp,ticker,side,size,price,commission\n1000,ES,BUY,1,100,0\n",
            "timestamp,price\n1000,101\n2000,102\n",
        );
        let session = Session::from_source(&source, Decimal::from(50)).unwrap();
        assert_eq!(session.trades.len(), 1);
        assert_eq!(session.prices.len(), 2);
        assert_eq!(session.event_count(), 3);
        assert_eq!(session.base_capital, Decimal::from(50));
    }

    #[test]
    fn test_from_source_propagates_failure() {
        let source = MockDataSource::new().failing_with(DataSourceError::Csv("bad".into()));
        assert!(Session::from_source(&source, Decimal::ZERO).is_err());
    }
}
