//! Executed trade fill.

use crate::domain::{Decimal, Instrument, Side, TimeMs};
use crate::error::CurveError;
use serde::{Deserialize, Serialize};

/// A single executed trade fill for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeFill {
    pub instrument: Instrument,
    pub timestamp: TimeMs,
    pub side: Side,
    /// Filled quantity, strictly positive.
    pub size: Decimal,
    /// Fill price, strictly positive.
    pub price: Decimal,
    /// Flat commission charged on this fill, non-negative.
    pub commission: Decimal,
}

impl TradeFill {
    /// Create a validated fill.
    ///
    /// # Errors
    /// `InvalidInput` when size or price is not positive or commission is
    /// negative.
    pub fn new(
        instrument: Instrument,
        timestamp: TimeMs,
        side: Side,
        size: Decimal,
        price: Decimal,
        commission: Decimal,
    ) -> Result<Self, CurveError> {
        let fill = TradeFill {
            instrument,
            timestamp,
            side,
            size,
            price,
            commission,
        };
        fill.validate()?;
        Ok(fill)
    }

    /// Re-check the numeric constraints, for fills built field by field.
    pub fn validate(&self) -> Result<(), CurveError> {
        if !self.size.is_positive() {
            return Err(CurveError::InvalidInput(format!(
                "trade size must be positive, got {} at {}",
                self.size, self.timestamp
            )));
        }
        if !self.price.is_positive() {
            return Err(CurveError::InvalidInput(format!(
                "trade price must be positive, got {} at {}",
                self.price, self.timestamp
            )));
        }
        if self.commission.is_negative() {
            return Err(CurveError::InvalidInput(format!(
                "commission must be non-negative, got {} at {}",
                self.commission, self.timestamp
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn build(size: &str, price: &str, commission: &str) -> Result<TradeFill, CurveError> {
        TradeFill::new(
            Instrument::new("ES"),
            TimeMs::new(1000),
            Side::Buy,
            d(size),
            d(price),
            d(commission),
        )
    }

    #[test]
    fn test_valid_fill() {
        let fill = build("10", "100", "1").unwrap();
        assert_eq!(fill.instrument.as_str(), "ES");
        assert_eq!(fill.side, Side::Buy);
        assert_eq!(fill.size, d("10"));
    }

    #[test]
    fn test_zero_commission_allowed() {
        assert!(build("1", "1", "0").is_ok());
    }

    #[test]
    fn test_non_positive_size_rejected() {
        assert!(matches!(build("0", "100", "0"), Err(CurveError::InvalidInput(_))));
        assert!(matches!(build("-1", "100", "0"), Err(CurveError::InvalidInput(_))));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        assert!(matches!(build("1", "0", "0"), Err(CurveError::InvalidInput(_))));
    }

    #[test]
    fn test_negative_commission_rejected() {
        assert!(matches!(build("1", "100", "-0.01"), Err(CurveError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_catches_struct_literal() {
        let fill = TradeFill {
            instrument: Instrument::new("ES"),
            timestamp: TimeMs::new(0),
            side: Side::Sell,
            size: d("1"),
            price: d("-5"),
            commission: Decimal::ZERO,
        };
        assert!(fill.validate().is_err());
    }
}
