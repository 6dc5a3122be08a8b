//! Periodic price observation used for mark-to-market.

use crate::domain::{Decimal, TimeMs};
use crate::error::CurveError;
use serde::{Deserialize, Serialize};

/// Observed price of the run's single instrument at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub timestamp: TimeMs,
    pub price: Decimal,
}

impl PriceObservation {
    pub fn new(timestamp: TimeMs, price: Decimal) -> Result<Self, CurveError> {
        let obs = PriceObservation { timestamp, price };
        obs.validate()?;
        Ok(obs)
    }

    pub fn validate(&self) -> Result<(), CurveError> {
        if !self.price.is_positive() {
            return Err(CurveError::InvalidInput(format!(
                "observed price must be positive, got {} at {}",
                self.price, self.timestamp
            )));
        }
        Ok(())
    }
}
