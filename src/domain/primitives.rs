//! Domain primitives: TimeMs, Instrument, Side, PositionSide.

use crate::domain::Decimal;
use crate::error::CurveError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Parse a raw timestamp as it appears in trade logs and price files.
    ///
    /// Accepted forms, all read as UTC: integer milliseconds, RFC 3339,
    /// `YYYY-MM-DD HH:MM:SS[.f]`, `YYYY-MM-DDTHH:MM:SS[.f]` and `YYYY-MM-DD`.
    /// Anything else cannot be placed on the timeline and is an ordering error.
    pub fn parse(raw: &str) -> Result<Self, CurveError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(CurveError::Ordering("missing timestamp".to_string()));
        }
        if let Ok(ms) = s.parse::<i64>() {
            return Ok(TimeMs(ms));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(TimeMs(dt.timestamp_millis()));
        }
        for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(TimeMs(naive.and_utc().timestamp_millis()));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(TimeMs(naive.and_utc().timestamp_millis()));
            }
        }
        Err(CurveError::Ordering(format!("malformed timestamp: {}", raw)))
    }
}

impl std::fmt::Display for TimeMs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tradable instrument identifier (ticker).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instrument(pub String);

impl Instrument {
    pub fn new(id: impl Into<String>) -> Self {
        Instrument(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trade side: Buy or Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl FromStr for Side {
    type Err = CurveError;

    /// Case-insensitive `BUY` / `SELL`. Any other value is an illegal state
    /// for the accounting machine, not a parse nuisance.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(CurveError::IllegalState(format!(
                "unrecognized trade side: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Direction of the open position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    #[default]
    Flat,
    Long,
    Short,
}

impl PositionSide {
    /// +1 for Long, -1 for Short, 0 for Flat.
    pub fn sign(&self) -> Decimal {
        match self {
            PositionSide::Flat => Decimal::ZERO,
            PositionSide::Long => Decimal::ONE,
            PositionSide::Short => -Decimal::ONE,
        }
    }

    /// Whether a trade on `side` adds to this position.
    pub fn is_same_direction(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (PositionSide::Long, Side::Buy) | (PositionSide::Short, Side::Sell)
        )
    }
}

impl From<Side> for PositionSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => PositionSide::Long,
            Side::Sell => PositionSide::Short,
        }
    }
}

impl std::fmt::Display for PositionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionSide::Flat => write!(f, "FLAT"),
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}
