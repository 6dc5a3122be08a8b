//! Domain types for single-instrument equity replay.
//!
//! This module provides:
//! - Exact numeric handling via the Decimal wrapper
//! - Domain primitives: TimeMs, Instrument, Side, PositionSide
//! - Trade fills and price observations with input validation
//! - The tagged event type and ordering key used by the merger

pub mod decimal;
pub mod event;
pub mod fill;
pub mod ordering;
pub mod price;
pub mod primitives;

pub use decimal::Decimal;
pub use event::{EventKind, MarketEvent};
pub use fill::TradeFill;
pub use ordering::EventOrderingKey;
pub use price::PriceObservation;
pub use primitives::{Instrument, PositionSide, Side, TimeMs};
