//! Pure computation engine for deterministic equity replay.

pub mod logger;
pub mod merger;
pub mod position;

pub use logger::{EquityCurve, EquityLogger, LogEntry, LogMessage};
pub use merger::{EventMerger, MergedEvents};
pub use position::{FlatMarkPolicy, PositionState, PositionStateMachine};
