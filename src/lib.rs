pub mod api;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::Config;
pub use datasource::{CsvDataSource, DataSource, DataSourceError, MockDataSource};
pub use domain::{
    Decimal, Instrument, MarketEvent, PositionSide, PriceObservation, Side, TimeMs, TradeFill,
};
pub use engine::{EquityCurve, FlatMarkPolicy, LogEntry, LogMessage, PositionStateMachine};
pub use error::{AppError, CurveError};
pub use orchestration::{Player, Replay, Session};
