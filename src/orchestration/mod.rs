//! Per-request sessions and the equity replay driver.

pub mod player;
pub mod session;

pub use player::{Player, Replay};
pub use session::Session;
