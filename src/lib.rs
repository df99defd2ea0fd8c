//! Hex-grid falling-block engine on a rotatable donut-shaped hive.
//!
//! Pieces spawn in the central hole and fall toward the rim. The whole hive
//! turns in 60° steps, and gravity follows whichever direction is "down" on
//! screen. Full lines in any of the three hex axes clear, and the survivors
//! collapse, possibly chaining further clears for a combo bonus.

pub mod board;
pub mod cascade;
pub mod config;
pub mod effects;
pub mod engine;
pub mod events;
pub mod frame;
pub mod hex;
pub mod piece;
pub mod session;
pub mod spin;

pub use config::{ConfigError, HiveConfig};
pub use engine::{Engine, ScoreSubmission, Steer};
pub use events::GameEvent;
pub use session::SessionState;
