//! dicebet - Dice betting game
//!
//! A betting engine that stakes part of an in-memory balance on a die roll,
//! and the single-route HTTP service that supplies the rolls.
//! Rolls of 4, 5 or 6 win the stake; 1, 2 or 3 lose it.

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod games;
pub mod logging;
pub mod shell;

pub use client::{HttpRollSource, LocalRollSource, RollSource};
pub use config::{ConfigLoader, DiceBetConfig};
pub use errors::{DiceBetError, DiceBetResult, EngineError, ProviderError};
pub use games::{BettingEngine, DiceTable, RollOutcome, RollRecord};
