pub mod types;
pub mod engine;
pub mod provider;
pub mod table;

pub use types::*;
pub use engine::{parse_bet_input, BettingEngine, RollTicket, SessionSnapshot};
pub use provider::{RandomnessProvider, SeededProvider, ThreadRngProvider};
pub use table::DiceTable;
