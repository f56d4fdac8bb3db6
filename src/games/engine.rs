//! Betting Engine
//!
//! Owns the session state of one player and enforces the betting rules.
//! A roll moves the engine from idle to rolling via [`BettingEngine::place_bet`],
//! and back to idle via [`BettingEngine::settle`] or [`BettingEngine::abort`].
//! The engine is a plain single-writer value; [`crate::games::DiceTable`]
//! shares it across tasks.

use crate::{
    config::EngineConfig,
    errors::EngineError,
    games::types::{BetPreset, DieFace, RollOutcome, RollRecord, SessionStats},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    sync::atomic::{AtomicU64, Ordering},
};
use tracing::{debug, info, warn};

/// Roll ids are process-wide so a ticket can never match another engine's roll.
static NEXT_ROLL_ID: AtomicU64 = AtomicU64::new(1);

/// Proof that a bet was accepted; consumed by settlement or abort.
#[derive(Debug, PartialEq, Eq)]
pub struct RollTicket {
    roll_id: u64,
    bet: i64,
}

impl RollTicket {
    pub fn bet(&self) -> i64 {
        self.bet
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Rolling { roll_id: u64, bet: i64 },
}

/// Point-in-time view of the session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub balance: i64,
    pub bet_amount: i64,
    pub busy: bool,
    pub last_result: Option<RollOutcome>,
    pub history: Vec<RollRecord>,
}

pub struct BettingEngine {
    defaults: EngineConfig,
    balance: i64,
    bet_amount: i64,
    phase: Phase,
    last_result: Option<RollOutcome>,
    /// Newest first
    history: VecDeque<RollRecord>,
}

impl Default for BettingEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl BettingEngine {
    pub fn new(defaults: EngineConfig) -> Self {
        Self {
            balance: defaults.starting_balance,
            bet_amount: defaults.default_bet,
            phase: Phase::Idle,
            last_result: None,
            history: VecDeque::new(),
            defaults,
        }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn bet_amount(&self) -> i64 {
        self.bet_amount
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Rolling { .. })
    }

    pub fn last_result(&self) -> Option<RollOutcome> {
        self.last_result
    }

    pub fn history(&self) -> &VecDeque<RollRecord> {
        &self.history
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats::from_history(&self.history)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            balance: self.balance,
            bet_amount: self.bet_amount,
            busy: self.is_busy(),
            last_result: self.last_result,
            history: self.history.iter().cloned().collect(),
        }
    }

    /// Whether the current bet amount could be rolled right now
    pub fn can_roll(&self) -> bool {
        !self.is_busy() && self.bet_amount >= 1 && self.bet_amount <= self.balance
    }

    /// True while the session still matches a fresh reset
    pub fn is_pristine(&self) -> bool {
        self.balance == self.defaults.starting_balance && self.history.is_empty()
    }

    /// Check order: non-positive amount, then balance, then busy latch.
    fn validate_bet(&self, amount: i64) -> Result<(), EngineError> {
        if amount <= 0 {
            return Err(EngineError::InvalidBet(amount.to_string()));
        }
        if amount > self.balance {
            return Err(EngineError::InsufficientBalance {
                bet: amount,
                balance: self.balance,
            });
        }
        if self.is_busy() {
            return Err(EngineError::EngineBusy);
        }
        Ok(())
    }

    /// Update the stake used by the next roll.
    pub fn set_bet_amount(&mut self, amount: i64) -> Result<(), EngineError> {
        self.validate_bet(amount)?;
        self.bet_amount = amount;
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: BetPreset) -> Result<i64, EngineError> {
        let amount = preset.amount_for(self.balance);
        self.set_bet_amount(amount)?;
        Ok(amount)
    }

    /// Accept a bet and enter the rolling state.
    ///
    /// On failure nothing changes. On success the busy latch is held until
    /// the returned ticket is passed to [`settle`](Self::settle) or
    /// [`abort`](Self::abort).
    pub fn place_bet(&mut self, amount: i64) -> Result<RollTicket, EngineError> {
        if let Err(e) = self.validate_bet(amount) {
            debug!("Rejected bet of {}: {}", amount, e);
            return Err(e);
        }

        let roll_id = NEXT_ROLL_ID.fetch_add(1, Ordering::Relaxed);
        self.bet_amount = amount;
        self.last_result = None;
        self.phase = Phase::Rolling { roll_id, bet: amount };

        debug!("Roll {} started with bet {}", roll_id, amount);
        Ok(RollTicket { roll_id, bet: amount })
    }

    fn release(&mut self, ticket: &RollTicket) -> Result<i64, EngineError> {
        match self.phase {
            Phase::Rolling { roll_id, bet } if roll_id == ticket.roll_id => {
                self.phase = Phase::Idle;
                Ok(bet)
            }
            _ => Err(EngineError::UnknownRoll),
        }
    }

    /// Apply a provider roll to the in-flight bet.
    ///
    /// A value outside 1..=6 releases the roll without touching balance or
    /// history and returns [`EngineError::InvalidRollValue`].
    pub fn settle(&mut self, ticket: RollTicket, roll_value: i64) -> Result<RollRecord, EngineError> {
        let bet = self.release(&ticket)?;

        let face = match DieFace::try_from(roll_value) {
            Ok(face) => face,
            Err(e) => {
                warn!("Roll {} released without settlement: {}", ticket.roll_id, e);
                return Err(e);
            }
        };

        let record = RollRecord::new(face, bet, Utc::now());
        self.balance = self.balance.saturating_add(record.balance_change);
        self.last_result = Some(record.outcome);
        self.history.push_front(record.clone());

        info!(
            "Roll {} settled: rolled {}, {} {} (balance {})",
            ticket.roll_id, face, record.outcome, bet, self.balance
        );
        Ok(record)
    }

    /// Release an in-flight roll after a provider failure.
    pub fn abort(&mut self, ticket: RollTicket) -> Result<(), EngineError> {
        self.release(&ticket)?;
        warn!("Roll {} aborted, bet of {} returned unsettled", ticket.roll_id, ticket.bet);
        Ok(())
    }

    /// Restore the session defaults. Not allowed while a roll is in flight.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        if self.is_busy() {
            return Err(EngineError::EngineBusy);
        }
        self.balance = self.defaults.starting_balance;
        self.bet_amount = self.defaults.default_bet;
        self.last_result = None;
        self.history.clear();
        info!("Session reset to balance {}", self.balance);
        Ok(())
    }
}

/// Parse free-form bet input; anything non-numeric is an invalid bet.
pub fn parse_bet_input(input: &str) -> Result<i64, EngineError> {
    let trimmed = input.trim();
    match trimmed.parse::<i64>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(EngineError::InvalidBet(trimmed.to_string())),
    }
}
