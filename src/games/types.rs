use crate::errors::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated face of a six-sided die
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "i64", into = "i64")]
pub struct DieFace(u8);

impl DieFace {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn value(self) -> u8 {
        self.0
    }

    /// 4, 5 and 6 win; 1, 2 and 3 lose.
    pub fn outcome(self) -> RollOutcome {
        if self.0 >= 4 {
            RollOutcome::Win
        } else {
            RollOutcome::Lose
        }
    }

    /// For values drawn from `MIN..=MAX`; anything else is clamped onto the die.
    pub(crate) fn from_sampled(value: u8) -> Self {
        DieFace(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn all() -> impl Iterator<Item = DieFace> {
        (Self::MIN..=Self::MAX).map(DieFace)
    }
}

impl TryFrom<i64> for DieFace {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(DieFace(value as u8))
        } else {
            Err(EngineError::InvalidRollValue(value))
        }
    }
}

impl From<DieFace> for i64 {
    fn from(face: DieFace) -> Self {
        face.0 as i64
    }
}

impl fmt::Display for DieFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Roll outcome
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RollOutcome {
    Win,
    Lose,
}

impl RollOutcome {
    /// Even-money payout: the full stake is credited or debited.
    pub fn balance_change(self, bet: i64) -> i64 {
        match self {
            RollOutcome::Win => bet,
            RollOutcome::Lose => -bet,
        }
    }
}

impl fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollOutcome::Win => write!(f, "win"),
            RollOutcome::Lose => write!(f, "lose"),
        }
    }
}

/// One settled roll, created exactly once per completed roll
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RollRecord {
    pub roll: DieFace,
    pub bet: i64,
    pub outcome: RollOutcome,
    pub balance_change: i64,
    pub timestamp: DateTime<Utc>,
}

impl RollRecord {
    pub fn new(roll: DieFace, bet: i64, timestamp: DateTime<Utc>) -> Self {
        let outcome = roll.outcome();
        Self {
            roll,
            bet,
            outcome,
            balance_change: outcome.balance_change(bet),
            timestamp,
        }
    }
}

/// Quick-bet shortcuts relative to the current balance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BetPreset {
    TenPercent,
    Half,
    Max,
}

impl BetPreset {
    /// Fractional presets floor and never go below 1.
    pub fn amount_for(self, balance: i64) -> i64 {
        match self {
            BetPreset::TenPercent => (balance / 10).max(1),
            BetPreset::Half => (balance / 2).max(1),
            BetPreset::Max => balance,
        }
    }
}

/// Aggregates over a session history
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionStats {
    pub rolls: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_wagered: i64,
    pub net_change: i64,
    pub win_rate: f64,
}

impl SessionStats {
    pub fn from_history<'a, I>(history: I) -> Self
    where
        I: IntoIterator<Item = &'a RollRecord>,
    {
        let mut stats = SessionStats::default();
        for record in history {
            stats.rolls += 1;
            match record.outcome {
                RollOutcome::Win => stats.wins += 1,
                RollOutcome::Lose => stats.losses += 1,
            }
            stats.total_wagered += record.bet;
            stats.net_change += record.balance_change;
        }
        if stats.rolls > 0 {
            stats.win_rate = stats.wins as f64 / stats.rolls as f64;
        }
        stats
    }
}
