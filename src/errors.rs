//! Error types for the dicebet system
//!
//! One enum per concern, rolled up into [`DiceBetError`] for callers that
//! cross concern boundaries (binaries, configuration loading).

use thiserror::Error;

/// Root error type for all dicebet operations
#[derive(Debug, Error)]
pub enum DiceBetError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Betting rule violations and settlement failures
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Failures talking to the roll provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),
}

/// Betting engine errors.
///
/// Every variant leaves the session usable: validation failures change no
/// state, and provider failures release the busy latch without settling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Non-positive or non-numeric bet amount
    #[error("Invalid bet amount: {0}")]
    InvalidBet(String),

    #[error("Bet amount {bet} exceeds balance {balance}")]
    InsufficientBalance { bet: i64, balance: i64 },

    /// A roll is already in flight
    #[error("A roll is already in progress")]
    EngineBusy,

    #[error("Roll provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered with a value outside 1..=6
    #[error("Invalid roll value from provider: {0}")]
    InvalidRollValue(i64),

    /// Ticket does not belong to the roll currently in flight
    #[error("Roll ticket does not match the roll in progress")]
    UnknownRoll,
}

impl EngineError {
    /// Errors that released an in-flight roll without settling it.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            EngineError::ProviderUnavailable(_) | EngineError::InvalidRollValue(_)
        )
    }
}

/// Roll provider client errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("failed: {0}")]
    Failed(reqwest::StatusCode),

    #[error("invalid provider URL: {0}")]
    InvalidUrl(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl From<ProviderError> for EngineError {
    fn from(e: ProviderError) -> Self {
        EngineError::ProviderUnavailable(e.to_string())
    }
}

// Convenience type alias for Results
pub type DiceBetResult<T> = Result<T, DiceBetError>;
