//! API Response Models

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of `GET /roll-dice`.
///
/// `dice` is a plain integer on the wire; clients validate the range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollDiceResponse {
    pub dice: i64,
}
