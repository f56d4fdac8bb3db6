//! Roll Provider HTTP Service
//!
//! Exposes `GET /roll-dice` plus health and metrics endpoints.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod monitoring;
pub mod routes;
pub mod server;

pub use server::{ApiConfig, ApiServer};
