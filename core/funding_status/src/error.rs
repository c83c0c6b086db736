//! Error types for the funding status crate.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FundingError {
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    #[error("Invalid project window: start {start} is after end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid {field}: {value}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("Unknown project status: {0}")]
    UnknownStatus(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FundingError>;
