//! Unified error types for round-keeper.
//!
//! Configuration problems (an unsupported duration unit, a missing round type)
//! and storage failures are fatal for the call that hit them. Absence of a
//! record is never an error; lookups return `Option` instead.

use thiserror::Error;

/// Every error a round-keeper operation can return.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration or input, or a record an update needed was missing
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A round type uses a duration unit other than minutes
    #[error("Unsupported round duration unit `{unit}` (only `minutes` is supported)")]
    UnsupportedDurationUnit {
        /// The unit found on the round type
        unit: String,
    },

    /// A round type duration that is zero or negative
    #[error("Invalid round duration amount: {amount}")]
    InvalidDuration {
        /// The rejected amount
        amount: i32,
    },

    /// An enabled config points at a round type that does not exist
    #[error("Round type {id} not found")]
    RoundTypeNotFound {
        /// ID the config referenced
        id: i64,
    },

    /// A stored round key that is not a canonical RFC 3339 timestamp
    #[error("Invalid round timestamp: {value}")]
    InvalidTimestamp {
        /// The unparseable value
        value: String,
    },

    /// Any failure reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Failure rendering the timeline as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
