//! Core business logic - framework-agnostic round scheduling operations.
//!
//! Every function takes its database handle explicitly, so the same code runs
//! against a pooled connection, an open transaction, or an in-memory test
//! database.

/// Roster operations
pub mod assignment;
/// Round materialization
pub mod materialize;
/// Round membership
pub mod member;
/// Status timeline projection
pub mod projection;
/// Round lookups, writes and status literals
pub mod round;
/// Round types, configs and cadences
pub mod round_type;
/// Startup seeding from config.toml
pub mod seed;

pub use materialize::{MaterializeSummary, materialize};
pub use projection::{RoundStatusView, project};
