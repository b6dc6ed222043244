//! Shared test utilities for round-keeper.
//!
//! This module provides common helper functions for setting up test databases
//! and creating cadences, rosters and rounds with sensible defaults.

use crate::{
    core::{assignment, round, round_type},
    entities,
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Returns an instant on 2022-01-10 (UTC), the reference day used across tests.
///
/// # Panics
/// Panics on an out-of-range hour or minute.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 1, 10, hour, minute, 0).unwrap()
}

/// Creates a minutes-based round type and a config for it.
pub async fn create_cadence(
    db: &DatabaseConnection,
    name: &str,
    minutes: i32,
    enabled: bool,
) -> Result<entities::round_type::Model> {
    let created = round_type::create_round_type(
        db,
        name.to_string(),
        minutes,
        round_type::MINUTES.to_string(),
    )
    .await?;
    round_type::create_round_config(db, created.id, enabled).await?;
    Ok(created)
}

/// Creates the 15, 30 and 60 minute cadences, all enabled.
/// Returns them in that order.
pub async fn setup_standard_cadences() -> Result<(DatabaseConnection, Vec<entities::round_type::Model>)>
{
    let db = setup_test_db().await?;
    let mut cadences = Vec::new();
    for minutes in [15, 30, 60] {
        cadences.push(create_cadence(&db, &format!("{minutes} Minute Round"), minutes, true).await?);
    }
    Ok((db, cadences))
}

/// Assigns each patient to a round type's roster.
pub async fn assign_patients(
    db: &DatabaseConnection,
    round_type_id: i64,
    patients: &[&str],
) -> Result<()> {
    for patient in patients {
        assignment::create_round_assignment(db, round_type_id, (*patient).to_string()).await?;
    }
    Ok(())
}

/// Creates a round at `instant` with the given status and links it to each type.
/// Stands in for rounds written by an earlier run or advanced by staff.
pub async fn create_linked_round(
    db: &DatabaseConnection,
    instant: DateTime<Utc>,
    status: &str,
    round_type_ids: &[i64],
) -> Result<entities::round::Model> {
    let created = round::create_round(db, instant, status).await?;
    for round_type_id in round_type_ids {
        round::link_round_to_type(db, created.id, *round_type_id).await?;
    }
    Ok(created)
}
