//! Round type and round config operations.
//!
//! Round types define cadences; round configs switch them on or off. Both are
//! written out-of-band (seeding, admin tooling) and read by the materializer
//! and the projector, which only ever work with enabled cadences.

use crate::{
    entities::{RoundConfig, RoundType, round_config, round_type},
    errors::{Error, Result},
};
use chrono::TimeDelta;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::debug;

/// The only duration unit currently understood.
pub const MINUTES: &str = "minutes";

/// An enabled round type together with its validated step length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cadence {
    /// ID of the config that enabled this cadence
    pub config_id: i64,
    /// The round type being walked
    pub round_type: round_type::Model,
    /// Distance between two consecutive slots
    pub step: TimeDelta,
}

/// Converts a round type's duration into a step length.
///
/// # Errors
/// - `UnsupportedDurationUnit` when the unit is anything but `"minutes"`
/// - `InvalidDuration` when the amount is not positive, which would stall a walk
pub fn cadence_step(round_type: &round_type::Model) -> Result<TimeDelta> {
    if round_type.duration_unit != MINUTES {
        return Err(Error::UnsupportedDurationUnit {
            unit: round_type.duration_unit.clone(),
        });
    }

    if round_type.duration_amount <= 0 {
        return Err(Error::InvalidDuration {
            amount: round_type.duration_amount,
        });
    }

    Ok(TimeDelta::minutes(i64::from(round_type.duration_amount)))
}

/// Creates a new round type after validating its name and amount.
///
/// The unit is stored as given; an unsupported unit only fails once the
/// cadence is enabled and walked.
pub async fn create_round_type<C>(
    db: &C,
    name: String,
    duration_amount: i32,
    duration_unit: String,
) -> Result<round_type::Model>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Round type name cannot be empty".to_string(),
        });
    }

    if duration_amount <= 0 {
        return Err(Error::InvalidDuration {
            amount: duration_amount,
        });
    }

    let round_type = round_type::ActiveModel {
        name: Set(name.trim().to_string()),
        duration_amount: Set(duration_amount),
        duration_unit: Set(duration_unit),
        ..Default::default()
    };

    let result = round_type.insert(db).await?;
    Ok(result)
}

/// Finds a round type by ID, returning None if it does not exist.
pub async fn get_round_type<C>(db: &C, round_type_id: i64) -> Result<Option<round_type::Model>>
where
    C: ConnectionTrait,
{
    RoundType::find_by_id(round_type_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a round type by its display name.
pub async fn get_round_type_by_name<C>(db: &C, name: &str) -> Result<Option<round_type::Model>>
where
    C: ConnectionTrait,
{
    RoundType::find()
        .filter(round_type::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists every round type in creation order.
pub async fn list_round_types<C>(db: &C) -> Result<Vec<round_type::Model>>
where
    C: ConnectionTrait,
{
    RoundType::find()
        .order_by_asc(round_type::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every round config, enabled or not, in creation order.
pub async fn list_round_configs<C>(db: &C) -> Result<Vec<round_config::Model>>
where
    C: ConnectionTrait,
{
    RoundConfig::find()
        .order_by_asc(round_config::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a config for a round type.
pub async fn create_round_config<C>(
    db: &C,
    round_type_id: i64,
    enabled: bool,
) -> Result<round_config::Model>
where
    C: ConnectionTrait,
{
    let config = round_config::ActiveModel {
        round_type_id: Set(round_type_id),
        enabled: Set(enabled),
        ..Default::default()
    };

    let result = config.insert(db).await?;
    Ok(result)
}

/// Finds the first config governing a round type.
pub async fn get_round_config_for_type<C>(
    db: &C,
    round_type_id: i64,
) -> Result<Option<round_config::Model>>
where
    C: ConnectionTrait,
{
    RoundConfig::find()
        .filter(round_config::Column::RoundTypeId.eq(round_type_id))
        .order_by_asc(round_config::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Enables or disables a config.
///
/// Re-enabling a cadence resumes materialization from its last linked round,
/// so the gap while it was disabled is caught up on the next run.
pub async fn set_round_config_enabled<C>(
    db: &C,
    config_id: i64,
    enabled: bool,
) -> Result<round_config::Model>
where
    C: ConnectionTrait,
{
    let config = RoundConfig::find_by_id(config_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Config {
            message: format!("Round config {config_id} not found"),
        })?;

    let mut active_model: round_config::ActiveModel = config.into();
    active_model.enabled = Set(enabled);
    active_model.update(db).await.map_err(Into::into)
}

/// Resolves every enabled config into a validated [`Cadence`].
///
/// All configs are checked before the caller does any work, so a single
/// misconfigured round type fails the whole call up front.
///
/// # Errors
/// - `RoundTypeNotFound` when a config points at a missing round type
/// - `UnsupportedDurationUnit` / `InvalidDuration` from [`cadence_step`]
pub async fn enabled_cadences<C>(db: &C) -> Result<Vec<Cadence>>
where
    C: ConnectionTrait,
{
    let mut cadences = Vec::new();

    for config in list_round_configs(db).await? {
        if !config.enabled {
            debug!(config_id = config.id, "Skipping disabled round config");
            continue;
        }

        let round_type = get_round_type(db, config.round_type_id)
            .await?
            .ok_or(Error::RoundTypeNotFound {
                id: config.round_type_id,
            })?;
        let step = cadence_step(&round_type)?;

        cadences.push(Cadence {
            config_id: config.id,
            round_type,
            step,
        });
    }

    Ok(cadences)
}
