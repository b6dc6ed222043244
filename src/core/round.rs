//! Round business logic - Lookups and writes for rounds and their type links.
//!
//! Rounds are keyed by their canonical timestamp string. Every lookup here is
//! by exact string equality, so callers must format instants with
//! [`format_timestamp`] before querying.

use crate::{
    entities::{Round, RoundRoundType, RoundType, round, round_round_type, round_type},
    errors::{Error, Result},
};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};

/// Status literals used by the materializer and the projector.
pub mod status {
    /// Written by the materializer on every new round
    pub const CREATED: &str = "CREATED";
    /// A slot that is expected but not yet underway
    pub const NOT_STARTED: &str = "NOT_STARTED";
    /// A `NOT_STARTED` slot that has gone stale
    pub const MISSED: &str = "MISSED";
    /// Set externally when staff begin a round
    pub const STARTED: &str = "STARTED";
    /// Set externally when staff finish a round
    pub const COMPLETE: &str = "COMPLETE";
}

/// Formats an instant as the canonical round key, e.g. `2022-01-10T09:30:00Z`.
///
/// Sub-second precision is dropped.
#[must_use]
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .trunc_subsecs(0)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a canonical round key back into an instant.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| Error::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Finds a round by its unique ID.
pub async fn get_round_by_id<C>(db: &C, round_id: i64) -> Result<Option<round::Model>>
where
    C: ConnectionTrait,
{
    Round::find_by_id(round_id).one(db).await.map_err(Into::into)
}

/// Finds the round stored at exactly `timestamp`, if any.
pub async fn get_round_by_timestamp<C>(db: &C, timestamp: &str) -> Result<Option<round::Model>>
where
    C: ConnectionTrait,
{
    Round::find()
        .filter(round::Column::RoundTimestamp.eq(timestamp))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the latest-timestamped round linked to a round type.
///
/// Canonical keys are fixed width, so ordering by the key string is
/// chronological. Row IDs are not: a round may be created by one cadence and
/// only linked by another later on.
pub async fn get_latest_round_for_type<C>(
    db: &C,
    round_type_id: i64,
) -> Result<Option<round::Model>>
where
    C: ConnectionTrait,
{
    Round::find()
        .inner_join(RoundRoundType)
        .filter(round_round_type::Column::RoundTypeId.eq(round_type_id))
        .order_by_desc(round::Column::RoundTimestamp)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists rounds whose timestamp falls in `[start, end]`, oldest first.
pub async fn list_rounds_in_window<C>(
    db: &C,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<round::Model>>
where
    C: ConnectionTrait,
{
    Round::find()
        .filter(round::Column::RoundTimestamp.between(format_timestamp(start), format_timestamp(end)))
        .order_by_asc(round::Column::RoundTimestamp)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a round at `timestamp` with the given initial status.
///
/// The timestamp column is unique; creating a second round for the same
/// instant fails with a database error.
pub async fn create_round<C>(
    db: &C,
    timestamp: DateTime<Utc>,
    initial_status: &str,
) -> Result<round::Model>
where
    C: ConnectionTrait,
{
    let round = round::ActiveModel {
        round_timestamp: Set(format_timestamp(timestamp)),
        status: Set(initial_status.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = round.insert(db).await?;
    Ok(result)
}

/// Links a round to a round type it serves.
///
/// Returns `true` when a link was written and `false` when it already existed.
pub async fn link_round_to_type<C>(db: &C, round_id: i64, round_type_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let link = round_round_type::ActiveModel {
        round_id: Set(round_id),
        round_type_id: Set(round_type_id),
    };

    let inserted = RoundRoundType::insert(link)
        .on_conflict(
            OnConflict::columns([
                round_round_type::Column::RoundId,
                round_round_type::Column::RoundTypeId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(inserted > 0)
}

/// Lists the round types a round serves, ordered by ID.
pub async fn list_round_types_for_round<C>(
    db: &C,
    round_id: i64,
) -> Result<Vec<round_type::Model>>
where
    C: ConnectionTrait,
{
    RoundType::find()
        .inner_join(Round)
        .filter(round::Column::Id.eq(round_id))
        .order_by_asc(round_type::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a round to a new status (e.g. `STARTED`, `COMPLETE`).
pub async fn update_round_status<C>(db: &C, round_id: i64, new_status: &str) -> Result<round::Model>
where
    C: ConnectionTrait,
{
    let round = Round::find_by_id(round_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Config {
            message: format!("Round {round_id} not found"),
        })?;

    let mut active_model: round::ActiveModel = round.into();
    active_model.status = Set(new_status.to_string());
    active_model.update(db).await.map_err(Into::into)
}
