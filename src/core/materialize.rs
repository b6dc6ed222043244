//! Round materialization - Persists the rounds that elapsed time has made due.
//!
//! For each enabled cadence the walk resumes one step after the last round
//! linked to that cadence (or twelve hours back on the first run) and visits
//! every slot up to and including `now`. At each slot the shared round is
//! found or created, linked to the cadence, and topped up with the cadence's
//! current roster. Running twice for the same `now` writes nothing new.
//!
//! Runs are assumed to be serialized: one writer per database. Overlapping
//! runs would both resume from the same last round.

use crate::{
    core::{
        assignment::list_assignments_for_type,
        member::{create_round_member, list_members_for_round},
        round::{
            create_round, format_timestamp, get_latest_round_for_type, get_round_by_timestamp,
            link_round_to_type, parse_timestamp, status,
        },
        round_type::{Cadence, enabled_cadences},
    },
    entities::round_assignment,
    errors::Result,
};
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// How far back, in hours, a cadence with no rounds yet starts its first walk.
pub const BOOTSTRAP_LOOKBACK_HOURS: i64 = 12;

/// Counts of what one materialization run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeSummary {
    /// Enabled cadences that were walked
    pub cadences_walked: usize,
    /// New rounds created
    pub rounds_created: usize,
    /// New round-to-type links
    pub links_created: usize,
    /// New round members
    pub members_created: usize,
}

impl MaterializeSummary {
    /// True when the run wrote nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.rounds_created == 0 && self.links_created == 0 && self.members_created == 0
    }
}

/// Materializes every due round up to `now` inside a single transaction.
///
/// Any error aborts the run and rolls back everything it wrote.
///
/// # Errors
/// - Configuration errors from [`enabled_cadences`] (unsupported unit,
///   missing round type), raised before anything is written
/// - Database errors, and `InvalidTimestamp` if a stored round key is corrupt
#[instrument(skip(db))]
pub async fn materialize(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<MaterializeSummary> {
    let txn = db.begin().await?;
    let summary = materialize_with(&txn, now).await?;
    txn.commit().await?;

    info!(
        cadences = summary.cadences_walked,
        rounds = summary.rounds_created,
        links = summary.links_created,
        members = summary.members_created,
        "Materialization complete"
    );
    Ok(summary)
}

/// Runs the materialization walk on an existing connection or transaction.
pub async fn materialize_with<C>(db: &C, now: DateTime<Utc>) -> Result<MaterializeSummary>
where
    C: ConnectionTrait,
{
    let now = now.trunc_subsecs(0);
    let mut summary = MaterializeSummary::default();

    for cadence in enabled_cadences(db).await? {
        walk_cadence(db, &cadence, now, &mut summary).await?;
        summary.cadences_walked += 1;
    }

    Ok(summary)
}

async fn walk_cadence<C>(
    db: &C,
    cadence: &Cadence,
    now: DateTime<Utc>,
    summary: &mut MaterializeSummary,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let round_type = &cadence.round_type;

    let start = match get_latest_round_for_type(db, round_type.id).await? {
        Some(last) => parse_timestamp(&last.round_timestamp)? + cadence.step,
        None => {
            debug!(
                config_id = cadence.config_id,
                round_type = %round_type.name,
                "No prior rounds, bootstrapping"
            );
            now - TimeDelta::hours(BOOTSTRAP_LOOKBACK_HOURS)
        }
    };

    let roster = list_assignments_for_type(db, round_type.id).await?;
    debug!(
        config_id = cadence.config_id,
        round_type = %round_type.name,
        start = %format_timestamp(start),
        roster = roster.len(),
        "Walking cadence"
    );

    let mut slot = start;
    while slot <= now {
        materialize_slot(db, round_type.id, &roster, slot, summary).await?;
        slot += cadence.step;
    }

    Ok(())
}

async fn materialize_slot<C>(
    db: &C,
    round_type_id: i64,
    roster: &[round_assignment::Model],
    slot: DateTime<Utc>,
    summary: &mut MaterializeSummary,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let round = match get_round_by_timestamp(db, &format_timestamp(slot)).await? {
        Some(existing) => existing,
        None => {
            summary.rounds_created += 1;
            create_round(db, slot, status::CREATED).await?
        }
    };

    if link_round_to_type(db, round.id, round_type_id).await? {
        summary.links_created += 1;
    }

    // Union with whoever is already on the round, possibly from another cadence
    let mut members: HashSet<String> = list_members_for_round(db, round.id)
        .await?
        .into_iter()
        .map(|member| member.patient_id)
        .collect();

    for assignment in roster {
        if members.insert(assignment.patient_id.clone())
            && create_round_member(db, round.id, &assignment.patient_id).await?
        {
            summary.members_created += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::round::{get_round_by_timestamp, list_round_types_for_round};
    use crate::core::round_type::{
        create_round_config, create_round_type, get_round_config_for_type,
        set_round_config_enabled,
    };
    use crate::entities::{Round, RoundMember, RoundRoundType, round};
    use crate::errors::Error;
    use crate::test_utils::*;
    use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};

    async fn all_rounds(db: &DatabaseConnection) -> Result<Vec<round::Model>> {
        Ok(Round::find()
            .order_by_asc(round::Column::RoundTimestamp)
            .all(db)
            .await?)
    }

    async fn members_at(db: &DatabaseConnection, timestamp: &str) -> Result<Vec<String>> {
        let round = get_round_by_timestamp(db, timestamp).await?.unwrap();
        Ok(list_members_for_round(db, round.id)
            .await?
            .into_iter()
            .map(|m| m.patient_id)
            .collect())
    }

    #[tokio::test]
    async fn test_bootstrap_creates_twelve_hours_of_rounds() -> Result<()> {
        let db = setup_test_db().await?;
        create_cadence(&db, "15 Minute Round", 15, true).await?;

        let summary = materialize(&db, at(9, 30)).await?;
        assert_eq!(summary.rounds_created, 49);
        assert_eq!(summary.links_created, 49);
        assert_eq!(summary.cadences_walked, 1);

        let rounds = all_rounds(&db).await?;
        assert_eq!(rounds.len(), 49);
        assert_eq!(rounds[0].round_timestamp, "2022-01-09T21:30:00Z");
        assert_eq!(rounds[48].round_timestamp, "2022-01-10T09:30:00Z");
        assert!(rounds.iter().all(|r| r.status == status::CREATED));

        Ok(())
    }

    #[tokio::test]
    async fn test_materialize_is_idempotent() -> Result<()> {
        let (db, cadences) = setup_standard_cadences().await?;
        assign_patients(&db, cadences[0].id, &["patient-1"]).await?;

        let first = materialize(&db, at(9, 30)).await?;
        assert!(!first.is_noop());

        let second = materialize(&db, at(9, 30)).await?;
        assert!(second.is_noop());
        assert_eq!(second.cadences_walked, 3);

        assert_eq!(Round::find().count(&db).await?, 49);
        assert_eq!(RoundRoundType::find().count(&db).await?, 49 + 25 + 13);
        assert_eq!(RoundMember::find().count(&db).await?, 49);

        Ok(())
    }

    #[tokio::test]
    async fn test_catch_up_from_last_round() -> Result<()> {
        let db = setup_test_db().await?;
        let quarter = create_cadence(&db, "15 Minute Round", 15, true).await?;
        create_linked_round(&db, at(8, 30), status::COMPLETE, &[quarter.id]).await?;

        let summary = materialize(&db, at(9, 30)).await?;
        assert_eq!(summary.rounds_created, 4);

        let timestamps: Vec<String> = all_rounds(&db)
            .await?
            .into_iter()
            .map(|r| r.round_timestamp)
            .collect();
        assert_eq!(
            timestamps,
            vec![
                "2022-01-10T08:30:00Z",
                "2022-01-10T08:45:00Z",
                "2022-01-10T09:00:00Z",
                "2022-01-10T09:15:00Z",
                "2022-01-10T09:30:00Z",
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_cadences_share_rounds_on_aligned_slots() -> Result<()> {
        let (db, cadences) = setup_standard_cadences().await?;

        let summary = materialize(&db, at(9, 30)).await?;
        assert_eq!(summary.rounds_created, 49);
        assert_eq!(summary.links_created, 87);

        let rounds = all_rounds(&db).await?;
        let distinct: HashSet<&str> = rounds.iter().map(|r| r.round_timestamp.as_str()).collect();
        assert_eq!(distinct.len(), rounds.len());

        let at_930 = get_round_by_timestamp(&db, "2022-01-10T09:30:00Z").await?.unwrap();
        let linked: Vec<i64> = list_round_types_for_round(&db, at_930.id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(linked, cadences.iter().map(|c| c.id).collect::<Vec<_>>());

        let at_915 = get_round_by_timestamp(&db, "2022-01-10T09:15:00Z").await?.unwrap();
        let linked = list_round_types_for_round(&db, at_915.id).await?;
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, cadences[0].id);

        Ok(())
    }

    #[tokio::test]
    async fn test_only_due_cadences_attach_to_new_round() -> Result<()> {
        let (db, cadences) = setup_standard_cadences().await?;
        let ids: Vec<i64> = cadences.iter().map(|c| c.id).collect();
        create_linked_round(&db, at(9, 15), status::CREATED, &ids).await?;

        let summary = materialize(&db, at(9, 30)).await?;
        assert_eq!(summary.rounds_created, 1);
        assert_eq!(summary.links_created, 1);

        let new_round = get_round_by_timestamp(&db, "2022-01-10T09:30:00Z").await?.unwrap();
        let linked = list_round_types_for_round(&db, new_round.id).await?;
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].id, cadences[0].id);

        Ok(())
    }

    #[tokio::test]
    async fn test_disabled_cadence_catches_up_when_re_enabled() -> Result<()> {
        let db = setup_test_db().await?;
        let hourly = create_cadence(&db, "60 Minute Round", 60, true).await?;
        create_linked_round(&db, at(6, 0), status::COMPLETE, &[hourly.id]).await?;

        let config = get_round_config_for_type(&db, hourly.id).await?.unwrap();
        set_round_config_enabled(&db, config.id, false).await?;

        let summary = materialize(&db, at(9, 0)).await?;
        assert_eq!(summary.cadences_walked, 0);
        assert!(summary.is_noop());

        set_round_config_enabled(&db, config.id, true).await?;
        let summary = materialize(&db, at(9, 0)).await?;
        // 07:00, 08:00, 09:00
        assert_eq!(summary.rounds_created, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_membership_is_snapshotted_per_round() -> Result<()> {
        let db = setup_test_db().await?;
        let quarter = create_cadence(&db, "15 Minute Round", 15, true).await?;
        assign_patients(&db, quarter.id, &["patient-1"]).await?;

        materialize(&db, at(9, 30)).await?;
        assert_eq!(members_at(&db, "2022-01-10T09:30:00Z").await?, vec!["patient-1"]);

        assign_patients(&db, quarter.id, &["patient-2"]).await?;
        let summary = materialize(&db, at(10, 0)).await?;
        assert_eq!(summary.rounds_created, 2);
        assert_eq!(summary.members_created, 4);

        // Rounds from the earlier run keep their original membership
        assert_eq!(members_at(&db, "2022-01-10T09:30:00Z").await?, vec!["patient-1"]);
        assert_eq!(
            members_at(&db, "2022-01-10T10:00:00Z").await?,
            vec!["patient-1", "patient-2"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_shared_round_unions_rosters() -> Result<()> {
        let db = setup_test_db().await?;
        let quarter = create_cadence(&db, "15 Minute Round", 15, true).await?;
        let half = create_cadence(&db, "30 Minute Round", 30, true).await?;
        assign_patients(&db, quarter.id, &["patient-a", "patient-shared"]).await?;
        assign_patients(&db, half.id, &["patient-b", "patient-shared"]).await?;

        materialize(&db, at(9, 30)).await?;

        assert_eq!(
            members_at(&db, "2022-01-10T09:30:00Z").await?,
            vec!["patient-a", "patient-b", "patient-shared"]
        );
        assert_eq!(
            members_at(&db, "2022-01-10T09:15:00Z").await?,
            vec!["patient-a", "patient-shared"]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_unsupported_unit_aborts_without_writes() -> Result<()> {
        let db = setup_test_db().await?;
        create_cadence(&db, "15 Minute Round", 15, true).await?;
        let hourly = create_round_type(&db, "Hourly".to_string(), 1, "hours".to_string()).await?;
        create_round_config(&db, hourly.id, true).await?;

        let result = materialize(&db, at(9, 30)).await;
        assert!(matches!(result, Err(Error::UnsupportedDurationUnit { .. })));
        assert_eq!(Round::find().count(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_sub_second_now_is_truncated() -> Result<()> {
        let db = setup_test_db().await?;
        create_cadence(&db, "60 Minute Round", 60, true).await?;

        materialize(&db, at(9, 30) + TimeDelta::milliseconds(400)).await?;

        assert!(get_round_by_timestamp(&db, "2022-01-10T09:30:00Z").await?.is_some());
        assert_eq!(Round::find().count(&db).await?, 13);

        Ok(())
    }

    #[tokio::test]
    async fn test_rerun_after_roster_change_with_descending_config_order() -> Result<()> {
        let db = setup_test_db().await?;
        // Longest cadence first, so shared rounds get their IDs from the hourly walk
        let hourly = create_cadence(&db, "60 Minute Round", 60, true).await?;
        let half = create_cadence(&db, "30 Minute Round", 30, true).await?;
        create_cadence(&db, "15 Minute Round", 15, true).await?;

        materialize(&db, at(9, 30)).await?;
        let latest = get_latest_round_for_type(&db, half.id).await?.unwrap();
        assert_eq!(latest.round_timestamp, "2022-01-10T09:30:00Z");

        assign_patients(&db, half.id, &["late-patient"]).await?;
        assign_patients(&db, hourly.id, &["late-patient-2"]).await?;
        let rerun = materialize(&db, at(9, 30)).await?;
        assert!(rerun.is_noop());

        for timestamp in ["2022-01-10T09:00:00Z", "2022-01-10T09:30:00Z"] {
            assert!(members_at(&db, timestamp).await?.is_empty());
        }

        // The new patient shows up on the next slot that cadence reaches
        materialize(&db, at(10, 0)).await?;
        assert_eq!(members_at(&db, "2022-01-10T10:00:00Z").await?, vec!["late-patient"]);
        assert!(members_at(&db, "2022-01-10T09:30:00Z").await?.is_empty());

        Ok(())
    }
}
