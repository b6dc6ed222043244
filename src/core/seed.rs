//! Seeds round types, configs and rosters from config.toml.
//!
//! Seeding only adds: existing round types are matched by name, a config's
//! enabled flag follows the file, and missing roster entries are created.
//! Nothing is ever removed.

use crate::{
    config::rounds::RoundTypeConfig,
    core::{
        assignment::{create_round_assignment, list_assignments_for_type},
        round_type::{
            create_round_config, create_round_type, get_round_config_for_type,
            get_round_type_by_name, set_round_config_enabled,
        },
    },
    errors::Result,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use std::collections::HashSet;
use tracing::{info, warn};

/// Counts of what a seeding pass wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Round types created
    pub round_types_created: usize,
    /// Configs created or toggled
    pub configs_changed: usize,
    /// Roster entries created
    pub assignments_created: usize,
}

/// Applies the configured round types in one transaction.
pub async fn seed_round_types(
    db: &DatabaseConnection,
    round_types: &[RoundTypeConfig],
) -> Result<SeedSummary> {
    let txn = db.begin().await?;
    let mut summary = SeedSummary::default();

    for entry in round_types {
        seed_one(&txn, entry, &mut summary).await?;
    }

    txn.commit().await?;
    info!(
        round_types = summary.round_types_created,
        configs = summary.configs_changed,
        assignments = summary.assignments_created,
        "Round types seeded"
    );
    Ok(summary)
}

async fn seed_one<C>(db: &C, entry: &RoundTypeConfig, summary: &mut SeedSummary) -> Result<()>
where
    C: ConnectionTrait,
{
    let round_type = if let Some(existing) = get_round_type_by_name(db, &entry.name).await? {
        if existing.duration_amount != entry.duration_amount
            || existing.duration_unit != entry.duration_unit
        {
            warn!(
                round_type = %entry.name,
                "Configured duration differs from the stored round type; keeping the stored one"
            );
        }
        existing
    } else {
        summary.round_types_created += 1;
        create_round_type(
            db,
            entry.name.clone(),
            entry.duration_amount,
            entry.duration_unit.clone(),
        )
        .await?
    };

    match get_round_config_for_type(db, round_type.id).await? {
        Some(config) if config.enabled == entry.enabled => {}
        Some(config) => {
            set_round_config_enabled(db, config.id, entry.enabled).await?;
            summary.configs_changed += 1;
        }
        None => {
            create_round_config(db, round_type.id, entry.enabled).await?;
            summary.configs_changed += 1;
        }
    }

    let mut rostered: HashSet<String> = list_assignments_for_type(db, round_type.id)
        .await?
        .into_iter()
        .map(|assignment| assignment.patient_id)
        .collect();

    for patient in &entry.patients {
        if rostered.insert(patient.trim().to_string()) {
            create_round_assignment(db, round_type.id, patient.clone()).await?;
            summary.assignments_created += 1;
        }
    }

    Ok(())
}
