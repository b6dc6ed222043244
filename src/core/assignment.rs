//! Roster operations - which patients are assigned to which round type.

use crate::{
    entities::{RoundAssignment, round_assignment},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Assigns a patient to a round type's roster.
pub async fn create_round_assignment<C>(
    db: &C,
    round_type_id: i64,
    patient_id: String,
) -> Result<round_assignment::Model>
where
    C: ConnectionTrait,
{
    if patient_id.trim().is_empty() {
        return Err(Error::Config {
            message: "Patient ID cannot be empty".to_string(),
        });
    }

    let assignment = round_assignment::ActiveModel {
        round_type_id: Set(round_type_id),
        patient_id: Set(patient_id.trim().to_string()),
        ..Default::default()
    };

    let result = assignment.insert(db).await?;
    Ok(result)
}

/// Lists the roster of a round type in assignment order.
pub async fn list_assignments_for_type<C>(
    db: &C,
    round_type_id: i64,
) -> Result<Vec<round_assignment::Model>>
where
    C: ConnectionTrait,
{
    RoundAssignment::find()
        .filter(round_assignment::Column::RoundTypeId.eq(round_type_id))
        .order_by_asc(round_assignment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Removes a patient from a roster.
///
/// Rounds already materialized keep their members; only future rounds see the
/// shorter roster. Returns `false` when no such assignment existed.
pub async fn delete_round_assignment<C>(db: &C, assignment_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = RoundAssignment::delete_by_id(assignment_id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
