//! Round membership - the patients to check during one specific round.

use crate::{
    entities::{RoundMember, round_member},
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};

use super::round::status;

/// Lists the members of a round, ordered by patient ID.
pub async fn list_members_for_round<C>(db: &C, round_id: i64) -> Result<Vec<round_member::Model>>
where
    C: ConnectionTrait,
{
    RoundMember::find()
        .filter(round_member::Column::RoundId.eq(round_id))
        .order_by_asc(round_member::Column::PatientId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a patient to a round.
///
/// Returns `true` when the member was written and `false` when the patient was
/// already on the round; an existing member's status is left untouched.
pub async fn create_round_member<C>(db: &C, round_id: i64, patient_id: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let member = round_member::ActiveModel {
        round_id: Set(round_id),
        patient_id: Set(patient_id.to_string()),
        status: Set(status::CREATED.to_string()),
    };

    let inserted = RoundMember::insert(member)
        .on_conflict(
            OnConflict::columns([
                round_member::Column::RoundId,
                round_member::Column::PatientId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(inserted > 0)
}
