//! Round member entity - A patient who must be checked during a specific round.
//!
//! Membership is a snapshot of the roster taken when the round is first
//! materialized for a round type. The composite key allows one row per
//! (round, patient).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Round member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "round_members")]
pub struct Model {
    /// ID of the round
    #[sea_orm(primary_key, auto_increment = false)]
    pub round_id: i64,
    /// External patient identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub patient_id: String,
    /// Per-patient check status, `"CREATED"` until someone records the check
    pub status: String,
}

/// Defines relationships between `RoundMember` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each member belongs to one round
    #[sea_orm(
        belongs_to = "super::round::Entity",
        from = "Column::RoundId",
        to = "super::round::Column::Id"
    )]
    Round,
}

impl Related<super::round::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Round.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
