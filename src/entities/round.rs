//! Round entity - One materialized time bucket.
//!
//! `round_timestamp` is the canonical key: an RFC 3339 UTC string with second
//! precision (`2022-01-10T09:30:00Z`). It is unique across the table, so
//! cadences that land on the same instant share a single round.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Round database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rounds")]
pub struct Model {
    /// Unique identifier, assigned in creation order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Canonical timestamp of the slot this round covers
    #[sea_orm(unique)]
    pub round_timestamp: String,
    /// Free-form status; starts as `"CREATED"` and is advanced externally
    pub status: String,
    /// When the round row was written
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Round and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One round serves many round types through the link table
    #[sea_orm(has_many = "super::round_round_type::Entity")]
    RoundRoundTypes,
    /// One round has many members
    #[sea_orm(has_many = "super::round_member::Entity")]
    RoundMembers,
}

impl Related<super::round_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoundMembers.def()
    }
}

impl Related<super::round_round_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoundRoundTypes.def()
    }
}

impl Related<super::round_type::Entity> for Entity {
    fn to() -> RelationDef {
        super::round_round_type::Relation::RoundType.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::round_round_type::Relation::Round.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
