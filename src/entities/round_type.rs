//! Round type entity - A named cadence such as "every 15 minutes".
//!
//! The duration is stored as an amount plus a unit string. Only `"minutes"`
//! is understood today; anything else is rejected when the cadence is used.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Round type database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "round_types")]
pub struct Model {
    /// Unique identifier for the round type
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "15 Minute Round")
    pub name: String,
    /// Length of one cadence step, in `duration_unit`s
    pub duration_amount: i32,
    /// Unit of `duration_amount`, currently always `"minutes"`
    pub duration_unit: String,
}

/// Defines relationships between `RoundType` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One round type has many configs
    #[sea_orm(has_many = "super::round_config::Entity")]
    RoundConfigs,
    /// One round type has many roster assignments
    #[sea_orm(has_many = "super::round_assignment::Entity")]
    RoundAssignments,
    /// One round type is linked to many rounds
    #[sea_orm(has_many = "super::round_round_type::Entity")]
    RoundRoundTypes,
}

impl Related<super::round_config::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoundConfigs.def()
    }
}

impl Related<super::round_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoundAssignments.def()
    }
}

impl Related<super::round::Entity> for Entity {
    fn to() -> RelationDef {
        super::round_round_type::Relation::Round.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::round_round_type::Relation::RoundType.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
