//! Round config entity - Enables or disables one round type for materialization.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Round config database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "round_configs")]
pub struct Model {
    /// Unique identifier for the config
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the round type this config governs
    pub round_type_id: i64,
    /// Disabled configs are skipped by both the materializer and the projector
    pub enabled: bool,
}

/// Defines relationships between `RoundConfig` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each config belongs to one round type
    #[sea_orm(
        belongs_to = "super::round_type::Entity",
        from = "Column::RoundTypeId",
        to = "super::round_type::Column::Id"
    )]
    RoundType,
}

impl Related<super::round_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoundType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
