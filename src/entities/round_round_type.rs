//! Join entity linking a round to each round type it serves.
//!
//! The composite primary key keeps at most one link per (round, round type).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Round-to-round-type link database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "round_round_types")]
pub struct Model {
    /// ID of the linked round
    #[sea_orm(primary_key, auto_increment = false)]
    pub round_id: i64,
    /// ID of the round type the round serves
    #[sea_orm(primary_key, auto_increment = false)]
    pub round_type_id: i64,
}

/// Defines relationships between a link and the two entities it joins
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link points at one round
    #[sea_orm(
        belongs_to = "super::round::Entity",
        from = "Column::RoundId",
        to = "super::round::Column::Id"
    )]
    Round,
    /// Each link points at one round type
    #[sea_orm(
        belongs_to = "super::round_type::Entity",
        from = "Column::RoundTypeId",
        to = "super::round_type::Column::Id"
    )]
    RoundType,
}

impl Related<super::round::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Round.def()
    }
}

impl Related<super::round_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoundType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
