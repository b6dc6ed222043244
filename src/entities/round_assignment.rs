//! Round assignment entity - Puts a patient on a round type's roster.
//!
//! A patient may be assigned to several round types at once.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Round assignment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "round_assignments")]
pub struct Model {
    /// Unique identifier for the assignment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the round type whose roster this entry belongs to
    pub round_type_id: i64,
    /// External patient identifier
    pub patient_id: String,
}

/// Defines relationships between `RoundAssignment` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each assignment belongs to one round type
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
