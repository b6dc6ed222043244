//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod round;
pub mod round_assignment;
pub mod round_config;
pub mod round_member;
pub mod round_round_type;
pub mod round_type;

// Re-export specific types to avoid conflicts
pub use round::{Column as RoundColumn, Entity as Round, Model as RoundModel};
pub use round_assignment::{
    Column as RoundAssignmentColumn, Entity as RoundAssignment, Model as RoundAssignmentModel,
};
pub use round_config::{
    Column as RoundConfigColumn, Entity as RoundConfig, Model as RoundConfigModel,
};
pub use round_member::{
    Column as RoundMemberColumn, Entity as RoundMember, Model as RoundMemberModel,
};
pub use round_round_type::{
    Column as RoundRoundTypeColumn, Entity as RoundRoundType, Model as RoundRoundTypeModel,
};
pub use round_type::{Column as RoundTypeColumn, Entity as RoundType, Model as RoundTypeModel};
