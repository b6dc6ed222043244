//! Database configuration module for round-keeper.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the unique timestamp on rounds and the composite keys on the link and member tables
//! come straight from the Rust structs.

use crate::entities::{Round, RoundAssignment, RoundConfig, RoundMember, RoundRoundType, RoundType};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://round_keeper.sqlite?mode=rwc";

/// Resolves the database URL: explicit value first, then `DATABASE_URL`,
/// then a local `SQLite` file.
#[must_use]
pub fn resolve_database_url(configured: Option<&str>) -> String {
    configured.map_or_else(
        || std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
        ToString::to_string,
    )
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {database_url}");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables if they do not exist yet.
///
/// Parents are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = [
        schema.create_table_from_entity(RoundType),
        schema.create_table_from_entity(RoundConfig),
        schema.create_table_from_entity(RoundAssignment),
        schema.create_table_from_entity(Round),
        schema.create_table_from_entity(RoundRoundType),
        schema.create_table_from_entity(RoundMember),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(&*statement)).await?;
    }

    info!("Database tables ensured");
    Ok(())
}
