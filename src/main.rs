use chrono::{TimeDelta, Utc};
use dotenvy::dotenv;
use round_keeper::{
    config::{database, rounds},
    core::{materialize, project, seed},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = rounds::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let database_url = database::resolve_database_url(app_config.database_url.as_deref());
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Seed round types and rosters from the config file
    seed::seed_round_types(&db, &app_config.round_types)
        .await
        .inspect_err(|e| error!("Failed to seed round types: {}", e))?;

    // 6. Materialize and report, once or on every tick
    let lookback = TimeDelta::hours(app_config.lookback_hours);
    match app_config.tick_seconds {
        None => run_once(&db, lookback).await,
        Some(seconds) => {
            info!("Materializing every {} seconds", seconds);
            let mut interval = tokio::time::interval(Duration::from_secs(seconds.max(1)));
            loop {
                interval.tick().await;
                run_once(&db, lookback).await?;
            }
        }
    }
}

async fn run_once(db: &DatabaseConnection, lookback: TimeDelta) -> Result<()> {
    let now = Utc::now();
    materialize(db, now)
        .await
        .inspect_err(|e| error!("Materialization failed: {}", e))?;

    let timeline = project(db, now - lookback, now).await?;
    println!("{}", serde_json::to_string_pretty(&timeline)?);
    Ok(())
}
