/// Database configuration and connection management
pub mod database;

/// Application and round type configuration loading from config.toml
pub mod rounds;
