/// Database configuration and connection management
pub mod database;

/// Draft defaults and seed habits from config.toml
pub mod habits;
