/// Database connection and schema management
pub mod database;

/// Application settings from config.toml and the environment
pub mod settings;
