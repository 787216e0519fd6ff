/// Database configuration and connection management
pub mod database;

/// Default category configuration from config.toml
pub mod categories;
