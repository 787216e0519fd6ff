use dotenvy::dotenv;
use pocket_ledger::{
    config::{categories, database},
    core::category,
    errors::{Error, Result},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Optionally seed default categories for one user
    if let Ok(raw) = env::var("SEED_USER_ID") {
        let user_id: i64 = raw.trim().parse().map_err(|e| Error::Config {
            message: format!("SEED_USER_ID must be an integer: {e}"),
        })?;
        let defaults = categories::load_default_categories()?;
        category::seed_default_categories(&db, user_id, &defaults)
            .await
            .inspect_err(|e| error!("Failed to seed default categories: {}", e))?;
    }

    Ok(())
}
