//! Database migration command.

use mrbs_core::config::AppConfig;
use mrbs_core::error::AppError;
use mrbs_database::DatabasePool;
use mrbs_database::migration::run_migrations;

use crate::output;

/// Apply every pending migration.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    let result = run_migrations(pool.pool()).await;
    pool.close().await;
    result?;

    output::print_success("Migrations applied");
    Ok(())
}
