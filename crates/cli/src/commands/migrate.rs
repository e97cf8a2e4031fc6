//! Database migration command.

use tracing::info;

use proshop_server::db;

use super::{CommandError, database_url};

/// Run database migrations.
///
/// # Errors
///
/// Returns an error if `PROSHOP_DATABASE_URL` is not set or a migration
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running migrations...");
    db::MIGRATOR.run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
