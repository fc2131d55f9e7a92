//! Database migration command.
//!
//! ```bash
//! sb-cli migrate
//! ```
//!
//! Applies `crates/storefront/migrations/` and then creates the
//! tower-sessions table used for session carts.

use tower_sessions_sqlx_store::PostgresStore;

use super::{CliError, connect};

/// Run storefront migrations and the session store migration.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Creating session store table...");
    PostgresStore::new(pool.clone())
        .migrate()
        .await
        .map_err(|e| CliError::SessionStore(e.to_string()))?;

    tracing::info!("Migrations complete!");
    Ok(())
}
