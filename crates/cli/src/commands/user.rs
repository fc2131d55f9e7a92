//! User management commands.
//!
//! ```bash
//! # Make the first admin after they've registered through the API
//! sb-cli user promote -e admin@example.com -r admin
//! ```

use solebox_core::{Email, Role};
use solebox_storefront::db::{RepositoryError, UserRepository};

use super::{CliError, connect};

/// Set the role of an existing account.
///
/// Tokens already issued keep their old role until they expire.
///
/// # Errors
///
/// Returns an error for an invalid email or role, or an unknown account.
pub async fn promote(email: &str, role: &str) -> Result<(), CliError> {
    let role: Role = role.parse().map_err(|_| CliError::InvalidArgument {
        field: "role",
        value: role.to_owned(),
    })?;
    let email = Email::parse(email).map_err(|_| CliError::InvalidArgument {
        field: "email",
        value: email.to_owned(),
    })?;

    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .set_role_by_email(&email, role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CliError::UserNotFound(email.to_string()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, email = %user.email, role = %user.role, "Role updated");
    Ok(())
}
