//! User administration handlers (admin only).

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde::Deserialize;
use tracing::instrument;

use solebox_core::{Role, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Role change body.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Reject an admin removing their own admin role.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a self-demotion.
pub fn check_role_change(actor: &CurrentUser, target: UserId, role: Role) -> Result<()> {
    if actor.id == target && role != Role::Admin {
        return Err(AppError::BadRequest(
            "admins cannot remove their own admin role".to_string(),
        ));
    }
    Ok(())
}

/// Every account.
#[instrument(skip(state), fields(user_id = %admin.id))]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(Json(users))
}

/// One account.
#[instrument(skip(state), fields(user_id = %admin.id))]
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<User>> {
    let Path(id) = path?;
    let user = AuthService::new(state.pool())
        .get_user(UserId::new(id))
        .await?;
    Ok(Json(user))
}

/// Change an account's role.
///
/// Takes effect the next time that user logs in.
#[instrument(skip(state, body), fields(user_id = %admin.id))]
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    path: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let Path(id) = path?;
    let Json(req) = body?;
    let target = UserId::new(id);
    check_role_change(&admin, target, req.role)?;

    let user = AuthService::new(state.pool())
        .set_role(target, req.role)
        .await?;

    tracing::info!(target_user = %target, role = %req.role, "role changed");

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: CurrentUser = CurrentUser {
        id: UserId::new(1),
        role: Role::Admin,
    };

    #[test]
    fn test_admin_cannot_demote_self() {
        assert!(matches!(
            check_role_change(&ADMIN, UserId::new(1), Role::Customer),
            Err(AppError::BadRequest(_))
        ));
        assert!(check_role_change(&ADMIN, UserId::new(1), Role::Admin).is_ok());
    }

    #[test]
    fn test_admin_can_change_others() {
        assert!(check_role_change(&ADMIN, UserId::new(2), Role::Seller).is_ok());
        assert!(check_role_change(&ADMIN, UserId::new(2), Role::Customer).is_ok());
    }
}
