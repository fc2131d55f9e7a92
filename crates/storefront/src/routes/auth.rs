//! Authentication route handlers.
//!
//! Both endpoints answer with a fresh bearer token and the account it
//! belongs to. They sit behind the auth rate limiter.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Login and registration body.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Token plus the account it was issued for.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

fn respond(state: &AppState, user: User) -> Result<AuthResponse> {
    let token = state.tokens().issue(user.id, user.role)?;
    Ok(AuthResponse { token, user })
}

/// Create a customer account.
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = body?;

    let user = AuthService::new(state.pool())
        .register_with_password(&req.email, &req.password)
        .await?;

    tracing::info!(user_id = %user.id, "account registered");

    Ok((StatusCode::CREATED, Json(respond(&state, user)?)))
}

/// Exchange email and password for a token.
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let Json(req) = body?;

    let user = AuthService::new(state.pool())
        .login_with_password(&req.email, &req.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "login failed"))?;

    tracing::info!(user_id = %user.id, role = %user.role, "login");

    Ok(Json(respond(&state, user)?))
}
