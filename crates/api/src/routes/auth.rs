//! Auth route handlers: login, Google sign-in, logout, session identity.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{RequireUser, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginForm {
    /// The ID token the Google Identity Services widget hands the SPA.
    pub credential: String,
}

/// `POST /api/auth` - username/password login.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<Value>> {
    let user = AuthService::new(state.pool())
        .login(&form.username, &form.password)
        .await?;

    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        role: user.role,
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "message": "Login successful",
        "role": user.role,
    })))
}

/// `POST /api/auth/google` - Google ID-token sign-in.
///
/// Creates the account on first sign-in; the email address doubles as the
/// username.
#[instrument(skip_all)]
pub async fn google_login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<GoogleLoginForm>,
) -> Result<Json<Value>> {
    let user = AuthService::new(state.pool())
        .login_with_google(
            state.http(),
            state.config().google_client_id.as_deref(),
            &form.credential,
        )
        .await?;

    let current = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        role: user.role,
    };
    set_current_user(&session, &current)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "message": "Login successful",
        "role": user.role,
    })))
}

/// `POST /api/auth/logout`.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "message": "Logged out" })))
}

/// `GET /api/auth/me` - the session's identity, for SPA session restore.
#[instrument(skip_all)]
pub async fn me(RequireUser(current): RequireUser) -> Json<CurrentUser> {
    Json(current)
}
