//! Password reset route handlers.
//!
//! Both endpoints answer 200 with a `success` flag rather than HTTP errors;
//! the request endpoint gives the same answer whether or not the email is
//! registered so it cannot be used to enumerate accounts.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RequestForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /api/password-reset/request`.
#[instrument(skip_all)]
pub async fn request(
    State(state): State<AppState>,
    Json(form): Json<RequestForm>,
) -> Result<Json<Value>> {
    if form.email.is_empty() {
        return Ok(Json(json!({
            "success": false,
            "message": "Email is required",
        })));
    }

    AuthService::new(state.pool())
        .request_password_reset(state.mailer(), &state.config().frontend_url, &form.email)
        .await?;

    // Same answer whether or not the account exists
    Ok(Json(json!({
        "success": true,
        "message": "If an account with that email exists, a reset link has been sent.",
    })))
}

/// `POST /api/password-reset/confirm`.
#[instrument(skip_all)]
pub async fn confirm(
    State(state): State<AppState>,
    Json(form): Json<ConfirmForm>,
) -> Result<Json<Value>> {
    let Ok(token) = Uuid::parse_str(&form.token) else {
        return Ok(Json(json!({
            "success": false,
            "message": "Invalid token or password",
        })));
    };

    match AuthService::new(state.pool())
        .confirm_password_reset(token, &form.password)
        .await
    {
        Ok(()) => Ok(Json(json!({
            "success": true,
            "message": "Password has been reset successfully",
        }))),
        Err(AuthError::WeakPassword(_)) => Ok(Json(json!({
            "success": false,
            "message": "Invalid token or password",
        }))),
        Err(AuthError::InvalidToken(_)) => Ok(Json(json!({
            "success": false,
            "message": "Invalid or expired token",
        }))),
        Err(e) => Err(e.into()),
    }
}
