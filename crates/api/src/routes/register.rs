//! Registration and email verification route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailForm {
    pub token: String,
}

/// `POST /register`.
///
/// Creates a disabled account and sends the verification mail. A failed mail
/// send rolls the registration back so the user can retry.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<Value>)> {
    AuthService::new(state.pool())
        .register(
            state.mailer(),
            &state.config().frontend_url,
            &form.username,
            &form.email,
            &form.password,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful! Please check your email to verify your account.",
        })),
    ))
}

/// `POST /verify-email`.
#[instrument(skip_all)]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(form): Json<VerifyEmailForm>,
) -> Result<Json<Value>> {
    if form.token.is_empty() {
        return Err(AppError::BadRequest("Token is required".to_string()));
    }

    let token = Uuid::parse_str(&form.token)
        .map_err(|_| AppError::BadRequest("Invalid verification token".to_string()))?;

    AuthService::new(state.pool()).verify_email(token).await?;

    Ok(Json(json!({
        "message": "Email verified successfully! You can now log in.",
    })))
}
