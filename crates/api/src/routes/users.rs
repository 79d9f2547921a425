//! User route handlers: the legacy `/user/*` surface plus the profile
//! endpoints the SPA uses to complete a shipping profile before checkout.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use torque_core::{Email, Role, UserId};

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserForm {
    pub username: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditUserForm {
    pub id: UserId,
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Legacy surface
// =============================================================================

/// `GET /user/getAll`.
#[instrument(skip_all)]
pub async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users))
}

/// `GET /user/getById?userId=`.
#[instrument(skip_all)]
pub async fn get_by_id(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(UserId::new(query.user_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found!", query.user_id)))?;

    Ok(Json(user))
}

/// `POST /user/create`.
///
/// The legacy create has no policy checks beyond what the database enforces;
/// any failure is a 400.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<CreateUserForm>,
) -> Result<Json<User>> {
    let email = form
        .email
        .as_deref()
        .filter(|e| !e.is_empty())
        .map(Email::parse)
        .transpose()
        .map_err(|_| AppError::BadRequest("Invalid email format".to_string()))?;

    let password_hash = crate::services::auth::hash_password_for_account(
        form.password.as_deref().unwrap_or_default(),
    )
    .map_err(AppError::Auth)?;

    let user = UserRepository::new(state.pool())
        .create(&NewUser {
            username: form.username,
            email,
            password_hash,
            avatar: form.avatar,
            role: form.role.unwrap_or_default(),
            address: None,
            phone: None,
            enabled: true,
            email_verified: false,
        })
        .await
        .map_err(|e| AppError::failure("Error when creating user!", e))?;

    Ok(Json(user))
}

/// `PUT /user/edit` - update username and avatar.
#[instrument(skip_all)]
pub async fn edit(
    State(state): State<AppState>,
    Json(form): Json<EditUserForm>,
) -> Result<Json<Value>> {
    match UserRepository::new(state.pool())
        .edit_profile(form.id, &form.username, form.avatar.as_deref())
        .await
    {
        Ok(()) => Ok(Json(json!({ "message": "Edit user successfully!" }))),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!(
            "User with id {} not found!",
            form.id
        ))),
        Err(e) => Err(AppError::failure("Error when editing user!", e)),
    }
}

/// `DELETE /user/delete?userId=`.
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<Value>> {
    let deleted = UserRepository::new(state.pool())
        .delete(UserId::new(query.user_id))
        .await?;

    if deleted {
        Ok(Json(json!({
            "message": format!("Deleted user {}", query.user_id),
        })))
    } else {
        Err(AppError::BadRequest("Failed to delete user!".to_string()))
    }
}

// =============================================================================
// Profile
// =============================================================================

/// `GET /user/profile` - the logged-in user's profile.
#[instrument(skip_all)]
pub async fn profile(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(user))
}

/// `PUT /user/profile` - update the logged-in user's email, phone, address.
///
/// The saved address and phone are the placement preconditions; the SPA
/// redirects here when checkout refuses an incomplete profile.
#[instrument(skip_all)]
pub async fn update_profile(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<User>> {
    let users = UserRepository::new(state.pool());

    let existing = users
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    let email = match form.email.as_deref().filter(|e| !e.is_empty()) {
        Some(raw) => Some(
            Email::parse(raw)
                .map_err(|_| AppError::BadRequest("Invalid email format".to_string()))?,
        ),
        None => existing.email,
    };

    let user = users
        .update(
            current.id,
            &crate::db::users::UserUpdate {
                username: existing.username,
                email,
                avatar: existing.avatar,
                role: existing.role,
                address: form.address.or(existing.address),
                phone: form.phone.or(existing.phone),
                password_hash: None,
            },
        )
        .await?;

    Ok(Json(user))
}
