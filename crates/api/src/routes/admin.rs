//! Admin route handlers.
//!
//! Everything here requires the admin role. Order deletion is deliberately
//! permissive: any status, immediate, no audit trail. The status endpoint
//! flips `ordered`/`confirmed` on demand with no lifecycle validation.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use torque_core::{BikeId, Email, OrderId, OrderStatus, Role, UserId};

use crate::db::RepositoryError;
use crate::db::bikes::BikeRepository;
use crate::db::orders::OrderRepository;
use crate::db::users::{NewUser, UserRepository, UserUpdate};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Bike, Order, User};
use crate::routes::bikes::BikeForm;
use crate::services::auth::hash_password_for_account;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserForm {
    pub username: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<Role>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

fn parse_email(raw: Option<&str>) -> Result<Option<Email>> {
    raw.filter(|e| !e.is_empty())
        .map(Email::parse)
        .transpose()
        .map_err(|_| AppError::BadRequest("Invalid email format".to_string()))
}

// =============================================================================
// Users
// =============================================================================

/// `GET /api/admin/users`.
#[instrument(skip_all)]
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(users))
}

/// `POST /api/admin/users`.
///
/// Unlike self-registration there is no verification mail: the account is
/// enabled immediately. A password is required for new users.
#[instrument(skip_all)]
pub async fn create_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(form): Json<AdminUserForm>,
) -> Result<Json<User>> {
    let password = form.password.as_deref().unwrap_or_default();
    if password.is_empty() {
        return Err(AppError::BadRequest(
            "Password is required for new users".to_string(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .create(&NewUser {
            username: form.username,
            email: parse_email(form.email.as_deref())?,
            password_hash: hash_password_for_account(password)?,
            avatar: form.avatar,
            role: form.role.unwrap_or_default(),
            address: form.address,
            phone: form.phone,
            enabled: true,
            email_verified: true,
        })
        .await?;

    Ok(Json(user))
}

/// `PUT /api/admin/users/{id}`.
///
/// A blank or missing password keeps the stored one; anything else is
/// re-hashed.
#[instrument(skip_all)]
pub async fn update_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<AdminUserForm>,
) -> Result<Json<User>> {
    let password_hash = match form.password.as_deref() {
        Some(password) if !password.is_empty() => Some(hash_password_for_account(password)?),
        _ => None,
    };

    match UserRepository::new(state.pool())
        .update(
            UserId::new(id),
            &UserUpdate {
                username: form.username,
                email: parse_email(form.email.as_deref())?,
                avatar: form.avatar,
                role: form.role.unwrap_or_default(),
                address: form.address,
                phone: form.phone,
                password_hash,
            },
        )
        .await
    {
        Ok(user) => Ok(Json(user)),
        Err(RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("User with id {id} not found!")))
        }
        Err(e) => Err(AppError::failure("Error when editing user!", e)),
    }
}

/// `DELETE /api/admin/users/{id}`.
#[instrument(skip_all)]
pub async fn delete_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let deleted = UserRepository::new(state.pool())
        .delete(UserId::new(id))
        .await?;

    if deleted {
        Ok(Json(json!({ "message": format!("Deleted user {id}") })))
    } else {
        Err(AppError::BadRequest("Failed to delete user!".to_string()))
    }
}

// =============================================================================
// Bikes
// =============================================================================

/// `GET /api/admin/bikes`.
#[instrument(skip_all)]
pub async fn list_bikes(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Bike>>> {
    let bikes = BikeRepository::new(state.pool()).list_all().await?;
    Ok(Json(bikes))
}

/// `POST /api/admin/bikes`.
#[instrument(skip_all)]
pub async fn create_bike(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(form): Json<BikeForm>,
) -> Result<Json<Bike>> {
    let owner = form.user_id;
    match BikeRepository::new(state.pool()).create(&form.into()).await {
        Ok(bike) => Ok(Json(bike)),
        Err(RepositoryError::NotFound) => {
            let id = owner.map_or_else(|| "?".to_string(), |o| o.to_string());
            Err(AppError::NotFound(format!("User with id {id} not found!")))
        }
        Err(e) => Err(AppError::failure("Error when creating a new bike!", e)),
    }
}

/// `PUT /api/admin/bikes/{id}`.
#[instrument(skip_all)]
pub async fn update_bike(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<BikeForm>,
) -> Result<Json<Bike>> {
    match BikeRepository::new(state.pool())
        .update(BikeId::new(id), &form.into())
        .await
    {
        Ok(bike) => Ok(Json(bike)),
        Err(RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("Bike with id {id} not found!")))
        }
        Err(e) => Err(AppError::failure("Error when editing bike!", e)),
    }
}

/// `DELETE /api/admin/bikes/{id}`.
#[instrument(skip_all)]
pub async fn delete_bike(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let deleted = BikeRepository::new(state.pool())
        .delete(BikeId::new(id))
        .await?;

    if deleted {
        Ok(Json(json!({ "message": format!("Deleted bike {id}") })))
    } else {
        Err(AppError::BadRequest("Failed to delete bike!".to_string()))
    }
}

// =============================================================================
// Orders
// =============================================================================

/// `GET /api/admin/orders`.
#[instrument(skip_all)]
pub async fn list_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// `DELETE /api/admin/orders/{id}` - delete an order at any status.
#[instrument(skip_all)]
pub async fn delete_order(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let deleted = OrderRepository::new(state.pool())
        .delete(OrderId::new(id))
        .await?;

    if deleted {
        Ok(Json(json!({ "message": format!("Deleted order {id}") })))
    } else {
        Err(AppError::BadRequest("Failed to delete order!".to_string()))
    }
}

/// `PUT /api/admin/orders/{id}/status` - flip an order's status.
#[instrument(skip_all)]
pub async fn update_order_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<StatusForm>,
) -> Result<Json<Order>> {
    let status: OrderStatus = form
        .status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid order status: {}", form.status)))?;

    match OrderRepository::new(state.pool())
        .update_status(OrderId::new(id), status)
        .await
    {
        Ok(order) => Ok(Json(order)),
        Err(RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("Order with id {id} not found!")))
        }
        Err(e) => Err(AppError::failure("Error when updating order status!", e)),
    }
}
