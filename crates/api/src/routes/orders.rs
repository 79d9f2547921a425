//! Order route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use torque_core::ShippingMethod;

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Order;
use crate::services::checkout::{CheckoutService, PlaceOrderError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderForm {
    pub payment_method: Option<String>,
    pub shipping_method: Option<String>,
}

/// `POST /api/orders/place`.
///
/// Preconditions: a saved address, a saved phone, a non-empty cart. Refusal
/// leaves the cart untouched; the SPA redirects to the profile page to
/// complete it. On success the cart is cleared and the order's total is
/// frozen.
#[instrument(skip_all)]
pub async fn place(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Json(form): Json<PlaceOrderForm>,
) -> Result<Json<Order>> {
    let shipping_method = form
        .shipping_method
        .as_deref()
        .map(str::parse::<ShippingMethod>)
        .transpose()
        .map_err(|_| AppError::BadRequest("Invalid shipping method".to_string()))?;

    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    let order = CheckoutService::new(state.pool())
        .place(&user, form.payment_method, shipping_method)
        .await
        .map_err(|e| match e {
            PlaceOrderError::AddressRequired
            | PlaceOrderError::PhoneRequired
            | PlaceOrderError::EmptyCart => AppError::BadRequest(e.to_string()),
            PlaceOrderError::Repository(source) => {
                AppError::failure("Failed to place order", source)
            }
        })?;

    Ok(Json(order))
}

/// `GET /api/orders` - the logged-in user's order history.
#[instrument(skip_all)]
pub async fn history(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = CheckoutService::new(state.pool())
        .history(current.id)
        .await
        .map_err(|e| match e {
            PlaceOrderError::Repository(source) => {
                AppError::failure("Failed to load orders", source)
            }
            other => AppError::BadRequest(other.to_string()),
        })?;

    Ok(Json(orders))
}
