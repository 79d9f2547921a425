//! Cart route handlers.
//!
//! Every mutation answers with the full cart; the SPA replaces its local
//! state with the response rather than computing optimistically. There is no
//! absolute "set quantity" endpoint: a client that wants quantity N issues
//! single add or remove calls one unit at a time, re-reading the returned
//! cart between calls.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use torque_core::BikeId;

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Cart;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartForm {
    pub bike_id: BikeId,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartForm {
    pub bike_id: BikeId,
}

/// `GET /api/cart` - the authoritative cart.
#[instrument(skip_all)]
pub async fn show(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool()).get(current.id).await?;
    Ok(Json(cart))
}

/// `POST /api/cart/add` - create a line with the requested quantity or
/// increment an existing line by that amount. Never decrements.
#[instrument(skip_all)]
pub async fn add(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Json(form): Json<AddToCartForm>,
) -> Result<Json<Cart>> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }

    match CartRepository::new(state.pool())
        .add(current.id, form.bike_id, quantity)
        .await
    {
        Ok(cart) => Ok(Json(cart)),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!(
            "Bike with id {} not found!",
            form.bike_id
        ))),
        Err(e) => Err(AppError::failure("Failed to update cart", e)),
    }
}

/// `POST /api/cart/remove` - remove exactly one unit of a bike, deleting the
/// line when its quantity reaches zero.
#[instrument(skip_all)]
pub async fn remove(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Json(form): Json<RemoveFromCartForm>,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool())
        .remove_one(current.id, form.bike_id)
        .await?;

    Ok(Json(cart))
}
