//! Bike catalog route handlers.
//!
//! Carries both the legacy `/bike/*` surface with its exact outcome mapping
//! (200 / 404-with-id / 400-generic) and the plain `/api/bikes` listing the
//! SPA browses.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use torque_core::{BikeId, UserId};

use crate::db::RepositoryError;
use crate::db::bikes::{BikeInput, BikeRepository};
use crate::error::{AppError, Result};
use crate::models::{Bike, BikeWithOwner};
use crate::state::AppState;

/// Fields of a bike create/edit request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BikeForm {
    pub name: String,
    pub cc: Decimal,
    pub price: Decimal,
    pub photo: Option<String>,
    pub year: i32,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<UserId>,
}

impl From<BikeForm> for BikeInput {
    fn from(form: BikeForm) -> Self {
        Self {
            name: form.name,
            cc: form.cc,
            price: form.price,
            photo: form.photo,
            year: form.year,
            brand: form.brand,
            category: form.category,
            description: form.description,
            user_id: form.user_id,
        }
    }
}

/// Edit request: a bike ID plus the full set of fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBikeForm {
    pub id: BikeId,
    #[serde(flatten)]
    pub fields: BikeForm,
}

#[derive(Debug, Deserialize)]
pub struct GetByIdQuery {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteQuery {
    pub bike_id: i32,
}

// =============================================================================
// Legacy surface
// =============================================================================

/// `GET /bike/getAll` - every bike joined with its lister.
#[instrument(skip_all)]
pub async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<BikeWithOwner>>> {
    let bikes = BikeRepository::new(state.pool()).list_with_owners().await?;
    Ok(Json(bikes))
}

/// `GET /bike/getById?id=` - one bike joined with its lister.
#[instrument(skip_all)]
pub async fn get_by_id(
    State(state): State<AppState>,
    Query(query): Query<GetByIdQuery>,
) -> Result<Json<BikeWithOwner>> {
    let bike = BikeRepository::new(state.pool())
        .get_with_owner(BikeId::new(query.id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Bike with id {} not found!", query.id)))?;

    Ok(Json(bike))
}

/// `POST /bike/create`.
///
/// Outcome mapping: 200 on success, 404 naming the lister when the given
/// `userId` does not exist, 400 with a generic message on any other failure.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<BikeForm>,
) -> Result<Json<Value>> {
    let owner = form.user_id;
    match BikeRepository::new(state.pool()).create(&form.into()).await {
        Ok(bike) => Ok(Json(json!({
            "message": "Create a new bike successfully!",
            "bike": bike,
        }))),
        Err(RepositoryError::NotFound) => {
            let id = owner.map_or_else(|| "?".to_string(), |o| o.to_string());
            Err(AppError::NotFound(format!("User with id {id} not found!")))
        }
        Err(e) => Err(AppError::failure("Error when creating a new bike!", e)),
    }
}

/// `PUT /bike/edit`.
#[instrument(skip_all)]
pub async fn edit(
    State(state): State<AppState>,
    Json(form): Json<EditBikeForm>,
) -> Result<Json<Value>> {
    let id = form.id;
    match BikeRepository::new(state.pool())
        .update(id, &form.fields.into())
        .await
    {
        Ok(bike) => Ok(Json(json!({
            "message": "Edit bike successfully!",
            "bike": bike,
        }))),
        Err(RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("Bike with id {id} not found!")))
        }
        Err(e) => Err(AppError::failure("Error when editing bike!", e)),
    }
}

/// `DELETE /bike/delete?bikeId=`.
///
/// Deletes keep the legacy two-way outcome: 200 when a row went away, 400
/// otherwise.
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Value>> {
    let deleted = BikeRepository::new(state.pool())
        .delete(BikeId::new(query.bike_id))
        .await?;

    if deleted {
        Ok(Json(json!({
            "message": format!("Deleted bike {}", query.bike_id),
        })))
    } else {
        Err(AppError::BadRequest("Failed to delete bike!".to_string()))
    }
}

// =============================================================================
// SPA surface
// =============================================================================

/// `GET /api/bikes` - the plain catalog list.
#[instrument(skip_all)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Bike>>> {
    let bikes = BikeRepository::new(state.pool()).list_all().await?;
    Ok(Json(bikes))
}

/// `GET /api/bikes/{id}` - one bike.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Bike>> {
    let bike = BikeRepository::new(state.pool())
        .get_by_id(BikeId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Bike with id {id} not found!")))?;

    Ok(Json(bike))
}
