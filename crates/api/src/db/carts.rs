//! Cart repository.
//!
//! One row per (user, bike) line. The mutation semantics come from
//! [`torque_core::cart`]: adds create or increment, removes take exactly one
//! unit and delete the line at zero. Every mutation returns the full cart so
//! clients can replace their local state with the authoritative copy.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use torque_core::cart::{self, RemoveOutcome};
use torque_core::{BikeId, CartItemId, UserId};

use super::RepositoryError;
use crate::models::{Bike, Cart, CartItem};

/// Joined row of a cart line and its bike.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    item_id: i32,
    quantity: i32,
    added_at: DateTime<Utc>,
    bike_id: i32,
    name: String,
    cc: Decimal,
    price: Decimal,
    photo: Option<String>,
    year: i32,
    brand: Option<String>,
    category: Option<String>,
    description: Option<String>,
    user_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative cart quantity for item {}",
                row.item_id
            ))
        })?;

        Ok(Self {
            id: CartItemId::new(row.item_id),
            bike: Bike {
                id: BikeId::new(row.bike_id),
                name: row.name,
                cc: row.cc,
                price: row.price,
                photo: row.photo,
                year: row.year,
                brand: row.brand,
                category: row.category,
                description: row.description,
                user_id: row.user_id.map(UserId::new),
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            quantity,
            added_at: row.added_at,
        })
    }
}

const CART_LINE_QUERY: &str = "SELECT ci.id AS item_id, ci.quantity, ci.added_at, \
            b.id AS bike_id, b.name, b.cc, b.price, b.photo, b.year, \
            b.brand, b.category, b.description, b.user_id, b.created_at, b.updated_at \
     FROM cart_items ci \
     JOIN bikes b ON b.id = ci.bike_id \
     WHERE ci.user_id = $1 \
     ORDER BY ci.added_at, ci.id";

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart. A user with no lines gets an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn get(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(CART_LINE_QUERY)
            .bind(user_id.as_i32())
            .fetch_all(self.pool)
            .await?;

        let cart_items = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<CartItem>, _>>()?;

        Ok(Cart {
            user_id,
            cart_items,
        })
    }

    /// Add a bike to the cart: create the line with the requested quantity or
    /// increment an existing line by that amount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the bike does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user_id: UserId,
        bike_id: BikeId,
        quantity: u32,
    ) -> Result<Cart, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let bike_exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM bikes WHERE id = $1")
            .bind(bike_id.as_i32())
            .fetch_optional(&mut *tx)
            .await?;
        if bike_exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let existing = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM cart_items WHERE user_id = $1 AND bike_id = $2 FOR UPDATE",
        )
        .bind(user_id.as_i32())
        .bind(bike_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        let next = cart::quantity_after_add(existing.and_then(|q| u32::try_from(q).ok()), quantity);
        let next = i32::try_from(next).unwrap_or(i32::MAX);

        if existing.is_some() {
            sqlx::query("UPDATE cart_items SET quantity = $1 WHERE user_id = $2 AND bike_id = $3")
                .bind(next)
                .bind(user_id.as_i32())
                .bind(bike_id.as_i32())
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query("INSERT INTO cart_items (user_id, bike_id, quantity) VALUES ($1, $2, $3)")
                .bind(user_id.as_i32())
                .bind(bike_id.as_i32())
                .bind(next)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get(user_id).await
    }

    /// Remove exactly one unit of a bike from the cart, deleting the line
    /// when the quantity reaches zero. Removing a bike that is not in the
    /// cart leaves the cart unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn remove_one(
        &self,
        user_id: UserId,
        bike_id: BikeId,
    ) -> Result<Cart, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM cart_items WHERE user_id = $1 AND bike_id = $2 FOR UPDATE",
        )
        .bind(user_id.as_i32())
        .bind(bike_id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;

        match cart::remove_one(existing.and_then(|q| u32::try_from(q).ok())) {
            RemoveOutcome::Decremented(q) => {
                sqlx::query(
                    "UPDATE cart_items SET quantity = $1 WHERE user_id = $2 AND bike_id = $3",
                )
                .bind(i32::try_from(q).unwrap_or(i32::MAX))
                .bind(user_id.as_i32())
                .bind(bike_id.as_i32())
                .execute(&mut *tx)
                .await?;
            }
            RemoveOutcome::LineDeleted => {
                sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND bike_id = $2")
                    .bind(user_id.as_i32())
                    .bind(bike_id.as_i32())
                    .execute(&mut *tx)
                    .await?;
            }
            RemoveOutcome::NotInCart => {}
        }

        tx.commit().await?;

        self.get(user_id).await
    }

    /// Delete every line of a user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
