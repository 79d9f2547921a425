//! Bike catalog repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use torque_core::{BikeId, UserId};

use super::RepositoryError;
use super::users::UserRepository;
use crate::models::{Bike, BikeWithOwner, User};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` bike queries.
#[derive(Debug, sqlx::FromRow)]
struct BikeRow {
    id: i32,
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

impl From<BikeRow> for Bike {
    fn from(row: BikeRow) -> Self {
        Self {
            id: BikeId::new(row.id),
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
        }
    }
}

const BIKE_COLUMNS: &str = "id, name, cc, price, photo, year, brand, category, description, \
                            user_id, created_at, updated_at";

// =============================================================================
// Input Types
// =============================================================================

/// Fields for creating or fully updating a bike.
#[derive(Debug, Clone)]
pub struct BikeInput {
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

// =============================================================================
// Repository
// =============================================================================

/// Repository for bike catalog operations.
pub struct BikeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BikeRepository<'a> {
    /// Create a new bike repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Bike>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, BikeRow>(&format!("SELECT {BIKE_COLUMNS} FROM bikes ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List the catalog with each bike's listing user attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a user row is invalid.
    pub async fn list_with_owners(&self) -> Result<Vec<BikeWithOwner>, RepositoryError> {
        let bikes = self.list_all().await?;
        let owners = self.owners_by_id(&bikes).await?;

        Ok(bikes
            .into_iter()
            .map(|bike| {
                let user = bike.user_id.and_then(|id| owners.get(&id).cloned());
                BikeWithOwner { bike, user }
            })
            .collect())
    }

    /// Get a bike by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BikeId) -> Result<Option<Bike>, RepositoryError> {
        let row = sqlx::query_as::<_, BikeRow>(&format!(
            "SELECT {BIKE_COLUMNS} FROM bikes WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a bike with its listing user attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the user row is invalid.
    pub async fn get_with_owner(&self, id: BikeId) -> Result<Option<BikeWithOwner>, RepositoryError> {
        let Some(bike) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let user = match bike.user_id {
            Some(owner_id) => UserRepository::new(self.pool).get_by_id(owner_id).await?,
            None => None,
        };

        Ok(Some(BikeWithOwner { bike, user }))
    }

    /// Create a bike.
    ///
    /// When a listing user is given, it must exist; the check and the insert
    /// run in one transaction so a failure leaves no partial row behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the listing user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &BikeInput) -> Result<Bike, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if let Some(owner) = input.user_id {
            let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM users WHERE id = $1")
                .bind(owner.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(RepositoryError::NotFound);
            }
        }

        let row = sqlx::query_as::<_, BikeRow>(&format!(
            "INSERT INTO bikes (name, cc, price, photo, year, brand, category, description, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {BIKE_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.cc)
        .bind(input.price)
        .bind(&input.photo)
        .bind(input.year)
        .bind(&input.brand)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.user_id.map(|id| id.as_i32()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Update a bike.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no bike has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: BikeId, input: &BikeInput) -> Result<Bike, RepositoryError> {
        let row = sqlx::query_as::<_, BikeRow>(&format!(
            "UPDATE bikes SET \
               name = $1, cc = $2, price = $3, photo = $4, year = $5, \
               brand = $6, category = $7, description = $8, user_id = $9, updated_at = now() \
             WHERE id = $10 \
             RETURNING {BIKE_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.cc)
        .bind(input.price)
        .bind(&input.photo)
        .bind(input.year)
        .bind(&input.brand)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.user_id.map(|i| i.as_i32()))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), |r| Ok(r.into()))
    }

    /// Delete a bike.
    ///
    /// # Returns
    ///
    /// Returns `true` if the bike was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: BikeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM bikes WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch the listing users for a batch of bikes in one query.
    async fn owners_by_id(
        &self,
        bikes: &[Bike],
    ) -> Result<HashMap<UserId, User>, RepositoryError> {
        let mut ids: Vec<i32> = bikes
            .iter()
            .filter_map(|b| b.user_id.map(|id| id.as_i32()))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = UserRepository::new(self.pool).get_by_ids(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}
