//! Database operations for the API's `PostgreSQL` store.
//!
//! # Tables
//!
//! - `users` - Accounts, roles, and shipping profiles
//! - `bikes` - The motorcycle catalog
//! - `cart_items` - One row per (user, bike) cart line
//! - `orders` / `order_items` - Placed orders with frozen totals
//! - `email_verification_tokens` / `password_reset_tokens`
//! - `session` - Tower-sessions storage (created by the session store)
//!
//! # Queries
//!
//! All queries use the runtime sqlx API with `FromRow` row structs converted
//! into domain types via `TryFrom`, so the workspace builds without a live
//! database.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p torque-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod bikes;
pub mod carts;
pub mod orders;
pub mod tokens;
pub mod users;

/// Errors returned by the repository layer.
///
/// The three-way outcome the route layer keys off: success, a referenced
/// entity that does not exist ([`RepositoryError::NotFound`]), and an
/// unexpected persistence failure (everything else).
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested or referenced entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into [`Self::Conflict`].
    pub(crate) fn from_sqlx(e: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
