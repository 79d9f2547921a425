//! Email verification and password reset token repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use torque_core::UserId;

use super::RepositoryError;

/// A stored one-time token.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredToken {
    pub token: Uuid,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    /// Whether the token has passed its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// The owning user.
    #[must_use]
    pub const fn user(&self) -> UserId {
        UserId::new(self.user_id)
    }
}

/// Repository for one-time token operations.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an email verification token for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_verification(
        &self,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid, RepositoryError> {
        let token = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO email_verification_tokens (token, user_id, expires_at) \
             VALUES ($1, $2, $3)",
        )
        .bind(token)
        .bind(user_id.as_i32())
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(token)
    }

    /// Look up an email verification token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_verification(
        &self,
        token: Uuid,
    ) -> Result<Option<StoredToken>, RepositoryError> {
        let row = sqlx::query_as::<_, StoredToken>(
            "SELECT token, user_id, expires_at FROM email_verification_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Delete an email verification token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_verification(&self, token: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM email_verification_tokens WHERE token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Create a password reset token for a user, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn create_password_reset(
        &self,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid, RepositoryError> {
        let token = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO password_reset_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(token)
        .bind(user_id.as_i32())
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(token)
    }

    /// Look up a password reset token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_reset(
        &self,
        token: Uuid,
    ) -> Result<Option<StoredToken>, RepositoryError> {
        let row = sqlx::query_as::<_, StoredToken>(
            "SELECT token, user_id, expires_at FROM password_reset_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Delete a password reset token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_password_reset(&self, token: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let token = StoredToken {
            token: Uuid::new_v4(),
            user_id: 1,
            expires_at: now + Duration::hours(1),
        };
        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::hours(2)));
    }
}
