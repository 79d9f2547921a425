//! Authentication service.
//!
//! Registration with email verification, password login, Google sign-in,
//! and password reset.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use uuid::Uuid;

use torque_core::{Email, EmailError, Role};

use crate::db::RepositoryError;
use crate::db::tokens::TokenRepository;
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;
use crate::services::mailer::{MailError, Mailer};

/// How long a verification link stays valid.
const VERIFICATION_TOKEN_HOURS: i64 = 24;

/// How long a password reset link stays valid.
const RESET_TOKEN_HOURS: i64 = 1;

/// Minimum length of a password set through the reset flow.
const MIN_RESET_PASSWORD_LENGTH: usize = 6;

/// Errors that can occur during authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has not been enabled yet.
    #[error("account not enabled")]
    AccountDisabled,

    /// The username is already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// The email is already registered.
    #[error("email already exists")]
    EmailTaken,

    /// Registration requires an email address.
    #[error("email is required")]
    EmailRequired,

    /// The email address is not valid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The password does not meet the policy.
    #[error("{0}")]
    WeakPassword(String),

    /// A one-time token is unknown or expired. The message is client-facing.
    #[error("{0}")]
    InvalidToken(String),

    /// Google sign-in is not configured.
    #[error("google sign-in disabled")]
    GoogleDisabled,

    /// The Google ID token failed verification.
    #[error("google token rejected: {0}")]
    GoogleToken(String),

    /// The verification mail could not be delivered; the registration was
    /// rolled back.
    #[error("mail delivery failed: {0}")]
    MailDelivery(#[from] MailError),

    /// Password hashing failed.
    #[error("hash error: {0}")]
    Hash(String),

    /// A database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// The message sent to the client for this error.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Invalid username or password".to_string(),
            Self::AccountDisabled => "Please verify your email before logging in".to_string(),
            Self::UsernameTaken => "Username already exists".to_string(),
            Self::EmailTaken => "Email already exists".to_string(),
            Self::EmailRequired => "Email is required".to_string(),
            Self::InvalidEmail(_) => "Invalid email format".to_string(),
            Self::WeakPassword(msg) | Self::InvalidToken(msg) => msg.clone(),
            Self::GoogleDisabled => "Google login is not configured".to_string(),
            Self::GoogleToken(_) => "Invalid Google token".to_string(),
            Self::MailDelivery(_) => {
                "Failed to send verification email. Please try again.".to_string()
            }
            Self::Hash(_) | Self::Repository(_) => "Request failed".to_string(),
        }
    }
}

/// Claims of interest from Google's `tokeninfo` endpoint.
#[derive(Debug, serde::Deserialize)]
struct GoogleTokenInfo {
    aud: String,
    email: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: TokenRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: TokenRepository::new(pool),
        }
    }

    // =========================================================================
    // Registration & Verification
    // =========================================================================

    /// Register a new user and send the verification mail.
    ///
    /// The account starts disabled; [`Self::verify_email`] enables it. When
    /// the mail cannot be delivered the user and token are deleted again so
    /// the registration can be retried.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` on validation failure, duplicate username/email,
    /// or mail delivery failure.
    pub async fn register(
        &self,
        mailer: &Mailer,
        frontend_url: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        if self.users.get_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        if email.trim().is_empty() {
            return Err(AuthError::EmailRequired);
        }
        let email = Email::parse(email)?;
        if self.users.get_by_email(email.as_str()).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&NewUser {
                username: username.to_owned(),
                email: Some(email.clone()),
                password_hash,
                avatar: None,
                role: Role::User,
                address: None,
                phone: None,
                enabled: false,
                email_verified: false,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })?;

        let expires_at = Utc::now() + Duration::hours(VERIFICATION_TOKEN_HOURS);
        let token = self.tokens.create_verification(user.id, expires_at).await?;

        let link = format!("{frontend_url}/verify-email?token={token}");
        if let Err(mail_err) = mailer.send_verification(&email, &link).await {
            // Roll the registration back so the user can try again.
            self.tokens.delete_verification(token).await?;
            self.users.delete(user.id).await?;
            return Err(AuthError::MailDelivery(mail_err));
        }

        Ok(())
    }

    /// Verify an email address, enabling the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for unknown or expired tokens.
    pub async fn verify_email(&self, token: Uuid) -> Result<(), AuthError> {
        let stored = self
            .tokens
            .get_verification(token)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("Invalid verification token".to_string()))?;

        if stored.is_expired(Utc::now()) {
            self.tokens.delete_verification(token).await?;
            return Err(AuthError::InvalidToken(
                "Verification token has expired".to_string(),
            ));
        }

        self.users.mark_verified(stored.user()).await?;
        self.tokens.delete_verification(token).await?;

        Ok(())
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is
    /// wrong, `AuthError::AccountDisabled` if the email is not verified yet.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.enabled {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }

    /// Login with a Google ID token, creating the account on first sign-in.
    ///
    /// The token's `aud` claim must match the configured OAuth client ID.
    /// Accounts created this way use the email as the username, get a random
    /// password, and are enabled immediately (Google verified the address).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::GoogleDisabled` when no client ID is configured,
    /// `AuthError::GoogleToken` when verification fails.
    pub async fn login_with_google(
        &self,
        http: &reqwest::Client,
        client_id: Option<&str>,
        credential: &str,
    ) -> Result<User, AuthError> {
        let client_id = client_id.ok_or(AuthError::GoogleDisabled)?;
        let info = verify_google_token(http, credential).await?;

        if info.aud != client_id {
            return Err(AuthError::GoogleToken("audience mismatch".to_string()));
        }
        let email = info
            .email
            .ok_or_else(|| AuthError::GoogleToken("token carries no email".to_string()))?;
        let email = Email::parse(&email)?;

        if let Some(user) = self.users.get_by_username(email.as_str()).await? {
            return Ok(user);
        }

        let password_hash = hash_password(&random_password())?;
        let user = self
            .users
            .create(&NewUser {
                username: email.as_str().to_owned(),
                email: Some(email),
                password_hash,
                avatar: None,
                role: Role::User,
                address: None,
                phone: None,
                enabled: true,
                email_verified: true,
            })
            .await?;

        Ok(user)
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Start a password reset for the account with this email, if one exists.
    ///
    /// Deliberately succeeds without doing anything for unknown emails so the
    /// endpoint cannot be used to enumerate accounts.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MailDelivery` if the reset mail cannot be sent.
    pub async fn request_password_reset(
        &self,
        mailer: &Mailer,
        frontend_url: &str,
        email: &str,
    ) -> Result<(), AuthError> {
        let Some(user) = self.users.get_by_email(email).await? else {
            return Ok(());
        };
        let Some(user_email) = user.email.clone() else {
            return Ok(());
        };

        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_HOURS);
        let token = self
            .tokens
            .create_password_reset(user.id, expires_at)
            .await?;

        let link = format!("{frontend_url}/reset?token={token}");
        mailer.send_password_reset(&user_email, &link).await?;

        Ok(())
    }

    /// Complete a password reset.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for unknown or expired tokens and
    /// `AuthError::WeakPassword` for too-short passwords.
    pub async fn confirm_password_reset(
        &self,
        token: Uuid,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < MIN_RESET_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(
                "Invalid token or password".to_string(),
            ));
        }

        let stored = self
            .tokens
            .get_password_reset(token)
            .await?
            .filter(|t| !t.is_expired(Utc::now()))
            .ok_or_else(|| AuthError::InvalidToken("Invalid or expired token".to_string()))?;

        let password_hash = hash_password(new_password)?;
        self.users
            .set_password_hash(stored.user(), &password_hash)
            .await?;
        self.tokens.delete_password_reset(token).await?;

        Ok(())
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

/// Validate the registration password policy: 8-12 characters with at least
/// one lowercase letter, one uppercase letter, and one digit.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` with the client-facing message.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let length_ok = (8..=12).contains(&password.len());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if length_ok && has_lower && has_upper && has_digit {
        Ok(())
    } else {
        Err(AuthError::WeakPassword(
            "Password must be 8-12 characters and include lower, upper case, digit, and symbol."
                .to_string(),
        ))
    }
}

/// Hash a password for account storage.
///
/// An empty password (legacy creates, Google sign-ins) gets a random one so
/// the column is never a guessable constant.
///
/// # Errors
///
/// Returns `AuthError::Hash` if hashing fails.
pub fn hash_password_for_account(password: &str) -> Result<String, AuthError> {
    if password.is_empty() {
        hash_password(&random_password())
    } else {
        hash_password(password)
    }
}

/// Hash a password with Argon2id and a fresh salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Random placeholder password for accounts created through Google sign-in.
fn random_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Verify a Google ID token against Google's `tokeninfo` endpoint.
async fn verify_google_token(
    http: &reqwest::Client,
    credential: &str,
) -> Result<GoogleTokenInfo, AuthError> {
    let response = http
        .get("https://oauth2.googleapis.com/tokeninfo")
        .query(&[("id_token", credential)])
        .send()
        .await
        .map_err(|e| AuthError::GoogleToken(e.to_string()))?;

    if !response.status().is_success() {
        return Err(AuthError::GoogleToken(format!(
            "tokeninfo returned {}",
            response.status()
        )));
    }

    response
        .json::<GoogleTokenInfo>()
        .await
        .map_err(|e| AuthError::GoogleToken(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy_accepts_valid() {
        assert!(validate_password("Abcdef12").is_ok());
        assert!(validate_password("Sup3rRide").is_ok());
        assert!(validate_password("Aa1aaaaaaaaa").is_ok()); // 12 chars
    }

    #[test]
    fn test_password_policy_length_bounds() {
        assert!(validate_password("Abc1abc").is_err()); // 7 chars
        assert!(validate_password("Abc1abc1abc1a").is_err()); // 13 chars
    }

    #[test]
    fn test_password_policy_requires_character_classes() {
        assert!(validate_password("abcdefg1").is_err()); // no upper
        assert!(validate_password("ABCDEFG1").is_err()); // no lower
        assert!(validate_password("Abcdefgh").is_err()); // no digit
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Abcdef12").unwrap();
        assert!(verify_password("Abcdef12", &hash).is_ok());
        assert!(matches!(
            verify_password("Wrong999", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_random_password_is_long_enough() {
        let password = random_password();
        assert_eq!(password.len(), 32);
        assert_ne!(password, random_password());
    }

    #[test]
    fn test_public_messages() {
        assert_eq!(
            AuthError::InvalidCredentials.public_message(),
            "Invalid username or password"
        );
        assert_eq!(
            AuthError::UsernameTaken.public_message(),
            "Username already exists"
        );
    }
}
