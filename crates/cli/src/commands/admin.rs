//! Admin user management commands.

use tracing::info;

use torque_api::db;
use torque_api::db::users::{NewUser, UserRepository};
use torque_api::services::auth::hash_password_for_account;
use torque_core::{Email, Role};

/// Create an admin user.
///
/// The account is enabled immediately; no verification mail is involved.
///
/// # Errors
///
/// Returns an error if the email is invalid, the database is unreachable, or
/// the username/email is already taken.
pub async fn create_user(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let email = Email::parse(email)?;
    let password_hash = hash_password_for_account(password).map_err(|e| e.to_string())?;

    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let user = UserRepository::new(&pool)
        .create(&NewUser {
            username: username.to_owned(),
            email: Some(email),
            password_hash,
            avatar: None,
            role: Role::Admin,
            address: None,
            phone: None,
            enabled: true,
            email_verified: true,
        })
        .await?;

    info!("Created admin user {} (id {})", user.username, user.id);
    Ok(())
}
