//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use torque_core::{Email, Role, UserId};

/// A storefront user (domain type).
///
/// The password hash never travels with this type; repositories expose it
/// through a dedicated lookup for the login path only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name. Google sign-in accounts use the email address here.
    pub username: String,
    /// Email address, if one is on file.
    pub email: Option<Email>,
    /// Path to the user's avatar image.
    pub avatar: Option<String>,
    /// Role deciding access to the admin surface.
    pub role: Role,
    /// Saved shipping address. Required before an order can be placed.
    pub address: Option<String>,
    /// Saved phone number. Required before an order can be placed.
    pub phone: Option<String>,
    /// Whether the account may log in.
    pub enabled: bool,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the profile is complete enough to place an order.
    #[must_use]
    pub fn has_shipping_profile(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.address) && filled(&self.phone)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(address: Option<&str>, phone: Option<&str>) -> User {
        User {
            id: UserId::new(1),
            username: "rider".to_owned(),
            email: None,
            avatar: None,
            role: Role::User,
            address: address.map(str::to_owned),
            phone: phone.map(str::to_owned),
            enabled: true,
            email_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_shipping_profile_requires_address_and_phone() {
        assert!(user(Some("1 Main St"), Some("555-0100")).has_shipping_profile());
        assert!(!user(None, Some("555-0100")).has_shipping_profile());
        assert!(!user(Some("1 Main St"), None).has_shipping_profile());
        assert!(!user(None, None).has_shipping_profile());
    }

    #[test]
    fn test_blank_address_does_not_count() {
        assert!(!user(Some("   "), Some("555-0100")).has_shipping_profile());
        assert!(!user(Some(""), Some("555-0100")).has_shipping_profile());
    }
}
