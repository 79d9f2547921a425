//! Session-held identity.

use serde::{Deserialize, Serialize};

use torque_core::{Role, UserId};

/// Keys used for values stored in the session.
pub mod session_keys {
    /// The logged-in user ([`super::CurrentUser`]).
    pub const CURRENT_USER: &str = "current_user";
}

/// The logged-in user, as stored in the session cookie's server-side state.
///
/// Deliberately small: everything else is re-read from the database so role
/// or profile changes take effect without re-login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    /// Whether this session may use the admin surface.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
