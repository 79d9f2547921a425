//! Status and method enums for orders and users.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders are created as [`OrderStatus::Ordered`] with their total frozen.
/// Admins may flip the status to [`OrderStatus::Confirmed`] (and back); no
/// further lifecycle validation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Ordered,
    Confirmed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ordered => write!(f, "ordered"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordered" => Ok(Self::Ordered),
            "confirmed" => Ok(Self::Confirmed),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// User role.
///
/// Admins get the `/api/admin` surface; everyone else is a regular user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Whether this role grants access to the admin surface.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Shipping method selected at checkout.
///
/// Each method carries a flat fee, independent of cart size or weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
    Pickup,
}

impl ShippingMethod {
    /// Flat shipping fee for this method.
    #[must_use]
    pub fn fee(self) -> Decimal {
        match self {
            Self::Standard => Decimal::from(20_u32),
            Self::Express => Decimal::from(50_u32),
            Self::Pickup => Decimal::ZERO,
        }
    }
}

impl std::fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "Standard"),
            Self::Express => write!(f, "Express"),
            Self::Pickup => write!(f, "Pickup"),
        }
    }
}

impl std::str::FromStr for ShippingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(Self::Standard),
            "Express" => Ok(Self::Express),
            "Pickup" => Ok(Self::Pickup),
            _ => Err(format!("invalid shipping method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_fee_table() {
        assert_eq!(ShippingMethod::Standard.fee(), Decimal::from(20_u32));
        assert_eq!(ShippingMethod::Express.fee(), Decimal::from(50_u32));
        assert_eq!(ShippingMethod::Pickup.fee(), Decimal::ZERO);
    }

    #[test]
    fn test_shipping_method_roundtrip() {
        for method in [
            ShippingMethod::Standard,
            ShippingMethod::Express,
            ShippingMethod::Pickup,
        ] {
            let parsed: ShippingMethod = method.to_string().parse().unwrap();
            assert_eq!(parsed, method);
        }
    }

    #[test]
    fn test_shipping_method_serde_matches_client_values() {
        assert_eq!(
            serde_json::to_string(&ShippingMethod::Express).unwrap(),
            "\"Express\""
        );
        let parsed: ShippingMethod = serde_json::from_str("\"Pickup\"").unwrap();
        assert_eq!(parsed, ShippingMethod::Pickup);
    }

    #[test]
    fn test_order_status_roundtrip() {
        for status in [OrderStatus::Ordered, OrderStatus::Confirmed] {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert!("admin".parse::<Role>().is_err());
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }
}
