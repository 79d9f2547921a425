//! Order placement.
//!
//! Checks the placement preconditions, re-derives the total server-side, and
//! hands the order to the repository, which persists it and clears the cart
//! in one transaction. The persisted total is the authoritative charge;
//! whatever the client displayed is advisory only.

use chrono::{Days, Utc};

use torque_core::cart;
use torque_core::{ShippingMethod, UserId};

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::db::orders::{NewOrder, OrderRepository};
use crate::models::{Order, User};

/// Days between placing an order and its expected ship date.
const SHIPPING_LEAD_DAYS: u64 = 3;

/// Payment method recorded when the client does not pick one.
const DEFAULT_PAYMENT_METHOD: &str = "Bank Transfer";

/// Reasons an order cannot be placed. Refusal leaves the cart untouched.
#[derive(Debug, thiserror::Error)]
pub enum PlaceOrderError {
    /// No saved address on the user's profile.
    #[error("Address is required to place an order")]
    AddressRequired,

    /// No saved phone number on the user's profile.
    #[error("Phone is required to place an order")]
    PhoneRequired,

    /// The cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// A database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Check that a user's profile is complete enough to place an order.
///
/// # Errors
///
/// Returns the first missing field: address before phone.
pub fn validate_shipping_profile(
    address: Option<&str>,
    phone: Option<&str>,
) -> Result<(), PlaceOrderError> {
    if address.is_none_or(|a| a.trim().is_empty()) {
        return Err(PlaceOrderError::AddressRequired);
    }
    if phone.is_none_or(|p| p.trim().is_empty()) {
        return Err(PlaceOrderError::PhoneRequired);
    }
    Ok(())
}

/// Order placement service.
pub struct CheckoutService<'a> {
    carts: CartRepository<'a>,
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a sqlx::PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order for the user's current cart.
    ///
    /// Preconditions: a saved address, a saved phone number, and a non-empty
    /// cart. On success the cart is cleared and the returned order carries
    /// the frozen total (subtotal plus the flat shipping fee).
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError` if a precondition fails (cart unchanged) or
    /// a database operation fails (transaction rolled back, cart unchanged).
    pub async fn place(
        &self,
        user: &User,
        payment_method: Option<String>,
        shipping_method: Option<ShippingMethod>,
    ) -> Result<Order, PlaceOrderError> {
        validate_shipping_profile(user.address.as_deref(), user.phone.as_deref())?;

        let cart = self.carts.get(user.id).await?;
        if cart.cart_items.is_empty() {
            return Err(PlaceOrderError::EmptyCart);
        }

        let shipping_method = shipping_method.unwrap_or_default();
        let total = cart::order_total(&cart.priced_lines(), shipping_method);

        let order_date = Utc::now().date_naive();
        let ship_date = order_date
            .checked_add_days(Days::new(SHIPPING_LEAD_DAYS))
            .unwrap_or(order_date);

        let new = NewOrder {
            user_id: user.id,
            order_date,
            ship_date,
            payment_method: payment_method
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string()),
            shipping_method,
            total,
            address: user.address.clone().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
        };

        Ok(self.orders.place(&new, &cart).await?)
    }

    /// List the orders placed by a user.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::Repository` if the query fails.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<Order>, PlaceOrderError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_with_address_and_phone_passes() {
        assert!(validate_shipping_profile(Some("1 Main St"), Some("555-0100")).is_ok());
    }

    #[test]
    fn test_missing_address_is_refused() {
        assert!(matches!(
            validate_shipping_profile(None, Some("555-0100")),
            Err(PlaceOrderError::AddressRequired)
        ));
        assert!(matches!(
            validate_shipping_profile(Some("  "), Some("555-0100")),
            Err(PlaceOrderError::AddressRequired)
        ));
    }

    #[test]
    fn test_missing_phone_is_refused() {
        assert!(matches!(
            validate_shipping_profile(Some("1 Main St"), None),
            Err(PlaceOrderError::PhoneRequired)
        ));
        assert!(matches!(
            validate_shipping_profile(Some("1 Main St"), Some("")),
            Err(PlaceOrderError::PhoneRequired)
        ));
    }

    #[test]
    fn test_address_is_checked_before_phone() {
        assert!(matches!(
            validate_shipping_profile(None, None),
            Err(PlaceOrderError::AddressRequired)
        ));
    }
}
