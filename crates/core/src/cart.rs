//! Cart line mutation semantics and order total computation.
//!
//! The server is the source of truth for cart contents; every mutation
//! returns the full cart and clients replace their local state with it.
//! Two properties of the protocol live here as pure functions so the
//! repository layer and the checkout path share one definition:
//!
//! - Adding a bike creates a line with the requested quantity or increments
//!   an existing line by that amount. Adds never decrement.
//! - Removing a bike decrements its line by exactly one unit and deletes the
//!   line when the quantity reaches zero. There is no absolute
//!   "set quantity" operation; clients loop one unit at a time, re-reading
//!   the returned cart between calls.

use rust_decimal::Decimal;

use crate::ShippingMethod;

/// A cart or order line reduced to what totals need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    /// Unit price of the bike on this line.
    pub unit_price: Decimal,
    /// Number of units. At least 1 while the line exists.
    pub quantity: u32,
}

impl PricedLine {
    /// Create a priced line.
    #[must_use]
    pub const fn new(unit_price: Decimal, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Quantity a cart line ends up with after an add.
///
/// `existing` is the line's current quantity, or `None` when the bike is not
/// in the cart yet. The result is always `existing + requested`, saturating
/// rather than wrapping on overflow.
#[must_use]
pub fn quantity_after_add(existing: Option<u32>, requested: u32) -> u32 {
    existing.unwrap_or(0).saturating_add(requested)
}

/// Outcome of removing a single unit of a bike from the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The line remains with the given quantity.
    Decremented(u32),
    /// The quantity reached zero; the line is deleted.
    LineDeleted,
    /// The bike was not in the cart; the cart is unchanged.
    NotInCart,
}

/// Remove exactly one unit from a line with the given current quantity.
#[must_use]
pub fn remove_one(existing: Option<u32>) -> RemoveOutcome {
    match existing {
        None | Some(0) => RemoveOutcome::NotInCart,
        Some(1) => RemoveOutcome::LineDeleted,
        Some(q) => RemoveOutcome::Decremented(q - 1),
    }
}

/// Sum of `unit_price * quantity` over all lines.
#[must_use]
pub fn subtotal(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(PricedLine::line_total).sum()
}

/// Order total: subtotal plus the flat fee of the shipping method.
///
/// Recomputed server-side at placement time; the persisted value is
/// authoritative and client-side figures are display-only.
#[must_use]
pub fn order_total(lines: &[PricedLine], shipping: ShippingMethod) -> Decimal {
    subtotal(lines) + shipping.fee()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price: i64, qty: u32) -> PricedLine {
        PricedLine::new(Decimal::from(price), qty)
    }

    #[test]
    fn test_add_creates_line_with_requested_quantity() {
        assert_eq!(quantity_after_add(None, 1), 1);
        assert_eq!(quantity_after_add(None, 3), 3);
    }

    #[test]
    fn test_add_increments_existing_line() {
        assert_eq!(quantity_after_add(Some(1), 1), 2);
        assert_eq!(quantity_after_add(Some(2), 3), 5);
    }

    #[test]
    fn test_add_never_decrements() {
        for existing in [None, Some(1), Some(7)] {
            for requested in 1..=4 {
                let before = existing.unwrap_or(0);
                assert!(quantity_after_add(existing, requested) > before);
            }
        }
    }

    #[test]
    fn test_add_saturates_instead_of_wrapping() {
        assert_eq!(quantity_after_add(Some(u32::MAX), 1), u32::MAX);
    }

    #[test]
    fn test_remove_decrements_by_exactly_one() {
        assert_eq!(remove_one(Some(3)), RemoveOutcome::Decremented(2));
        assert_eq!(remove_one(Some(2)), RemoveOutcome::Decremented(1));
    }

    #[test]
    fn test_remove_deletes_line_at_one() {
        assert_eq!(remove_one(Some(1)), RemoveOutcome::LineDeleted);
    }

    #[test]
    fn test_remove_missing_line_is_a_noop() {
        assert_eq!(remove_one(None), RemoveOutcome::NotInCart);
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let lines = [line(100, 2), line(50, 1)];
        assert_eq!(subtotal(&lines), Decimal::from(250));
    }

    #[test]
    fn test_subtotal_empty_cart_is_zero() {
        assert_eq!(subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_order_total_adds_flat_shipping_fee() {
        let lines = [line(100, 1)];
        assert_eq!(
            order_total(&lines, ShippingMethod::Standard),
            Decimal::from(120)
        );
        assert_eq!(
            order_total(&lines, ShippingMethod::Express),
            Decimal::from(150)
        );
        assert_eq!(
            order_total(&lines, ShippingMethod::Pickup),
            Decimal::from(100)
        );
    }

    #[test]
    fn test_express_order_for_single_bike() {
        // One bike at 16995, Express shipping.
        let lines = [line(16995, 1)];
        assert_eq!(
            order_total(&lines, ShippingMethod::Express),
            Decimal::from(17045)
        );
    }

    #[test]
    fn test_fee_independent_of_cart_size() {
        let small = [line(10, 1)];
        let large = [line(10, 1), line(20, 5), line(30, 2)];
        let fee = ShippingMethod::Express.fee();
        assert_eq!(order_total(&small, ShippingMethod::Express) - subtotal(&small), fee);
        assert_eq!(order_total(&large, ShippingMethod::Express) - subtotal(&large), fee);
    }
}
