//! Cart and order domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use torque_core::cart::PricedLine;
use torque_core::{BikeId, CartItemId, OrderId, OrderItemId, OrderStatus, ShippingMethod, UserId};

use super::bike::Bike;

/// A line in a user's cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Database ID of this line.
    pub id: CartItemId,
    /// The bike on this line.
    pub bike: Bike,
    /// Number of units. At least 1 while the line exists.
    pub quantity: u32,
    /// When the line was first added. Lines are returned in this order.
    pub added_at: DateTime<Utc>,
}

/// A user's cart: the server-held, authoritative copy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: UserId,
    pub cart_items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart for the given user.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            cart_items: Vec::new(),
        }
    }

    /// The cart's lines reduced to what totals need.
    #[must_use]
    pub fn priced_lines(&self) -> Vec<PricedLine> {
        self.cart_items
            .iter()
            .map(|item| PricedLine::new(item.bike.price, item.quantity))
            .collect()
    }
}

/// A line of a placed order.
///
/// Order lines snapshot the bike at placement time so later catalog edits or
/// deletions cannot change what an order says was bought. `bike_id` is kept
/// as a soft reference back to the catalog and nulled when the bike goes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    /// Catalog reference, if the bike still exists.
    pub bike_id: Option<BikeId>,
    /// Bike name at placement time.
    pub name: String,
    /// Unit price at placement time.
    pub unit_price: Decimal,
    /// Product photo at placement time.
    pub photo: Option<String>,
    pub quantity: u32,
}

/// A placed order with its frozen total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_items: Vec<OrderItem>,
    pub order_date: NaiveDate,
    /// Expected ship date: three days after the order date.
    pub ship_date: NaiveDate,
    pub payment_method: String,
    pub shipping_method: ShippingMethod,
    /// Subtotal plus shipping fee, computed server-side at placement.
    pub total: Decimal,
    pub status: OrderStatus,
    /// Shipping address copied from the user's profile at placement.
    pub address: String,
    /// Contact phone copied from the user's profile at placement.
    pub phone: String,
}
