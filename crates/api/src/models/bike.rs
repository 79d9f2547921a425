//! Bike catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use torque_core::{BikeId, UserId};

use super::user::User;

/// A motorcycle in the catalog (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bike {
    /// Unique bike ID.
    pub id: BikeId,
    /// Display name, e.g. "S 1000 RR".
    pub name: String,
    /// Engine displacement in cubic centimetres.
    pub cc: Decimal,
    /// List price.
    pub price: Decimal,
    /// Path to the product photo under the upload directory.
    pub photo: Option<String>,
    /// Production year.
    pub year: i32,
    /// Manufacturer, e.g. "BMW".
    pub brand: Option<String>,
    /// Category, e.g. "Sport", "Adventure".
    pub category: Option<String>,
    /// Free-form description shown on the product page.
    pub description: Option<String>,
    /// The user who listed this bike, if any.
    pub user_id: Option<UserId>,
    /// When the bike was created.
    pub created_at: DateTime<Utc>,
    /// When the bike was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A bike paired with the user who listed it.
///
/// The legacy catalog endpoints return this shape: each bike is joined with
/// its lister so the client can show who posted the listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BikeWithOwner {
    pub bike: Bike,
    /// The listing user, or `None` when the bike has no lister on file.
    pub user: Option<User>,
}
