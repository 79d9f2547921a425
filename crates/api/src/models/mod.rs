//! Domain models for the API.
//!
//! These types represent validated domain objects separate from database row
//! types. They serialize straight into the JSON the storefront SPA consumes.

pub mod bike;
pub mod order;
pub mod session;
pub mod user;

pub use bike::{Bike, BikeWithOwner};
pub use order::{Cart, CartItem, Order, OrderItem};
pub use session::{CurrentUser, session_keys};
pub use user::User;
