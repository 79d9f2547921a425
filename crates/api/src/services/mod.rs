//! Business logic services.

pub mod auth;
pub mod checkout;
pub mod mailer;

pub use auth::{AuthError, AuthService};
pub use checkout::{CheckoutService, PlaceOrderError};
pub use mailer::{MailError, Mailer};
