//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Legacy catalog surface
//! GET    /bike/getAll          - All bikes, each joined with its lister
//! GET    /bike/getById?id=     - One bike with its lister
//! POST   /bike/create          - Create a bike (lister must exist)
//! PUT    /bike/edit            - Edit a bike
//! DELETE /bike/delete?bikeId=  - Delete a bike
//! GET    /user/getAll          - All users
//! GET    /user/getById?userId= - One user
//! POST   /user/create          - Create a user
//! PUT    /user/edit            - Edit username/avatar
//! DELETE /user/delete?userId=  - Delete a user
//! GET  /user/profile           - Own profile (requires login)
//! PUT  /user/profile           - Update own email/phone/address
//!
//! # Auth
//! POST /api/auth               - Username/password login
//! POST /api/auth/google        - Google ID-token sign-in
//! POST /api/auth/logout        - Logout
//! GET  /api/auth/me            - Current session identity
//! POST /register               - Register (sends verification mail)
//! POST /verify-email           - Verify email, enable account
//! POST /api/password-reset/request - Start password reset
//! POST /api/password-reset/confirm - Complete password reset
//!
//! # Catalog
//! GET /api/bikes               - Plain bike list
//! GET /api/bikes/{id}          - One bike
//!
//! # Cart (requires login)
//! GET  /api/cart               - The authoritative cart
//! POST /api/cart/add           - Create a line or increment it
//! POST /api/cart/remove        - Remove exactly one unit
//!
//! # Orders (requires login)
//! POST /api/orders/place       - Place an order from the cart
//! GET  /api/orders             - Own order history
//!
//! # Admin (requires admin role)
//! GET/POST   /api/admin/users,  PUT/DELETE /api/admin/users/{id}
//! GET/POST   /api/admin/bikes,  PUT/DELETE /api/admin/bikes/{id}
//! GET        /api/admin/orders, DELETE     /api/admin/orders/{id}
//! PUT        /api/admin/orders/{id}/status
//!
//! # Uploads
//! POST /api/upload             - Multipart photo upload
//! ```

pub mod admin;
pub mod auth;
pub mod bikes;
pub mod cart;
pub mod orders;
pub mod password_reset;
pub mod register;
pub mod upload;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the legacy bike routes router.
pub fn bike_routes() -> Router<AppState> {
    Router::new()
        .route("/getAll", get(bikes::get_all))
        .route("/getById", get(bikes::get_by_id))
        .route("/create", post(bikes::create))
        .route("/edit", put(bikes::edit))
        .route("/delete", delete(bikes::delete))
}

/// Create the legacy user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/getAll", get(users::get_all))
        .route("/getById", get(users::get_by_id))
        .route("/create", post(users::create))
        .route("/edit", put(users::edit))
        .route("/delete", delete(users::delete))
        .route("/profile", get(users::profile).put(users::update_profile))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(auth::login))
        .route("/google", post(auth::google_login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::history))
        .route("/place", post(orders::place))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/bikes", get(admin::list_bikes).post(admin::create_bike))
        .route(
            "/bikes/{id}",
            put(admin::update_bike).delete(admin::delete_bike),
        )
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}", delete(admin::delete_order))
        .route("/orders/{id}/status", put(admin::update_order_status))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Legacy surface
        .nest("/bike", bike_routes())
        .nest("/user", user_routes())
        // Registration & verification
        .route("/register", post(register::register))
        .route("/verify-email", post(register::verify_email))
        // Auth
        .nest("/api/auth", auth_routes())
        .route(
            "/api/password-reset/request",
            post(password_reset::request),
        )
        .route(
            "/api/password-reset/confirm",
            post(password_reset::confirm),
        )
        // Catalog
        .route("/api/bikes", get(bikes::list))
        .route("/api/bikes/{id}", get(bikes::show))
        // Cart & orders
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        // Admin
        .nest("/api/admin", admin_routes())
        // Uploads
        .route("/api/upload", post(upload::upload))
}
