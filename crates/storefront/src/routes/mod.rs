//! HTTP route handlers for the storefront.
//!
//! All handlers return JSON; the storefront is a headless API consumed
//! by the mobile and web clients.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (DB ping)
//!
//! # Auth
//! GET  /auth/callback                - Identity-provider redirect target
//! POST /auth/logout                  - Sign out
//!
//! # Catalog (public)
//! GET  /products/{product_id}        - Product detail with shop
//! GET  /qr/{qr_code_id}              - Resolve scanned QR, redirect
//! GET  /shops/{shop_id}/products     - Shop product listing
//! GET  /categories                   - Category listing
//!
//! # Cart (session)
//! GET    /cart                       - Cart with luggage estimate
//! POST   /cart/items                 - Add item (single-shop enforced)
//! DELETE /cart                       - Clear cart
//!
//! # Checkout (requires auth)
//! GET  /checkout                     - Checkout summary + defaults
//! POST /checkout                     - Place order, open payment session
//! GET  /checkout/success             - Poll payment after redirect back
//!
//! # Orders (requires auth)
//! GET  /orders                       - Order history
//! POST /orders/{order_id}/reorder    - Rebuild cart from past order
//!
//! # Profile (requires auth)
//! GET  /me                           - Fresh profile
//! PUT  /me/travel-mode               - Toggle Travel Mode
//! POST /me/addresses                 - Save a delivery address
//! GET  /me/luggage-savings           - Savings across delivered orders
//!
//! # Seller (requires shopkeeper role, except shop creation)
//! POST /seller/shop                  - Register a shop
//! GET  /seller/shop                  - Own shop
//! POST /seller/products              - Add a product
//! GET  /seller/products/{id}/qr.png  - Printable QR code
//! GET  /seller/orders                - Incoming orders
//! PUT  /seller/orders/{id}/tracking  - Mark shipped with tracking id
//! GET  /seller/insights              - Sales insights
//!
//! # Admin (requires admin role)
//! GET  /admin/shops/pending          - Shops awaiting verification
//! PUT  /admin/shops/{id}/verify      - Mark a shop verified
//! GET  /admin/products/pending       - Products awaiting verification
//! PUT  /admin/products/{id}/verify   - Mark a product verified
//! POST /admin/categories             - Create a category
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod profile;
pub mod seller;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
}

/// Create the public catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products/{product_id}", get(products::show))
        .route("/qr/{qr_code_id}", get(products::scan_qr))
        .route("/shops/{shop_id}/products", get(products::shop_products))
        .route("/categories", get(products::categories))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::summary).post(checkout::submit))
        .route("/success", get(checkout::success))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{order_id}/reorder", post(orders::reorder))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show))
        .route("/travel-mode", put(profile::set_travel_mode))
        .route("/addresses", post(profile::add_address))
        .route("/luggage-savings", get(profile::luggage_savings))
}

/// Create the seller routes router.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/shop", post(seller::create_shop).get(seller::my_shop))
        .route("/products", post(seller::create_product))
        .route("/products/{product_id}/qr.png", get(seller::qr_image))
        .route("/orders", get(seller::orders))
        .route("/orders/{order_id}/tracking", put(seller::update_tracking))
        .route("/insights", get(seller::insights))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/shops/pending", get(admin::pending_shops))
        .route("/shops/{shop_id}/verify", put(admin::verify_shop))
        .route("/products/pending", get(admin::pending_products))
        .route("/products/{product_id}/verify", put(admin::verify_product))
        .route("/categories", post(admin::create_category))
}

/// Assemble all storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/orders", order_routes())
        .nest("/me", profile_routes())
        .nest("/seller", seller_routes())
        .nest("/admin", admin_routes())
}
