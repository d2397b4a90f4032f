//! Database access for the storefront `PostgreSQL`.
//!
//! The backend is the source of truth for users, shops, products, and
//! orders; the local database stores sessions only.
//!
//! ## Tables
//!
//! - `sessions` - tower-sessions storage
//!
//! Migrations live in `crates/storefront/migrations/` and are applied
//! with `sqlx migrate run` against the storefront database.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
