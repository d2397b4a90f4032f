//! ReLocal order-processing API client.
//!
//! # Architecture
//!
//! - Plain REST/JSON over `reqwest`; the backend is the source of truth
//!   for users, shops, products, orders, and payment sessions
//! - Identity is per-user: the storefront forwards the backend session
//!   token it obtained during the session exchange as a bearer token
//! - In-memory caching via `moka` for product lookups (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use relocal_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api);
//!
//! // Public lookup
//! let product = client.get_product(&product_id).await?;
//!
//! // Authenticated calls go through a token-bound view
//! let user = client.with_token(&token);
//! let orders = user.list_orders().await?;
//! ```

mod client;
pub mod types;

pub use client::{ApiClient, UserApi};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the ReLocal API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the request with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The session token was missing, invalid, or expired.
    #[error("Not authenticated")]
    Unauthorized,

    /// The caller's role does not permit this operation.
    #[error("Not authorized: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Build an error from a non-success response status and its body.
    ///
    /// The backend reports failures as `{"detail": "..."}`; the detail is
    /// surfaced when present, the raw body otherwise.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
            .unwrap_or_else(|| body.chars().take(200).collect());

        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::Api { status, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_extracts_detail() {
        let err = ApiError::from_status(400, r#"{"detail": "User already has a shop"}"#);
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "User already has a shop");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_maps_auth_statuses() {
        assert!(matches!(
            ApiError::from_status(401, r#"{"detail": "Session expired"}"#),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(403, r#"{"detail": "Admin access required"}"#),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from_status(404, r#"{"detail": "Order not found"}"#),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_from_status_falls_back_to_raw_body() {
        let err = ApiError::from_status(502, "upstream unavailable");
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("Product not found".to_string());
        assert_eq!(err.to_string(), "Not found: Product not found");
    }
}
