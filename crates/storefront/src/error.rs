//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`; server-side failures are
//! captured to Sentry before the response goes out, and internal detail
//! never reaches the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use relocal_core::CartError;

use crate::api::ApiError;
use crate::cart_store::CartStoreError;
use crate::checkout::CheckoutError;
use crate::checkout::poller::PollError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The cart rejected a mutation.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Cart persistence failed.
    #[error("Cart store error: {0}")]
    CartStore(#[from] CartStoreError),

    /// Checkout orchestration failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Payment status polling failed.
    #[error("Payment poll error: {0}")]
    Poll(#[from] PollError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error indicates something broke on our side (or the
    /// backend's) rather than bad client input.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_) | Self::CartStore(_) => true,
            Self::Api(api) => matches!(api, ApiError::Http(_) | ApiError::Parse(_)),
            Self::Checkout(CheckoutError::Api(api)) => {
                matches!(api, ApiError::Http(_) | ApiError::Parse(_))
            }
            Self::Checkout(CheckoutError::CartStore(_)) | Self::Poll(PollError::CartStore(_)) => {
                true
            }
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        fn api_status(api: &ApiError) -> StatusCode {
            match api {
                ApiError::Http(_) | ApiError::Parse(_) => StatusCode::BAD_GATEWAY,
                ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
                ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::Api { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
            }
        }

        match self {
            Self::Api(api) => api_status(api),
            Self::Cart(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::CartStore(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Checkout(checkout) => match checkout {
                CheckoutError::EmptyCart
                | CheckoutError::MissingAddress
                | CheckoutError::MissingTripEndDate => StatusCode::BAD_REQUEST,
                CheckoutError::Api(api) => api_status(api),
                CheckoutError::CartStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Poll(PollError::CartStore(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Client-facing message. Internal detail is replaced wholesale.
    fn message(&self) -> String {
        if self.is_server_error() {
            return "Internal server error".to_string();
        }
        match self {
            Self::Api(ApiError::Api { message, .. }) => message.clone(),
            Self::Api(ApiError::Unauthorized) => "Not signed in".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with
/// users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Api(ApiError::Forbidden("x".to_string()))),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_backend_api_status_is_forwarded() {
        let err = AppError::Api(ApiError::Api {
            status: 409,
            message: "User already has a shop".to_string(),
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "User already has a shop");
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = AppError::Internal("pool exhausted at 10 conns".to_string());
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_cart_error_is_bad_request() {
        let err = AppError::Cart(CartError::ZeroQuantity);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
