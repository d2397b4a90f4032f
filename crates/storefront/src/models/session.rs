//! Session-stored types.
//!
//! Only the identity snapshot lives here; orders and products are always
//! fetched fresh from the backend.

use serde::{Deserialize, Serialize};

use relocal_core::{Role, UserId};

/// Session-stored user identity.
///
/// A snapshot taken at sign-in. The role in particular gates navigation
/// only; the backend re-checks it on every privileged call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Travel Mode biases checkout defaults toward delivery.
    pub travel_mode: bool,
}

/// Session keys.
pub mod keys {
    /// Key for the signed-in user snapshot.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the backend session token forwarded as a bearer token.
    pub const BACKEND_TOKEN: &str = "backend_token";

    /// Key for the shopping cart (see `cart_store`).
    pub const CART: &str = "cart";

    /// Key for the path to return to after sign-in.
    pub const RETURN_TO: &str = "return_to";
}
