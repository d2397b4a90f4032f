//! Authentication extractors.
//!
//! Handlers declare what they need in their signature: [`RequireAuth`]
//! for any signed-in user, [`RequireShopkeeper`] / [`RequireAdmin`] for
//! role-gated views. Role checks here gate the storefront only; the
//! backend re-verifies the role on every privileged call it receives.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// A signed-in user together with the backend session token to act as
/// them.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user: CurrentUser,
    pub token: String,
}

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(
///     RequireAuth(auth): RequireAuth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<Order>>> {
///     let orders = state.api().with_token(&auth.token).list_orders().await?;
///     Ok(Json(orders))
/// }
/// ```
pub struct RequireAuth(pub AuthedUser);

/// Extractor that requires a signed-in shopkeeper (admins pass too).
pub struct RequireShopkeeper(pub AuthedUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub AuthedUser);

/// Extractor that optionally reads the signed-in user.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Rejection for the auth extractors.
pub enum AuthRejection {
    /// No usable session.
    Unauthorized,
    /// Signed in, but the role does not permit this view; the browser is
    /// sent back to the role's own landing page.
    WrongRole { dashboard: &'static str },
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not signed in" })),
            )
                .into_response(),
            Self::WrongRole { dashboard } => Redirect::to(dashboard).into_response(),
        }
    }
}

async fn authed_user(parts: &Parts) -> Option<AuthedUser> {
    // The session is set by SessionManagerLayer
    let session = parts.extensions.get::<Session>()?;

    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;
    let token: String = session
        .get(session_keys::BACKEND_TOKEN)
        .await
        .ok()
        .flatten()?;

    Some(AuthedUser { user, token })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match authed_user(parts).await {
            Some(auth) => Ok(Self(auth)),
            None => {
                // Remember where the user was headed so the sign-in
                // callback can resume there
                if let Some(session) = parts.extensions.get::<Session>() {
                    let _ = session
                        .insert(session_keys::RETURN_TO, parts.uri.path())
                        .await;
                }
                Err(AuthRejection::Unauthorized)
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireShopkeeper
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = authed_user(parts)
            .await
            .ok_or(AuthRejection::Unauthorized)?;
        if !(auth.user.role.is_shopkeeper() || auth.user.role.is_admin()) {
            return Err(AuthRejection::WrongRole {
                dashboard: auth.user.role.dashboard_path(),
            });
        }
        Ok(Self(auth))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = authed_user(parts)
            .await
            .ok_or(AuthRejection::Unauthorized)?;
        if !auth.user.role.is_admin() {
            return Err(AuthRejection::WrongRole {
                dashboard: auth.user.role.dashboard_path(),
            });
        }
        Ok(Self(auth))
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(authed_user(parts).await.map(|auth| auth.user)))
    }
}

/// Store the signed-in user and their backend token in the session.
///
/// Cycles the session ID first so the pre-login session cannot be
/// replayed as an authenticated one.
///
/// # Errors
///
/// Returns a session error if the store write fails.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
    token: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    session.insert(session_keys::BACKEND_TOKEN, token).await?;
    Ok(())
}

/// Remove the signed-in user, their token, and their cart from the
/// session.
///
/// # Errors
///
/// Returns a session error if the store write fails.
pub async fn clear_current_user(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session
        .remove::<String>(session_keys::BACKEND_TOKEN)
        .await?;
    session
        .remove::<relocal_core::Cart>(session_keys::CART)
        .await?;
    Ok(())
}
