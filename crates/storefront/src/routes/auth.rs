//! Authentication route handlers.
//!
//! Sign-in happens at an external identity provider. It redirects back
//! to `/auth/callback?session_id=...` with a one-time id, which is
//! exchanged at the backend for a profile and a session token. The
//! token never reaches the browser; it stays in the server-side session.

use axum::extract::{Query, State};
use axum::response::Redirect;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub session_id: String,
}

/// Handle the identity-provider redirect.
///
/// On success the browser is sent to the page it came from, or to the
/// role's landing page: tourists to the dashboard, shopkeepers to their
/// orders, admins to the verification queue.
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect> {
    if query.session_id.is_empty() {
        return Err(AppError::BadRequest("Missing session_id".to_string()));
    }

    let exchange = state.api().exchange_session(&query.session_id).await?;

    let user = CurrentUser {
        user_id: exchange.user.user_id.clone(),
        email: exchange.user.email.clone(),
        name: exchange.user.name.clone(),
        role: exchange.user.role,
        travel_mode: exchange.user.travel_mode,
    };

    set_current_user(&session, &user, &exchange.session_token)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    set_sentry_user(&user.user_id, Some(&user.email));
    info!(user_id = %user.user_id, role = ?user.role, "user signed in");

    let return_to: Option<String> = session
        .remove(session_keys::RETURN_TO)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let destination = return_to
        .filter(|path| path.starts_with('/'))
        .unwrap_or_else(|| user.role.dashboard_path().to_string());
    Ok(Redirect::to(&destination))
}

/// Sign the user out of both the storefront session and the backend.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
) -> Result<Redirect> {
    // Best effort; the local session is cleared either way
    if let Err(error) = state.api().with_token(&auth.token).logout().await {
        warn!(%error, "backend logout failed");
    }

    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    clear_sentry_user();
    info!(user_id = %auth.user.user_id, "user signed out");

    Ok(Redirect::to("/"))
}
