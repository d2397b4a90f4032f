//! Profile route handlers.
//!
//! Mutations refresh the session snapshot so checkout defaults pick up
//! a travel-mode toggle without a re-login.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use relocal_core::Address;

use crate::api::types::{LuggageStats, UserProfile};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Overwrite the session snapshot with a fresh profile.
async fn refresh_snapshot(session: &Session, profile: &UserProfile) -> Result<()> {
    let user = CurrentUser {
        user_id: profile.user_id.clone(),
        email: profile.email.clone(),
        name: profile.name.clone(),
        role: profile.role,
        travel_mode: profile.travel_mode,
    };
    session
        .insert(session_keys::CURRENT_USER, &user)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Fresh profile from the backend.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<UserProfile>> {
    let profile = state.api().with_token(&auth.token).me().await?;
    refresh_snapshot(&session, &profile).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct TravelModeRequest {
    pub travel_mode: bool,
}

/// Toggle Travel Mode. The new value drives the checkout delivery
/// default from the next request on.
#[instrument(skip(state, session, auth))]
pub async fn set_travel_mode(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Json(request): Json<TravelModeRequest>,
) -> Result<Json<UserProfile>> {
    let api = state.api().with_token(&auth.token);
    api.set_travel_mode(request.travel_mode).await?;
    // The backend only acknowledges; re-fetch for the session snapshot
    // and the response.
    let profile = api.me().await?;
    refresh_snapshot(&session, &profile).await?;
    Ok(Json(profile))
}

/// Save a delivery address on the profile.
#[instrument(skip_all)]
pub async fn add_address(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Json(address): Json<Address>,
) -> Result<Json<UserProfile>> {
    if !address.is_deliverable() {
        return Err(AppError::BadRequest(
            "Address needs at least a street and city".to_string(),
        ));
    }
    let api = state.api().with_token(&auth.token);
    api.add_address(&address).await?;
    Ok(Json(api.me().await?))
}

/// Aggregate luggage savings across delivered orders.
#[instrument(skip_all)]
pub async fn luggage_savings(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<LuggageStats>> {
    Ok(Json(
        state.api().with_token(&auth.token).luggage_savings().await?,
    ))
}
