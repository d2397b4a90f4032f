//! Checkout route handlers.
//!
//! `POST /checkout` places the order and answers with the payment URL;
//! the client sends the browser there. The provider redirects back to
//! `GET /checkout/success`, which polls the payment status a bounded
//! number of times and clears the cart only once the payment settled.

use axum::Json;
use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use relocal_core::{
    Address, Cart, CheckoutSessionId, DeliveryType, LuggageEstimate, PaymentStatus, Price,
    SessionStatus,
};

use crate::api::types::Order;
use crate::cart_store::{CartStore, SessionCartStore};
use crate::checkout::poller::{PollOutcome, TokioSleeper, poll_payment};
use crate::checkout::{CheckoutError, CheckoutForm, start_checkout};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::routes::cart::luggage_estimate;
use crate::state::AppState;

/// Everything the checkout page needs in one response.
#[derive(Debug, Serialize)]
pub struct CheckoutSummary {
    pub cart: Cart,
    pub total: Decimal,
    /// Delivery preselected for travellers in Travel Mode, pickup
    /// otherwise. The buyer can always override.
    pub default_delivery_type: DeliveryType,
    pub luggage: LuggageEstimate,
    /// Saved addresses to offer for delivery.
    pub addresses: Vec<Address>,
}

/// Checkout summary with defaults derived from the user's travel mode.
#[instrument(skip_all)]
pub async fn summary(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<CheckoutSummary>> {
    let store = SessionCartStore::new(session);
    let cart = store.load().await?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }

    let luggage = luggage_estimate(&state, &cart).await;
    // Fresh profile; the session snapshot may predate a travel-mode
    // toggle or a new address
    let profile = state.api().with_token(&auth.token).me().await?;

    Ok(Json(CheckoutSummary {
        total: cart.total(),
        default_delivery_type: DeliveryType::default_for_travel_mode(profile.travel_mode),
        luggage,
        addresses: profile.addresses,
        cart,
    }))
}

/// Order placed; the client should send the browser to `payment_url`.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
    pub payment_url: String,
}

/// Place the order and open its payment session.
///
/// The cart intentionally survives this call; it is cleared by the
/// success poller once the payment is confirmed.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<CheckoutResponse>> {
    let store = SessionCartStore::new(session);
    let cart = store.load().await?;

    let api = state.api().with_token(&auth.token);
    let started = start_checkout(&api, &cart, &form, &state.config().base_url).await?;

    Ok(Json(CheckoutResponse {
        order: started.order,
        payment_url: started.payment_url,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    /// Optional so a missing id answers with the JSON error shape, not
    /// an extractor rejection.
    #[serde(default)]
    pub session_id: Option<CheckoutSessionId>,
}

/// Result of the post-redirect payment poll.
#[derive(Debug, Serialize)]
pub struct SuccessView {
    /// `success`, `failed`, or `timeout`.
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_status: Option<SessionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_total: Option<Decimal>,
    /// Formatted amount (e.g. `$40.00`) when the provider reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_total: Option<String>,
}

fn success_view(outcome: PollOutcome) -> SuccessView {
    match outcome {
        PollOutcome::Paid(status) => {
            let display_total = status
                .amount_total
                .map(|amount| Price::new(amount, status.currency.unwrap_or_default()).display());
            SuccessView {
                state: "success",
                payment_status: Some(status.payment_status),
                session_status: Some(status.status),
                amount_total: status.amount_total,
                display_total,
            }
        }
        PollOutcome::Expired => SuccessView {
            state: "failed",
            payment_status: None,
            session_status: Some(SessionStatus::Expired),
            amount_total: None,
            display_total: None,
        },
        PollOutcome::Failed => SuccessView {
            state: "failed",
            payment_status: None,
            session_status: None,
            amount_total: None,
            display_total: None,
        },
        PollOutcome::StillPending => SuccessView {
            state: "timeout",
            payment_status: Some(PaymentStatus::Pending),
            session_status: None,
            amount_total: None,
            display_total: None,
        },
    }
}

/// Poll the payment session after the provider redirected back.
///
/// A `timeout` answer is not a failure: the backend finishes the order
/// from the provider's webhook regardless, so the client tells the
/// buyer to check their orders page.
#[instrument(skip(state, session, auth))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<SuccessQuery>,
) -> Result<Json<SuccessView>> {
    let Some(session_id) = query.session_id else {
        return Err(AppError::BadRequest("Missing session_id".to_string()));
    };

    let store = SessionCartStore::new(session);
    let api = state.api().with_token(&auth.token);

    let outcome = poll_payment(&api, &TokioSleeper, &store, &session_id).await?;
    Ok(Json(success_view(outcome)))
}
