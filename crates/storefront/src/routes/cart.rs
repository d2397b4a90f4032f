//! Cart route handlers.
//!
//! The cart lives in the server-side session and is restricted to one
//! shop; adding from a second shop is rejected with a clear message so
//! the client can offer to start a new cart.

use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, instrument};

use relocal_core::{Cart, LuggageEstimate, ProductId, WeightMetadata, estimate_savings};

use crate::cart_store::{CartStore, SessionCartStore};
use crate::error::Result;
use crate::state::AppState;

/// Cart response with derived display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub cart: Cart,
    pub total: Decimal,
    pub item_count: u32,
    /// Informational only; recomputed from whatever weight metadata is
    /// currently available.
    pub luggage: LuggageEstimate,
}

impl CartView {
    pub(crate) fn from_cart(cart: Cart, luggage: LuggageEstimate) -> Self {
        Self {
            total: cart.total(),
            item_count: cart.item_count(),
            cart,
            luggage,
        }
    }
}

/// Collect weight metadata for the cart's products and estimate savings.
///
/// Lookups go through the product cache; a failed lookup drops that item
/// from the estimate rather than failing the page.
pub(crate) async fn luggage_estimate(state: &AppState, cart: &Cart) -> LuggageEstimate {
    let mut weights: HashMap<ProductId, WeightMetadata> = HashMap::new();
    for item in cart.items() {
        match state.api().get_product(&item.product_id).await {
            Ok(detail) => {
                weights.insert(item.product_id.clone(), detail.product.weight);
            }
            Err(error) => {
                debug!(product_id = %item.product_id, %error, "weight lookup failed");
            }
        }
    }
    estimate_savings(cart.items(), &weights)
}

/// The current cart with its luggage estimate.
#[instrument(skip_all)]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let store = SessionCartStore::new(session);
    let cart = store.load().await?;
    let luggage = luggage_estimate(&state, &cart).await;
    Ok(Json(CartView::from_cart(cart, luggage)))
}

/// Add-to-cart request.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Add a product to the cart.
///
/// The price and shop are taken from the catalog, never from the
/// client. A mixed-shop add fails with 400 and leaves the cart as it
/// was.
#[instrument(skip(state, session))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let detail = state.api().get_product(&request.product_id).await?;

    let store = SessionCartStore::new(session);
    let mut cart = store.load().await?;
    cart.add_item(detail.to_cart_item(request.quantity))?;
    store.save(&cart).await?;

    let luggage = luggage_estimate(&state, &cart).await;
    Ok(Json(CartView::from_cart(cart, luggage)))
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let store = SessionCartStore::new(session);
    store.clear().await?;
    Ok(Json(CartView::from_cart(Cart::new(), LuggageEstimate::default())))
}
