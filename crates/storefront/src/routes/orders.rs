//! Order history route handlers.

use axum::Json;
use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::{info, instrument};

use relocal_core::{Cart, OrderId};

use crate::api::types::Order;
use crate::cart_store::{CartStore, SessionCartStore};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::routes::cart::{CartView, luggage_estimate};
use crate::state::AppState;

/// The user's orders, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.api().with_token(&auth.token).list_orders().await?))
}

/// Rebuild the cart from a past order.
///
/// Replaces whatever is in the cart; a historical order already
/// satisfies the single-shop invariant, so this cannot produce a mixed
/// cart. Items the backend dropped (discontinued products) are simply
/// absent.
#[instrument(skip(state, session, auth))]
pub async fn reorder(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<CartView>> {
    let order = state
        .api()
        .with_token(&auth.token)
        .reorder(&order_id)
        .await?;

    let cart = Cart::from_order_items(order.items);
    let store = SessionCartStore::new(session);
    store.save(&cart).await?;
    info!(%order_id, items = cart.items().len(), "cart rebuilt from order");

    let luggage = luggage_estimate(&state, &cart).await;
    Ok(Json(CartView::from_cart(cart, luggage)))
}
