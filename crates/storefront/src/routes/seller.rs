//! Shopkeeper route handlers.
//!
//! Shop creation is open to any signed-in user and upgrades their role;
//! everything else requires the shopkeeper role. The backend re-checks
//! ownership on every call, so these gates are navigation only.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use relocal_core::{OrderId, ProductId, Role};

use crate::api::types::{ApiMessage, Order, Product, ProductCreate, Shop, ShopCreate, ShopInsights};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, RequireShopkeeper};
use crate::models::session_keys;
use crate::state::AppState;

/// Register a shop and promote the user to shopkeeper.
#[instrument(skip_all)]
pub async fn create_shop(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Json(request): Json<ShopCreate>,
) -> Result<Json<Shop>> {
    let shop = state
        .api()
        .with_token(&auth.token)
        .create_shop(&request)
        .await?;
    info!(shop_id = %shop.shop_id, "shop registered");

    // Reflect the promotion immediately so the seller routes open up
    let mut user = auth.user;
    user.role = Role::Shopkeeper;
    session
        .insert(session_keys::CURRENT_USER, &user)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(shop))
}

/// The shopkeeper's own shop.
#[instrument(skip_all)]
pub async fn my_shop(
    State(state): State<AppState>,
    RequireShopkeeper(auth): RequireShopkeeper,
) -> Result<Json<Shop>> {
    Ok(Json(state.api().with_token(&auth.token).my_shop().await?))
}

/// Add a product to the shop. It stays hidden until an admin verifies
/// it.
#[instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    RequireShopkeeper(auth): RequireShopkeeper,
    Json(request): Json<ProductCreate>,
) -> Result<Json<Product>> {
    let api = state.api().with_token(&auth.token);
    // Products hang off a shop; resolve the shopkeeper's shop first.
    let shop = api.my_shop().await?;
    let product = api.create_product(&shop.shop_id, &request).await?;
    info!(product_id = %product.product_id, shop_id = %shop.shop_id, "product created");
    Ok(Json(product))
}

/// Printable QR code for a product, as PNG.
#[instrument(skip(state, auth))]
pub async fn qr_image(
    State(state): State<AppState>,
    RequireShopkeeper(auth): RequireShopkeeper,
    Path(product_id): Path<ProductId>,
) -> Result<Response> {
    let png = state
        .api()
        .with_token(&auth.token)
        .qr_image(&product_id)
        .await?;

    Response::builder()
        .header(header::CONTENT_TYPE, "image/png")
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"qr-{product_id}.png\""),
        )
        .body(Body::from(png))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Orders placed against the shop.
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    RequireShopkeeper(auth): RequireShopkeeper,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(
        state.api().with_token(&auth.token).seller_orders().await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct TrackingRequest {
    pub tracking_id: String,
}

/// Attach a tracking id, marking the order shipped.
#[instrument(skip(state, auth, request))]
pub async fn update_tracking(
    State(state): State<AppState>,
    RequireShopkeeper(auth): RequireShopkeeper,
    Path(order_id): Path<OrderId>,
    Json(request): Json<TrackingRequest>,
) -> Result<Json<ApiMessage>> {
    let tracking_id = request.tracking_id.trim();
    if tracking_id.is_empty() {
        return Err(AppError::BadRequest("Tracking id is required".to_string()));
    }
    Ok(Json(
        state
            .api()
            .with_token(&auth.token)
            .update_tracking(&order_id, tracking_id)
            .await?,
    ))
}

/// Sales insights for the shop.
#[instrument(skip_all)]
pub async fn insights(
    State(state): State<AppState>,
    RequireShopkeeper(auth): RequireShopkeeper,
) -> Result<Json<ShopInsights>> {
    let api = state.api().with_token(&auth.token);
    let shop = api.my_shop().await?;
    Ok(Json(api.shop_insights(&shop.shop_id).await?))
}
