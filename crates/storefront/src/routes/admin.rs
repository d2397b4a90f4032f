//! Admin route handlers: verification queues and category management.

use axum::Json;
use axum::extract::{Path, State};
use tracing::{info, instrument};

use relocal_core::{ProductId, ShopId};

use crate::api::types::{ApiMessage, Category, CategoryCreate, Product, Shop};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Shops awaiting verification.
#[instrument(skip_all)]
pub async fn pending_shops(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
) -> Result<Json<Vec<Shop>>> {
    Ok(Json(
        state.api().with_token(&auth.token).pending_shops().await?,
    ))
}

/// Mark a shop verified, letting it sell.
#[instrument(skip(state, auth))]
pub async fn verify_shop(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(shop_id): Path<ShopId>,
) -> Result<Json<ApiMessage>> {
    let message = state
        .api()
        .with_token(&auth.token)
        .verify_shop(&shop_id)
        .await?;
    info!(%shop_id, "shop verified");
    Ok(Json(message))
}

/// Products awaiting verification.
#[instrument(skip_all)]
pub async fn pending_products(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(
        state
            .api()
            .with_token(&auth.token)
            .pending_products()
            .await?,
    ))
}

/// Mark a product verified, making it visible to buyers.
#[instrument(skip(state, auth))]
pub async fn verify_product(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ApiMessage>> {
    let message = state
        .api()
        .with_token(&auth.token)
        .verify_product(&product_id)
        .await?;
    info!(%product_id, "product verified");
    Ok(Json(message))
}

/// Create a product category.
#[instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Json(request): Json<CategoryCreate>,
) -> Result<Json<Category>> {
    Ok(Json(
        state
            .api()
            .with_token(&auth.token)
            .create_category(&request)
            .await?,
    ))
}
