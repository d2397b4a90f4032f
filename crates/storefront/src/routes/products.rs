//! Public catalog route handlers.
//!
//! Everything here works without a session; product detail is the page a
//! scanned QR code lands on.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Redirect;
use tracing::instrument;

use relocal_core::{ProductId, QrCodeId, ShopId};

use crate::api::types::{Category, Product, ProductDetail};
use crate::error::Result;
use crate::state::AppState;

/// Product detail with its shop embedded.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let detail = state.api().get_product(&product_id).await?;
    Ok(Json(detail))
}

/// Resolve a scanned QR code and send the browser to the product page.
#[instrument(skip(state))]
pub async fn scan_qr(
    State(state): State<AppState>,
    Path(qr_code_id): Path<QrCodeId>,
) -> Result<Redirect> {
    let scan = state.api().scan_qr(&qr_code_id).await?;
    Ok(Redirect::to(&format!("/products/{}", scan.product_id)))
}

pub async fn shop_products(
    State(state): State<AppState>,
    Path(shop_id): Path<ShopId>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.api().shop_products(&shop_id).await?))
}

pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.api().categories().await?))
}
