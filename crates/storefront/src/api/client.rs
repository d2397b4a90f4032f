//! HTTP client for the ReLocal order-processing API.
//!
//! Public catalog lookups go through [`ApiClient`] directly; anything
//! acting on behalf of a signed-in user goes through [`UserApi`], which
//! forwards the backend session token as a bearer token.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use relocal_core::{CheckoutSessionId, OrderId, ProductId, QrCodeId, ShopId};

use super::ApiError;
use super::types::{
    ApiMessage, Category, CategoryCreate, CheckoutSession, CheckoutSessionRequest, CheckoutStatus,
    LuggageStats, Order, OrderCreate, Product, ProductCreate, ProductDetail, QrScan,
    SessionExchange, SessionRequest, Shop, ShopCreate, ShopInsights, TrackingUpdate,
    TravelModeUpdate, UserProfile,
};
use crate::config::RelocalApiConfig;

/// Name of the backend session cookie set during the session exchange.
const SESSION_COOKIE: &str = "session_token";

/// Backend route paths, kept in one place so they can be checked against
/// the backend's router as a set.
mod endpoints {
    use relocal_core::{CheckoutSessionId, OrderId, ProductId, QrCodeId, ShopId};

    pub const AUTH_SESSION: &str = "/auth/session";
    pub const AUTH_ME: &str = "/auth/me";
    pub const AUTH_LOGOUT: &str = "/auth/logout";
    pub const ADDRESSES: &str = "/users/addresses";
    pub const TRAVEL_MODE: &str = "/users/travel-mode";
    pub const LUGGAGE_SAVINGS: &str = "/users/luggage-savings";
    pub const ORDERS: &str = "/orders";
    pub const SELLER_ORDERS: &str = "/orders/seller";
    pub const SHOPS: &str = "/shops";
    pub const MY_SHOP: &str = "/shops/my-shop";
    pub const CATEGORIES: &str = "/categories";
    pub const CHECKOUT_SESSION: &str = "/checkout/session";
    pub const PENDING_SHOPS: &str = "/admin/shops/pending";
    pub const PENDING_PRODUCTS: &str = "/admin/products/pending";
    pub const ADMIN_CATEGORIES: &str = "/admin/categories";

    pub fn product(product_id: &ProductId) -> String {
        format!("/products/{product_id}")
    }

    pub fn qr_scan(qr_code_id: &QrCodeId) -> String {
        format!("/qr/scan/{qr_code_id}")
    }

    pub fn qr_generate(product_id: &ProductId) -> String {
        format!("/qr/generate/{product_id}")
    }

    pub fn shop_products(shop_id: &ShopId) -> String {
        format!("/shops/{shop_id}/products")
    }

    pub fn shop_insights(shop_id: &ShopId) -> String {
        format!("/shops/{shop_id}/insights")
    }

    pub fn reorder(order_id: &OrderId) -> String {
        format!("/orders/{order_id}/reorder")
    }

    pub fn order_tracking(order_id: &OrderId) -> String {
        format!("/orders/{order_id}/tracking")
    }

    pub fn checkout_status(session_id: &CheckoutSessionId) -> String {
        format!("/checkout/status/{session_id}")
    }

    pub fn verify_shop(shop_id: &ShopId) -> String {
        format!("/admin/shops/{shop_id}/verify")
    }

    pub fn verify_product(product_id: &ProductId) -> String {
        format!("/admin/products/{product_id}/verify")
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the ReLocal order-processing API.
///
/// Cheap to clone; all clones share the same connection pool and product
/// cache. Product detail lookups are cached for 5 minutes.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    product_cache: Cache<ProductId, ProductDetail>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &RelocalApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()?;

        let product_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                product_cache,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Check the response status and decode the JSON body.
    async fn handle<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.inner.client.get(self.url(path)).send().await?;
        Self::handle(response).await
    }

    /// Bind a backend session token, yielding a view that authenticates
    /// every request with it.
    #[must_use]
    pub fn with_token<'a>(&'a self, token: &'a str) -> UserApi<'a> {
        UserApi {
            client: self,
            token,
        }
    }

    // =========================================================================
    // Session exchange
    // =========================================================================

    /// Exchange a one-time identity-provider session id for a user
    /// profile and a backend session token.
    ///
    /// The token arrives as a `session_token` cookie on the response; it
    /// is extracted here and stored in the storefront session thereafter.
    #[instrument(skip(self, session_id))]
    pub async fn exchange_session(&self, session_id: &str) -> Result<SessionExchange, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url(endpoints::AUTH_SESSION))
            .json(&SessionRequest {
                session_id: session_id.to_string(),
            })
            .send()
            .await?;

        let session_token = response
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ApiError::Parse("session exchange set no session cookie".into()))?;

        let user: UserProfile = Self::handle(response).await?;
        debug!(user_id = %user.user_id, "exchanged session");
        Ok(SessionExchange {
            user,
            session_token,
        })
    }

    // =========================================================================
    // Public catalog
    // =========================================================================

    /// Fetch a product with its shop, through the 5-minute cache.
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<ProductDetail, ApiError> {
        if let Some(cached) = self.inner.product_cache.get(product_id).await {
            debug!(%product_id, "product cache hit");
            return Ok(cached);
        }

        let detail: ProductDetail = self.get_json(&endpoints::product(product_id)).await?;
        self.inner
            .product_cache
            .insert(product_id.clone(), detail.clone())
            .await;
        Ok(detail)
    }

    /// Resolve a scanned QR code to its product. The backend also counts
    /// the scan.
    #[instrument(skip(self))]
    pub async fn scan_qr(&self, qr_code_id: &QrCodeId) -> Result<QrScan, ApiError> {
        self.get_json(&endpoints::qr_scan(qr_code_id)).await
    }

    /// List a shop's products.
    #[instrument(skip(self))]
    pub async fn shop_products(&self, shop_id: &ShopId) -> Result<Vec<Product>, ApiError> {
        self.get_json(&endpoints::shop_products(shop_id)).await
    }

    /// List all product categories.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_json(endpoints::CATEGORIES).await
    }
}

// =============================================================================
// UserApi
// =============================================================================

/// A token-bound view over [`ApiClient`].
///
/// Every request carries the backend session token as a bearer token, so
/// the API enforces ownership and role checks against the right user.
#[derive(Clone, Copy)]
pub struct UserApi<'a> {
    client: &'a ApiClient,
    token: &'a str,
}

impl UserApi<'_> {
    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .inner
            .client
            .get(self.client.url(path))
            .bearer_auth(self.token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .inner
            .client
            .post(self.client.url(path))
            .bearer_auth(self.token)
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.client
            .inner
            .client
            .put(self.client.url(path))
            .bearer_auth(self.token)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.get(path).send().await?;
        ApiClient::handle(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.post(path).json(body).send().await?;
        ApiClient::handle(response).await
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Fetch the signed-in user's profile.
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get_json(endpoints::AUTH_ME).await
    }

    /// Invalidate the backend session.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self.post(endpoints::AUTH_LOGOUT).send().await?;
        let status = response.status();
        // The token may already be expired; treat that as logged out.
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    /// Save a delivery address on the profile.
    pub async fn add_address(
        &self,
        address: &relocal_core::Address,
    ) -> Result<ApiMessage, ApiError> {
        self.post_json(endpoints::ADDRESSES, address).await
    }

    /// Toggle Travel Mode.
    pub async fn set_travel_mode(&self, travel_mode: bool) -> Result<ApiMessage, ApiError> {
        let response = self
            .put(endpoints::TRAVEL_MODE)
            .json(&TravelModeUpdate { travel_mode })
            .send()
            .await?;
        ApiClient::handle(response).await
    }

    /// Aggregate luggage savings across the user's delivered orders.
    pub async fn luggage_savings(&self) -> Result<LuggageStats, ApiError> {
        self.get_json(endpoints::LUGGAGE_SAVINGS).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Create an order from a validated checkout request.
    #[instrument(skip_all)]
    pub async fn create_order(&self, order: &OrderCreate) -> Result<Order, ApiError> {
        self.post_json(endpoints::ORDERS, order).await
    }

    /// List the user's orders, newest first.
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json(endpoints::ORDERS).await
    }

    /// Clone a past order into a fresh pending one and return it.
    pub async fn reorder(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        let response = self.post(&endpoints::reorder(order_id)).send().await?;
        ApiClient::handle(response).await
    }

    // =========================================================================
    // Payment sessions
    // =========================================================================

    /// Open a payment session for an order.
    #[instrument(skip_all, fields(order_id = %request.order_id))]
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ApiError> {
        self.post_json(endpoints::CHECKOUT_SESSION, request).await
    }

    /// Fetch the current status of a payment session.
    pub async fn checkout_status(
        &self,
        session_id: &CheckoutSessionId,
    ) -> Result<CheckoutStatus, ApiError> {
        self.get_json(&endpoints::checkout_status(session_id)).await
    }

    // =========================================================================
    // Shopkeeper
    // =========================================================================

    /// Register a shop for the signed-in user.
    pub async fn create_shop(&self, shop: &ShopCreate) -> Result<Shop, ApiError> {
        self.post_json(endpoints::SHOPS, shop).await
    }

    /// Fetch the signed-in shopkeeper's shop.
    pub async fn my_shop(&self) -> Result<Shop, ApiError> {
        self.get_json(endpoints::MY_SHOP).await
    }

    /// Add a product to one of the shopkeeper's shops.
    pub async fn create_product(
        &self,
        shop_id: &ShopId,
        product: &ProductCreate,
    ) -> Result<Product, ApiError> {
        self.post_json(&endpoints::shop_products(shop_id), product)
            .await
    }

    /// List orders placed against the shopkeeper's shop.
    pub async fn seller_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json(endpoints::SELLER_ORDERS).await
    }

    /// Attach a tracking id to an order, marking it shipped.
    pub async fn update_tracking(
        &self,
        order_id: &OrderId,
        tracking_id: &str,
    ) -> Result<ApiMessage, ApiError> {
        let response = self
            .put(&endpoints::order_tracking(order_id))
            .json(&TrackingUpdate {
                tracking_id: tracking_id.to_string(),
            })
            .send()
            .await?;
        ApiClient::handle(response).await
    }

    /// Sales insights for a shop the user owns.
    pub async fn shop_insights(&self, shop_id: &ShopId) -> Result<ShopInsights, ApiError> {
        self.get_json(&endpoints::shop_insights(shop_id)).await
    }

    /// Printable QR code image for a product, as PNG bytes.
    pub async fn qr_image(&self, product_id: &ProductId) -> Result<Vec<u8>, ApiError> {
        let response = self.get(&endpoints::qr_generate(product_id)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }
        Ok(response.bytes().await?.to_vec())
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Shops awaiting verification.
    pub async fn pending_shops(&self) -> Result<Vec<Shop>, ApiError> {
        self.get_json(endpoints::PENDING_SHOPS).await
    }

    /// Mark a shop verified.
    pub async fn verify_shop(&self, shop_id: &ShopId) -> Result<ApiMessage, ApiError> {
        let response = self.put(&endpoints::verify_shop(shop_id)).send().await?;
        ApiClient::handle(response).await
    }

    /// Products awaiting verification.
    pub async fn pending_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json(endpoints::PENDING_PRODUCTS).await
    }

    /// Mark a product verified.
    pub async fn verify_product(&self, product_id: &ProductId) -> Result<ApiMessage, ApiError> {
        let response = self.put(&endpoints::verify_product(product_id)).send().await?;
        ApiClient::handle(response).await
    }

    /// Create a product category. The backend takes the fields as query
    /// parameters, not a JSON body.
    pub async fn create_category(&self, category: &CategoryCreate) -> Result<Category, ApiError> {
        let response = self
            .post(endpoints::ADMIN_CATEGORIES)
            .query(category)
            .send()
            .await?;
        ApiClient::handle(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One assertion per parameterized backend route.
    #[test]
    fn test_paths_match_backend_router() {
        assert_eq!(endpoints::qr_scan(&QrCodeId::new("qr_1")), "/qr/scan/qr_1");
        assert_eq!(
            endpoints::qr_generate(&ProductId::new("product_1")),
            "/qr/generate/product_1"
        );
        assert_eq!(
            endpoints::product(&ProductId::new("product_1")),
            "/products/product_1"
        );
        assert_eq!(
            endpoints::shop_products(&ShopId::new("shop_1")),
            "/shops/shop_1/products"
        );
        assert_eq!(
            endpoints::shop_insights(&ShopId::new("shop_1")),
            "/shops/shop_1/insights"
        );
        assert_eq!(
            endpoints::reorder(&OrderId::new("order_1")),
            "/orders/order_1/reorder"
        );
        assert_eq!(
            endpoints::order_tracking(&OrderId::new("order_1")),
            "/orders/order_1/tracking"
        );
        assert_eq!(
            endpoints::checkout_status(&CheckoutSessionId::new("cs_1")),
            "/checkout/status/cs_1"
        );
        assert_eq!(
            endpoints::verify_shop(&ShopId::new("shop_1")),
            "/admin/shops/shop_1/verify"
        );
        assert_eq!(
            endpoints::verify_product(&ProductId::new("product_1")),
            "/admin/products/product_1/verify"
        );
    }

    #[test]
    fn test_fixed_paths_match_backend_router() {
        assert_eq!(endpoints::ADDRESSES, "/users/addresses");
        assert_eq!(endpoints::TRAVEL_MODE, "/users/travel-mode");
        assert_eq!(endpoints::LUGGAGE_SAVINGS, "/users/luggage-savings");
        assert_eq!(endpoints::MY_SHOP, "/shops/my-shop");
        assert_eq!(endpoints::SELLER_ORDERS, "/orders/seller");
    }
}
