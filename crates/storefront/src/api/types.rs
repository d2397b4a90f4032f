//! Wire types for the ReLocal order-processing API.
//!
//! The backend owns these schemas; fields the storefront never reads are
//! simply not modelled. Deserialization is lenient (`serde(default)`) for
//! optional metadata so older backend records never fail a page load.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use relocal_core::{
    Address, CartItem, CategoryId, CheckoutSessionId, CurrencyCode, DeliveryPreferenceReason,
    DeliveryType, OrderId, OrderStatus, PaymentStatus, ProductId, QrCodeId, Role, SessionStatus,
    ShopId, UserId, WeightMetadata,
};

// =============================================================================
// Users & Auth
// =============================================================================

/// A user profile as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub addresses: Vec<Address>,
    /// Travel Mode biases the default delivery method toward shipping.
    #[serde(default = "default_travel_mode")]
    pub travel_mode: bool,
    pub created_at: DateTime<Utc>,
}

const fn default_travel_mode() -> bool {
    true
}

/// Body of the one-time session exchange request.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest {
    /// One-time identifier from the identity provider redirect.
    pub session_id: String,
}

/// Result of a successful session exchange: the user's profile plus the
/// backend session token to forward on subsequent calls.
#[derive(Debug, Clone)]
pub struct SessionExchange {
    pub user: UserProfile,
    pub session_token: String,
}

/// Travel mode preference update.
#[derive(Debug, Clone, Serialize)]
pub struct TravelModeUpdate {
    pub travel_mode: bool,
}

// =============================================================================
// Shops & Products
// =============================================================================

/// A shop as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shop {
    pub shop_id: ShopId,
    pub owner_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: serde_json::Value,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub payout_setup: bool,
    pub created_at: DateTime<Utc>,
}

/// Shop onboarding request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: serde_json::Value,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// A product as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub shop_id: ShopId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub images: Vec<String>,
    pub qr_code_id: QrCodeId,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub authenticity_badge: bool,
    /// Weight metadata feeds the luggage-savings estimate.
    #[serde(flatten)]
    pub weight: WeightMetadata,
    pub created_at: DateTime<Utc>,
}

/// A product detail response: the product plus its shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default)]
    pub shop: Option<Shop>,
}

impl ProductDetail {
    /// Build a cart line item for this product.
    ///
    /// Falls back to the product's own `shop_id` when the shop record was
    /// not embedded in the response.
    #[must_use]
    pub fn to_cart_item(&self, quantity: u32) -> CartItem {
        CartItem {
            product_id: self.product.product_id.clone(),
            product_name: self.product.name.clone(),
            quantity,
            price: self.product.price,
            shop_id: self.product.shop_id.clone(),
            shop_name: self
                .shop
                .as_ref()
                .map(|shop| shop.name.clone())
                .unwrap_or_default(),
        }
    }
}

/// Product creation request (shopkeeper).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub authenticity_badge: bool,
    #[serde(flatten)]
    pub weight: WeightMetadata,
}

// =============================================================================
// QR codes
// =============================================================================

/// Result of scanning a QR code: where to send the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrScan {
    pub product_id: ProductId,
    pub redirect_url: String,
}

// =============================================================================
// Orders
// =============================================================================

/// Order creation request built by the checkout orchestrator.
///
/// `delivery_address` intentionally serializes as `null` (not omitted)
/// for pickup orders; the backend contract distinguishes "no address"
/// from "field absent".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub shop_id: ShopId,
    pub items: Vec<CartItem>,
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<Address>,
    pub ship_after_trip: bool,
    pub trip_end_date: Option<NaiveDate>,
    /// Analytics hint; the client never reads it back.
    pub delivery_preference_reason: DeliveryPreferenceReason,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gift_message: Option<String>,
}

/// An order as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub shop_id: ShopId,
    pub shop_name: String,
    pub items: Vec<CartItem>,
    pub total: Decimal,
    #[serde(default)]
    pub currency: CurrencyCode,
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub delivery_address: Option<Address>,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub ship_after_trip: bool,
    #[serde(default)]
    pub trip_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub gift_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tracking update request (shopkeeper); marks the order shipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub tracking_id: String,
}

// =============================================================================
// Payment sessions
// =============================================================================

/// Payment session creation request.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionRequest {
    pub order_id: OrderId,
    /// Return-URL base; the provider appends the session id on redirect
    /// back.
    pub origin_url: String,
}

/// A payment session hosted by the external payment provider.
///
/// Opaque to the client: only the session id (for status polling) and
/// the redirect URL are held, never card data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: CheckoutSessionId,
    pub url: String,
}

/// Polled payment session status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutStatus {
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub amount_total: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<CurrencyCode>,
}

// =============================================================================
// Insights & stats
// =============================================================================

/// Aggregate shop metrics (shopkeeper view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopInsights {
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub repeat_buyers: u64,
    pub total_products: u64,
    pub total_qr_scans: u64,
}

/// Server-computed luggage savings aggregate for the tourist dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuggageStats {
    pub total_weight_kg: Decimal,
    pub total_orders_delivered: u32,
    pub estimated_baggage_fee_saved: Decimal,
    #[serde(default)]
    pub fragile_items_saved: u32,
    #[serde(default)]
    pub liquid_items_saved: u32,
}

// =============================================================================
// Categories
// =============================================================================

/// A marketplace category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category creation request (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Generic `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_order_serializes_null_address() {
        let order = OrderCreate {
            shop_id: ShopId::new("shop_1"),
            items: vec![],
            delivery_type: DeliveryType::Pickup,
            delivery_address: None,
            ship_after_trip: false,
            trip_end_date: None,
            delivery_preference_reason: DeliveryPreferenceReason::ImmediatePickup,
            gift_message: None,
        };

        let value = serde_json::to_value(&order).expect("serialize");
        // Present and explicitly null, not omitted.
        assert!(value
            .as_object()
            .expect("object")
            .contains_key("delivery_address"));
        assert!(value["delivery_address"].is_null());
        assert_eq!(value["delivery_preference_reason"], "immediate_pickup");
        // gift_message is omitted entirely when unset.
        assert!(!value.as_object().expect("object").contains_key("gift_message"));
    }

    #[test]
    fn test_product_weight_metadata_flattened() {
        let json = r#"{
            "product_id": "product_1",
            "shop_id": "shop_1",
            "name": "Ceramic Bowl",
            "description": "Handmade",
            "price": 24.5,
            "qr_code_id": "qr_1",
            "estimated_weight_kg": 1.2,
            "is_fragile": true,
            "created_at": "2025-06-01T12:00:00Z"
        }"#;

        let product: Product = serde_json::from_str(json).expect("deserialize");
        assert_eq!(product.weight.estimated_weight_kg, Decimal::new(12, 1));
        assert!(product.weight.is_fragile);
        assert!(!product.weight.is_liquid);
    }

    #[test]
    fn test_product_detail_to_cart_item() {
        let json = r#"{
            "product_id": "product_1",
            "shop_id": "shop_1",
            "name": "Ceramic Bowl",
            "description": "Handmade",
            "price": 20,
            "qr_code_id": "qr_1",
            "created_at": "2025-06-01T12:00:00Z",
            "shop": {
                "shop_id": "shop_1",
                "owner_id": "user_1",
                "name": "Barcelona Pottery Studio",
                "location": {},
                "created_at": "2025-01-01T00:00:00Z"
            }
        }"#;

        let detail: ProductDetail = serde_json::from_str(json).expect("deserialize");
        let item = detail.to_cart_item(2);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.price, Decimal::new(20, 0));
        assert_eq!(item.shop_name, "Barcelona Pottery Studio");
    }

    #[test]
    fn test_checkout_status_lenient_deserialization() {
        let status: CheckoutStatus =
            serde_json::from_str(r#"{"payment_status": "paid"}"#).expect("deserialize");
        assert_eq!(status.payment_status, PaymentStatus::Paid);
        assert_eq!(status.status, SessionStatus::Open);
        assert!(status.amount_total.is_none());
    }

    #[test]
    fn test_user_profile_travel_mode_defaults_on() {
        let json = r#"{
            "user_id": "user_1",
            "email": "a@b.c",
            "name": "A",
            "role": "tourist",
            "created_at": "2025-01-01T00:00:00Z"
        }"#;
        let profile: UserProfile = serde_json::from_str(json).expect("deserialize");
        assert!(profile.travel_mode);
    }
}
