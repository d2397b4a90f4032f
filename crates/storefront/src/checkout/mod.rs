//! Checkout orchestration: validate the cart, place the order, open a
//! payment session.
//!
//! The orchestrator talks to the backend through the [`OrderGateway`]
//! trait so tests can script responses. The cart is deliberately NOT
//! cleared here; it survives until the payment poller confirms the
//! session was paid, so an abandoned payment page keeps the cart intact.

pub mod poller;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use relocal_core::{Address, Cart, DeliveryType};

use crate::api::types::{CheckoutSession, CheckoutSessionRequest, Order, OrderCreate};
use crate::api::{ApiError, UserApi};
use crate::cart_store::CartStoreError;

/// Errors from checkout orchestration.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to buy.
    #[error("Cart is empty")]
    EmptyCart,

    /// A delivery order needs a usable address.
    #[error("Delivery requires a street and city")]
    MissingAddress,

    /// Ship-after-trip needs to know when the trip ends.
    #[error("Ship-after-trip requires a trip end date")]
    MissingTripEndDate,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    CartStore(#[from] CartStoreError),
}

/// What the buyer chose on the checkout page.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutForm {
    pub delivery_type: DeliveryType,
    #[serde(default)]
    pub delivery_address: Option<Address>,
    #[serde(default)]
    pub ship_after_trip: bool,
    #[serde(default)]
    pub trip_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub gift_message: Option<String>,
}

/// Order placed and payment session opened; the browser should be sent
/// to `payment_url`.
#[derive(Debug, Clone)]
pub struct CheckoutStarted {
    pub order: Order,
    pub payment_url: String,
}

/// Backend operations checkout needs.
pub trait OrderGateway {
    async fn create_order(&self, order: &OrderCreate) -> Result<Order, ApiError>;

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ApiError>;
}

impl OrderGateway for UserApi<'_> {
    async fn create_order(&self, order: &OrderCreate) -> Result<Order, ApiError> {
        Self::create_order(self, order).await
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ApiError> {
        Self::create_checkout_session(self, request).await
    }
}

/// Validate the form against the cart and build the order payload.
///
/// Pickup orders carry no address even when one was typed; delivery
/// orders must have one with at least a street and city.
fn build_order(cart: &Cart, form: &CheckoutForm) -> Result<OrderCreate, CheckoutError> {
    let Some(shop_id) = cart.shop_id() else {
        return Err(CheckoutError::EmptyCart);
    };

    let delivery_address = match form.delivery_type {
        DeliveryType::Pickup => None,
        DeliveryType::Delivery => {
            let address = form
                .delivery_address
                .as_ref()
                .filter(|a| a.is_deliverable())
                .ok_or(CheckoutError::MissingAddress)?;
            Some(address.clone())
        }
    };

    // Ship-after-trip needs a date no matter how the order ships.
    if form.ship_after_trip && form.trip_end_date.is_none() {
        return Err(CheckoutError::MissingTripEndDate);
    }
    let ship_after_trip = form.ship_after_trip && form.delivery_type == DeliveryType::Delivery;

    Ok(OrderCreate {
        shop_id: shop_id.clone(),
        items: cart.items().to_vec(),
        delivery_type: form.delivery_type,
        delivery_address,
        ship_after_trip,
        trip_end_date: if ship_after_trip {
            form.trip_end_date
        } else {
            None
        },
        delivery_preference_reason: form.delivery_type.preference_reason(),
        gift_message: form
            .gift_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from),
    })
}

/// Place the order and open its payment session.
///
/// `return_base_url` is the storefront's public base URL; the payment
/// provider redirects back to `{return_base_url}/checkout/success`.
///
/// # Errors
///
/// Returns [`CheckoutError`] if the cart is empty, the form is invalid,
/// or the backend rejects either call.
#[instrument(skip_all, fields(items = cart.item_count()))]
pub async fn start_checkout<G: OrderGateway>(
    gateway: &G,
    cart: &Cart,
    form: &CheckoutForm,
    return_base_url: &str,
) -> Result<CheckoutStarted, CheckoutError> {
    let order_create = build_order(cart, form)?;
    let order = gateway.create_order(&order_create).await?;
    info!(order_id = %order.order_id, total = %order.total, "order placed");

    let session = gateway
        .create_checkout_session(&CheckoutSessionRequest {
            order_id: order.order_id.clone(),
            origin_url: format!("{return_base_url}/checkout/success"),
        })
        .await?;

    Ok(CheckoutStarted {
        order,
        payment_url: session.url,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use relocal_core::{
        CartItem, CheckoutSessionId, CurrencyCode, DeliveryPreferenceReason, OrderId, OrderStatus,
        ProductId, ShopId, UserId,
    };

    use super::*;

    struct ScriptedGateway {
        orders: Mutex<Vec<OrderCreate>>,
        fail_session: bool,
    }

    impl ScriptedGateway {
        fn new() -> Self {
            Self {
                orders: Mutex::new(Vec::new()),
                fail_session: false,
            }
        }

        fn order_from(create: &OrderCreate) -> Order {
            Order {
                order_id: OrderId::new("ord_1"),
                buyer_id: UserId::new("u1"),
                shop_id: create.shop_id.clone(),
                shop_name: "Marrakech Ceramics".to_string(),
                items: create.items.clone(),
                total: create.items.iter().map(CartItem::line_total).sum(),
                currency: CurrencyCode::Usd,
                delivery_type: create.delivery_type,
                status: OrderStatus::Pending,
                delivery_address: create.delivery_address.clone(),
                tracking_id: None,
                ship_after_trip: create.ship_after_trip,
                trip_end_date: create.trip_end_date,
                gift_message: create.gift_message.clone(),
                created_at: Utc::now(),
            }
        }
    }

    impl OrderGateway for ScriptedGateway {
        async fn create_order(&self, order: &OrderCreate) -> Result<Order, ApiError> {
            self.orders.lock().unwrap().push(order.clone());
            Ok(Self::order_from(order))
        }

        async fn create_checkout_session(
            &self,
            request: &CheckoutSessionRequest,
        ) -> Result<CheckoutSession, ApiError> {
            if self.fail_session {
                return Err(ApiError::Api {
                    status: 502,
                    message: "payment provider unavailable".to_string(),
                });
            }
            Ok(CheckoutSession {
                session_id: CheckoutSessionId::new("cs_1"),
                url: format!("https://pay.example/cs_1?return={}", request.origin_url),
            })
        }
    }

    fn cart_with_one_item() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(CartItem {
            product_id: ProductId::new("p1"),
            product_name: "Tagine".to_string(),
            quantity: 2,
            price: Decimal::new(2500, 2),
            shop_id: ShopId::new("s1"),
            shop_name: "Marrakech Ceramics".to_string(),
        })
        .unwrap();
        cart
    }

    fn delivery_address() -> Address {
        Address {
            street: "12 Rue des Artisans".to_string(),
            city: "Marrakech".to_string(),
            state: String::new(),
            country: "MA".to_string(),
            postal_code: "40000".to_string(),
        }
    }

    fn pickup_form() -> CheckoutForm {
        CheckoutForm {
            delivery_type: DeliveryType::Pickup,
            delivery_address: None,
            ship_after_trip: false,
            trip_end_date: None,
            gift_message: None,
        }
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let gateway = ScriptedGateway::new();
        let result = start_checkout(&gateway, &Cart::new(), &pickup_form(), "http://sf").await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(gateway.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_without_address_is_rejected() {
        let gateway = ScriptedGateway::new();
        let form = CheckoutForm {
            delivery_type: DeliveryType::Delivery,
            ..pickup_form()
        };
        let result = start_checkout(&gateway, &cart_with_one_item(), &form, "http://sf").await;
        assert!(matches!(result, Err(CheckoutError::MissingAddress)));
        // Validation failures never reach the network
        assert!(gateway.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_address_is_not_deliverable() {
        let gateway = ScriptedGateway::new();
        let form = CheckoutForm {
            delivery_type: DeliveryType::Delivery,
            delivery_address: Some(Address {
                street: "   ".to_string(),
                city: String::new(),
                state: String::new(),
                country: String::new(),
                postal_code: String::new(),
            }),
            ..pickup_form()
        };
        let result = start_checkout(&gateway, &cart_with_one_item(), &form, "http://sf").await;
        assert!(matches!(result, Err(CheckoutError::MissingAddress)));
    }

    #[tokio::test]
    async fn test_pickup_order_drops_typed_address() {
        let gateway = ScriptedGateway::new();
        let form = CheckoutForm {
            delivery_address: Some(delivery_address()),
            ..pickup_form()
        };

        start_checkout(&gateway, &cart_with_one_item(), &form, "http://sf")
            .await
            .unwrap();

        let orders = gateway.orders.lock().unwrap();
        assert!(orders[0].delivery_address.is_none());
        assert_eq!(
            orders[0].delivery_preference_reason,
            DeliveryPreferenceReason::ImmediatePickup
        );
    }

    #[tokio::test]
    async fn test_delivery_order_carries_reason_and_address() {
        let gateway = ScriptedGateway::new();
        let form = CheckoutForm {
            delivery_type: DeliveryType::Delivery,
            delivery_address: Some(delivery_address()),
            ..pickup_form()
        };

        let started = start_checkout(&gateway, &cart_with_one_item(), &form, "http://sf")
            .await
            .unwrap();
        assert!(started.payment_url.contains("http://sf/checkout/success"));

        let orders = gateway.orders.lock().unwrap();
        assert_eq!(
            orders[0].delivery_preference_reason,
            DeliveryPreferenceReason::TravelLight
        );
        assert!(orders[0].delivery_address.is_some());
    }

    #[tokio::test]
    async fn test_ship_after_trip_requires_end_date() {
        let gateway = ScriptedGateway::new();
        let form = CheckoutForm {
            delivery_type: DeliveryType::Delivery,
            delivery_address: Some(delivery_address()),
            ship_after_trip: true,
            trip_end_date: None,
            gift_message: None,
        };
        let result = start_checkout(&gateway, &cart_with_one_item(), &form, "http://sf").await;
        assert!(matches!(result, Err(CheckoutError::MissingTripEndDate)));
        assert!(gateway.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pickup_ship_after_trip_without_date_is_blocked() {
        let gateway = ScriptedGateway::new();
        let form = CheckoutForm {
            ship_after_trip: true,
            trip_end_date: None,
            ..pickup_form()
        };

        let result = start_checkout(&gateway, &cart_with_one_item(), &form, "http://sf").await;
        assert!(matches!(result, Err(CheckoutError::MissingTripEndDate)));
        // Same as for delivery: rejected before any network call.
        assert!(gateway.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ship_after_trip_is_coerced_off_for_pickup() {
        let gateway = ScriptedGateway::new();
        let form = CheckoutForm {
            ship_after_trip: true,
            trip_end_date: NaiveDate::from_ymd_opt(2026, 9, 14),
            ..pickup_form()
        };

        start_checkout(&gateway, &cart_with_one_item(), &form, "http://sf")
            .await
            .unwrap();
        let orders = gateway.orders.lock().unwrap();
        assert!(!orders[0].ship_after_trip);
        assert!(orders[0].trip_end_date.is_none());
    }

    #[tokio::test]
    async fn test_blank_gift_message_is_dropped() {
        let gateway = ScriptedGateway::new();
        let form = CheckoutForm {
            gift_message: Some("   ".to_string()),
            ..pickup_form()
        };

        start_checkout(&gateway, &cart_with_one_item(), &form, "http://sf")
            .await
            .unwrap();
        assert!(gateway.orders.lock().unwrap()[0].gift_message.is_none());
    }

    #[tokio::test]
    async fn test_session_failure_surfaces_after_order_created() {
        let gateway = ScriptedGateway {
            fail_session: true,
            ..ScriptedGateway::new()
        };

        let result = start_checkout(&gateway, &cart_with_one_item(), &pickup_form(), "http://sf")
            .await;
        assert!(matches!(result, Err(CheckoutError::Api(_))));
        // The order itself was placed; payment can be retried from the
        // orders page.
        assert_eq!(gateway.orders.lock().unwrap().len(), 1);
    }
}
