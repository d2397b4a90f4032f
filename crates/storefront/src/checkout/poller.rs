//! Payment status polling after the provider redirects back.
//!
//! The provider redirect only proves the browser came back, not that the
//! payment settled. The poller asks the backend for the session status a
//! bounded number of times, sleeping between asks, and only a `paid`
//! status clears the cart. Time and transport are injected so tests run
//! without a clock or a network.

use std::time::Duration;

use tracing::{info, instrument, warn};

use relocal_core::CheckoutSessionId;

use crate::api::types::CheckoutStatus;
use crate::api::{ApiError, UserApi};
use crate::cart_store::{CartStore, CartStoreError};

/// How many status requests one redirect is worth. Sleeps happen only
/// between requests, so the worst case is 4 sleeps.
pub const MAX_POLL_ATTEMPTS: u32 = 5;

/// Pause between consecutive status requests.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How one round of polling ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Payment settled; the cart has been cleared.
    Paid(CheckoutStatus),
    /// The payment session expired before it was paid.
    Expired,
    /// A status request failed outright. Treated as a payment failure;
    /// the cart is kept so the buyer can try again.
    Failed,
    /// Still pending after the attempt budget ran out. The cart is kept;
    /// the backend will finish the order via its own webhook.
    StillPending,
}

/// Backend status lookups the poller needs.
pub trait StatusGateway {
    async fn checkout_status(
        &self,
        session_id: &CheckoutSessionId,
    ) -> Result<CheckoutStatus, ApiError>;
}

impl StatusGateway for UserApi<'_> {
    async fn checkout_status(
        &self,
        session_id: &CheckoutSessionId,
    ) -> Result<CheckoutStatus, ApiError> {
        Self::checkout_status(self, session_id).await
    }
}

/// Pause between polling attempts.
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

/// Real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Errors from a polling round.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    CartStore(#[from] CartStoreError),
}

/// Poll a payment session until it resolves or the budget runs out.
///
/// Clears the cart exactly once, and only on a `paid` status. A failed
/// status request ends the round as [`PollOutcome::Failed`] without
/// retrying.
///
/// # Errors
///
/// Returns [`PollError`] when the cart cannot be cleared after a
/// confirmed payment.
#[instrument(skip(gateway, sleeper, cart_store), fields(%session_id))]
pub async fn poll_payment<G, S, C>(
    gateway: &G,
    sleeper: &S,
    cart_store: &C,
    session_id: &CheckoutSessionId,
) -> Result<PollOutcome, PollError>
where
    G: StatusGateway,
    S: Sleeper,
    C: CartStore,
{
    for attempt in 1..=MAX_POLL_ATTEMPTS {
        let status = match gateway.checkout_status(session_id).await {
            Ok(status) => status,
            Err(error) => {
                warn!(attempt, %error, "status request failed");
                return Ok(PollOutcome::Failed);
            }
        };

        if status.payment_status.is_paid() {
            info!(attempt, "payment confirmed");
            cart_store.clear().await?;
            return Ok(PollOutcome::Paid(status));
        }
        if status.status.is_expired() {
            warn!(attempt, "payment session expired");
            return Ok(PollOutcome::Expired);
        }

        if attempt < MAX_POLL_ATTEMPTS {
            sleeper.sleep(POLL_INTERVAL).await;
        }
    }

    warn!(attempts = MAX_POLL_ATTEMPTS, "payment still pending");
    Ok(PollOutcome::StillPending)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use rust_decimal::Decimal;

    use relocal_core::{
        Cart, CartItem, CurrencyCode, PaymentStatus, ProductId, SessionStatus, ShopId,
    };

    use super::*;
    use crate::cart_store::test_support::MemoryCartStore;

    /// Replays a fixed sequence of status responses.
    struct ScriptedStatuses {
        responses: Mutex<Vec<Result<CheckoutStatus, ApiError>>>,
        calls: AtomicU32,
    }

    impl ScriptedStatuses {
        fn new(responses: Vec<Result<CheckoutStatus, ApiError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl StatusGateway for ScriptedStatuses {
        async fn checkout_status(
            &self,
            _session_id: &CheckoutSessionId,
        ) -> Result<CheckoutStatus, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(pending());
            }
            responses.remove(0)
        }
    }

    /// Records sleeps instead of waiting.
    #[derive(Default)]
    struct RecordingSleeper {
        sleeps: AtomicU32,
    }

    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            assert_eq!(duration, POLL_INTERVAL);
            self.sleeps.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn status(session: SessionStatus, payment: PaymentStatus) -> CheckoutStatus {
        CheckoutStatus {
            status: session,
            payment_status: payment,
            amount_total: Some(Decimal::new(5000, 2)),
            currency: Some(CurrencyCode::Usd),
        }
    }

    fn pending() -> CheckoutStatus {
        status(SessionStatus::Open, PaymentStatus::Pending)
    }

    fn paid() -> CheckoutStatus {
        status(SessionStatus::Complete, PaymentStatus::Paid)
    }

    fn cart_store_with_item() -> MemoryCartStore {
        let mut cart = Cart::new();
        cart.add_item(CartItem {
            product_id: ProductId::new("p1"),
            product_name: "Tagine".to_string(),
            quantity: 1,
            price: Decimal::new(5000, 2),
            shop_id: ShopId::new("s1"),
            shop_name: "Marrakech Ceramics".to_string(),
        })
        .unwrap();
        MemoryCartStore::with_cart(cart)
    }

    #[tokio::test]
    async fn test_paid_on_first_attempt_clears_cart_without_sleeping() {
        let gateway = ScriptedStatuses::new(vec![Ok(paid())]);
        let sleeper = RecordingSleeper::default();
        let store = cart_store_with_item();

        let session_id = CheckoutSessionId::new("cs_1");
        let outcome = poll_payment(&gateway, &sleeper, &store, &session_id)
            .await
            .unwrap();

        assert!(matches!(outcome, PollOutcome::Paid(_)));
        assert_eq!(gateway.calls(), 1);
        assert_eq!(sleeper.sleeps.load(Ordering::SeqCst), 0);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_paid_on_third_attempt_sleeps_twice() {
        let gateway =
            ScriptedStatuses::new(vec![Ok(pending()), Ok(pending()), Ok(paid())]);
        let sleeper = RecordingSleeper::default();
        let store = cart_store_with_item();

        let session_id = CheckoutSessionId::new("cs_1");
        let outcome = poll_payment(&gateway, &sleeper, &store, &session_id)
            .await
            .unwrap();

        assert!(matches!(outcome, PollOutcome::Paid(_)));
        assert_eq!(gateway.calls(), 3);
        assert_eq!(sleeper.sleeps.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_paid_on_final_attempt_still_succeeds() {
        let gateway = ScriptedStatuses::new(vec![
            Ok(pending()),
            Ok(pending()),
            Ok(pending()),
            Ok(pending()),
            Ok(paid()),
        ]);
        let sleeper = RecordingSleeper::default();
        let store = cart_store_with_item();

        let session_id = CheckoutSessionId::new("cs_1");
        let outcome = poll_payment(&gateway, &sleeper, &store, &session_id)
            .await
            .unwrap();

        assert!(matches!(outcome, PollOutcome::Paid(_)));
        assert_eq!(gateway.calls(), 5);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_pending_forever_stops_after_budget_and_keeps_cart() {
        let gateway = ScriptedStatuses::new(Vec::new());
        let sleeper = RecordingSleeper::default();
        let store = cart_store_with_item();

        let session_id = CheckoutSessionId::new("cs_1");
        let outcome = poll_payment(&gateway, &sleeper, &store, &session_id)
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::StillPending);
        assert_eq!(gateway.calls(), MAX_POLL_ATTEMPTS);
        // No sleep after the final attempt.
        assert_eq!(sleeper.sleeps.load(Ordering::SeqCst), MAX_POLL_ATTEMPTS - 1);
        assert!(!store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_expired_session_stops_early_and_keeps_cart() {
        let gateway = ScriptedStatuses::new(vec![
            Ok(pending()),
            Ok(status(SessionStatus::Expired, PaymentStatus::Expired)),
        ]);
        let sleeper = RecordingSleeper::default();
        let store = cart_store_with_item();

        let session_id = CheckoutSessionId::new("cs_1");
        let outcome = poll_payment(&gateway, &sleeper, &store, &session_id)
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::Expired);
        assert_eq!(gateway.calls(), 2);
        assert!(!store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_status_request_failure_is_a_failed_payment() {
        let gateway = ScriptedStatuses::new(vec![
            Ok(pending()),
            Err(ApiError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            }),
        ]);
        let sleeper = RecordingSleeper::default();
        let store = cart_store_with_item();

        let session_id = CheckoutSessionId::new("cs_1");
        let outcome = poll_payment(&gateway, &sleeper, &store, &session_id)
            .await
            .unwrap();

        // No retry after the failure, and the cart survives.
        assert_eq!(outcome, PollOutcome::Failed);
        assert_eq!(gateway.calls(), 2);
        assert_eq!(sleeper.sleeps.load(Ordering::SeqCst), 1);
        assert!(!store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_payment_status_counts_as_pending() {
        let gateway = ScriptedStatuses::new(vec![
            Ok(status(SessionStatus::Unknown, PaymentStatus::Unknown)),
            Ok(paid()),
        ]);
        let sleeper = RecordingSleeper::default();
        let store = cart_store_with_item();

        let session_id = CheckoutSessionId::new("cs_1");
        let outcome = poll_payment(&gateway, &sleeper, &store, &session_id)
            .await
            .unwrap();

        assert!(matches!(outcome, PollOutcome::Paid(_)));
        assert!(store.snapshot().is_empty());
    }
}
