//! Status enums for orders and payment sessions.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders are created `pending`, move to `confirmed` once payment
/// settles, and are advanced by the shopkeeper from there. The client
/// never sets these directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// Payment status reported by the external payment provider.
///
/// The provider owns this state; the client only polls it. `Unknown`
/// absorbs provider statuses we do not model so a new value never fails
/// deserialization mid-poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Expired,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// True only for a settled payment; `Unknown` is treated as not paid.
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Paid)
    }
}

/// Checkout session status reported alongside [`PaymentStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Open,
    Complete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl SessionStatus {
    #[must_use]
    pub const fn is_expired(self) -> bool {
        matches!(self, Self::Expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Shipped).expect("serialize"),
            "\"shipped\""
        );
        let status: OrderStatus = serde_json::from_str("\"confirmed\"").expect("deserialize");
        assert_eq!(status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_payment_status_unknown_absorbs_new_values() {
        let status: PaymentStatus =
            serde_json::from_str("\"requires_action\"").expect("deserialize");
        assert_eq!(status, PaymentStatus::Unknown);
    }

    #[test]
    fn test_session_status_expired() {
        let status: SessionStatus = serde_json::from_str("\"expired\"").expect("deserialize");
        assert_eq!(status, SessionStatus::Expired);
    }
}
