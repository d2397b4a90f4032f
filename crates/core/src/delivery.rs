//! Delivery method and preference types.

use serde::{Deserialize, Serialize};

/// How an order is fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    /// Collect in person from the shop.
    #[default]
    Pickup,
    /// Ship to a delivery address.
    Delivery,
}

impl DeliveryType {
    /// The analytics tag submitted with an order explaining why this
    /// method was chosen. The client itself never reads it back.
    #[must_use]
    pub const fn preference_reason(self) -> DeliveryPreferenceReason {
        match self {
            Self::Pickup => DeliveryPreferenceReason::ImmediatePickup,
            Self::Delivery => DeliveryPreferenceReason::TravelLight,
        }
    }

    /// Default delivery method given the user's travel-mode preference.
    ///
    /// Travel Mode biases toward shipping so travelers keep luggage
    /// light; with it off the default is picking the item up in person.
    #[must_use]
    pub const fn default_for_travel_mode(travel_mode: bool) -> Self {
        if travel_mode { Self::Delivery } else { Self::Pickup }
    }
}

/// Hint tag for downstream analytics describing the delivery choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPreferenceReason {
    /// The buyer chose delivery to avoid carrying the purchase.
    TravelLight,
    /// The buyer chose to pick the purchase up immediately.
    ImmediatePickup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_reason_mapping() {
        assert_eq!(
            DeliveryType::Delivery.preference_reason(),
            DeliveryPreferenceReason::TravelLight
        );
        assert_eq!(
            DeliveryType::Pickup.preference_reason(),
            DeliveryPreferenceReason::ImmediatePickup
        );
    }

    #[test]
    fn test_travel_mode_biases_default() {
        assert_eq!(
            DeliveryType::default_for_travel_mode(true),
            DeliveryType::Delivery
        );
        assert_eq!(
            DeliveryType::default_for_travel_mode(false),
            DeliveryType::Pickup
        );
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&DeliveryPreferenceReason::TravelLight).expect("serialize"),
            "\"travel_light\""
        );
        assert_eq!(
            serde_json::to_string(&DeliveryType::Pickup).expect("serialize"),
            "\"pickup\""
        );
    }
}
