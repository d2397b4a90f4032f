//! Luggage weight and baggage-fee savings estimation.
//!
//! A pure, informational computation shown before checkout to bias the
//! buyer toward delivery over carrying items: sum the estimated weight of
//! the cart and multiply by a flat illustrative per-kg baggage rate. It
//! has no effect on pricing or order correctness.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::types::ProductId;

/// Flat illustrative baggage fee per kilogram, in the cart's currency.
/// Not a real carrier rate.
#[must_use]
pub fn baggage_fee_per_kg() -> Decimal {
    Decimal::new(10, 0)
}

/// Default estimated weight when a product carries no weight metadata.
#[must_use]
pub fn default_weight_kg() -> Decimal {
    Decimal::new(5, 1) // 0.5 kg
}

/// Per-product weight metadata, as reported by the product catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightMetadata {
    /// Estimated weight in kilograms. Defaults to 0.5 when the shopkeeper
    /// never entered one.
    #[serde(default = "default_weight_kg")]
    pub estimated_weight_kg: Decimal,
    #[serde(default)]
    pub is_fragile: bool,
    #[serde(default)]
    pub is_liquid: bool,
}

impl Default for WeightMetadata {
    fn default() -> Self {
        Self {
            estimated_weight_kg: default_weight_kg(),
            is_fragile: false,
            is_liquid: false,
        }
    }
}

/// The derived, non-authoritative savings estimate for a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LuggageEstimate {
    /// Total weight the buyer avoids carrying (`Σ weight × quantity`).
    pub total_weight_kg: Decimal,
    /// `total_weight_kg ×` [`baggage_fee_per_kg`].
    pub estimated_fee_saved: Decimal,
    /// Units flagged fragile across the cart.
    pub fragile_items: u32,
    /// Units flagged liquid across the cart.
    pub liquid_items: u32,
}

/// Estimate the luggage savings for a cart.
///
/// `weights` maps product IDs to their weight metadata. An item whose
/// product is missing from the map (e.g., the product lookup failed) is
/// simply omitted from the totals - a soft failure, never retried here.
#[must_use]
pub fn estimate_savings(
    items: &[CartItem],
    weights: &HashMap<ProductId, WeightMetadata>,
) -> LuggageEstimate {
    let mut estimate = LuggageEstimate::default();

    for item in items {
        let Some(metadata) = weights.get(&item.product_id) else {
            continue;
        };
        let quantity = Decimal::from(item.quantity);
        estimate.total_weight_kg += metadata.estimated_weight_kg * quantity;
        if metadata.is_fragile {
            estimate.fragile_items += item.quantity;
        }
        if metadata.is_liquid {
            estimate.liquid_items += item.quantity;
        }
    }

    estimate.estimated_fee_saved = estimate.total_weight_kg * baggage_fee_per_kg();
    estimate
}
