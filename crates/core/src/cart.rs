//! The client-side cart model.
//!
//! A cart is an ephemeral list of line items backing the checkout flow.
//! Checkout attributes the whole order to a single shop, so the cart
//! enforces the single-shop invariant at insertion time: adding an item
//! from a different shop is rejected rather than silently misattributing
//! items to the first item's shop.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProductId, ShopId};

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The cart already holds items from another shop.
    #[error("cart already contains items from shop {expected}, cannot add items from {got}")]
    MixedShopCart { expected: ShopId, got: ShopId },

    /// Line items must have a positive quantity.
    #[error("quantity must be positive")]
    ZeroQuantity,

    /// Prices cannot be negative.
    #[error("price must not be negative")]
    NegativePrice,
}

/// A single cart line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub product_name: String,
    /// Positive integer; enforced by [`Cart::add_item`].
    pub quantity: u32,
    /// Unit price, non-negative.
    pub price: Decimal,
    pub shop_id: ShopId,
    pub shop_name: String,
}

impl CartItem {
    /// Line total (`price × quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An ephemeral single-shop cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from a historical order's line items (reorder).
    ///
    /// Items are taken as-is with their original product, price, and
    /// quantity; the order already satisfied the single-shop invariant.
    #[must_use]
    pub fn from_order_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// The items in the cart, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The shop all items belong to, or `None` for an empty cart.
    #[must_use]
    pub fn shop_id(&self) -> Option<&ShopId> {
        self.items.first().map(|item| &item.shop_id)
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Display total: `Σ(price × quantity)`.
    ///
    /// The authoritative total is computed server-side at order creation;
    /// this value is shown to the user before submission.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add an item, enforcing the single-shop invariant.
    ///
    /// If the product is already in the cart its quantity is increased
    /// instead of adding a duplicate line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MixedShopCart`] when the item's shop differs
    /// from the cart's shop, [`CartError::ZeroQuantity`] for a zero
    /// quantity, and [`CartError::NegativePrice`] for a negative price.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if item.price.is_sign_negative() {
            return Err(CartError::NegativePrice);
        }
        if let Some(shop_id) = self.shop_id()
            && *shop_id != item.shop_id
        {
            return Err(CartError::MixedShopCart {
                expected: shop_id.clone(),
                got: item.shop_id,
            });
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
        Ok(())
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
