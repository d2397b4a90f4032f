//! Cart persistence behind the [`CartStore`] trait.
//!
//! The production store keeps the cart in the server-side session, so it
//! survives navigation and sign-in but never leaks across users. Checkout
//! code only sees the trait, which keeps the orchestrator testable with
//! an in-memory double.

use thiserror::Error;
use tower_sessions::Session;

use relocal_core::Cart;

use crate::models::session_keys::CART as CART_KEY;

/// Errors from cart persistence.
#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Where the cart lives between requests.
pub trait CartStore {
    /// Load the current cart, or an empty one if none was saved yet.
    async fn load(&self) -> Result<Cart, CartStoreError>;

    /// Persist the cart.
    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError>;

    /// Drop the cart entirely.
    async fn clear(&self) -> Result<(), CartStoreError>;
}

/// Session-backed cart store.
#[derive(Clone)]
pub struct SessionCartStore {
    session: Session,
}

impl SessionCartStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStore for SessionCartStore {
    async fn load(&self) -> Result<Cart, CartStoreError> {
        Ok(self.session.get::<Cart>(CART_KEY).await?.unwrap_or_default())
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        self.session.insert(CART_KEY, cart).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CartStoreError> {
        self.session.remove::<Cart>(CART_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory cart store for orchestrator and poller tests.

    use std::sync::Mutex;

    use super::{CartStore, CartStoreError};
    use relocal_core::Cart;

    #[derive(Default)]
    pub struct MemoryCartStore {
        cart: Mutex<Cart>,
    }

    impl MemoryCartStore {
        pub fn with_cart(cart: Cart) -> Self {
            Self {
                cart: Mutex::new(cart),
            }
        }

        pub fn snapshot(&self) -> Cart {
            self.cart.lock().unwrap().clone()
        }
    }

    impl CartStore for MemoryCartStore {
        async fn load(&self) -> Result<Cart, CartStoreError> {
            Ok(self.cart.lock().unwrap().clone())
        }

        async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
            *self.cart.lock().unwrap() = cart.clone();
            Ok(())
        }

        async fn clear(&self) -> Result<(), CartStoreError> {
            *self.cart.lock().unwrap() = Cart::default();
            Ok(())
        }
    }
}
