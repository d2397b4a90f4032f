//! User roles.
//!
//! The ReLocal API reports a user's role as a string. Modelling it as a
//! closed enum forces exhaustive handling at every navigation decision
//! point instead of silent string fallthrough.

use serde::{Deserialize, Serialize};

/// The role a user holds in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A traveler browsing and buying from local shops.
    #[default]
    Tourist,
    /// A shop owner managing products and fulfilling orders.
    Shopkeeper,
    /// A platform administrator verifying shops and products.
    Admin,
}

impl Role {
    /// The dashboard route a user of this role lands on.
    ///
    /// Also used as the safe fallback when a user hits a view their role
    /// does not permit.
    #[must_use]
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Self::Tourist => "/dashboard",
            Self::Shopkeeper => "/seller/orders",
            Self::Admin => "/admin/shops/pending",
        }
    }

    /// Whether this role may access shopkeeper views.
    #[must_use]
    pub const fn is_shopkeeper(self) -> bool {
        matches!(self, Self::Shopkeeper)
    }

    /// Whether this role may access admin views.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}
