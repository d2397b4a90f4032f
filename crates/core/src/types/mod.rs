//! Core type definitions.

pub mod address;
pub mod id;
pub mod price;
pub mod role;
pub mod status;

pub use address::Address;
pub use id::{CategoryId, CheckoutSessionId, OrderId, ProductId, QrCodeId, ShopId, UserId};
pub use price::{CurrencyCode, Price};
pub use role::Role;
pub use status::{OrderStatus, PaymentStatus, SessionStatus};
