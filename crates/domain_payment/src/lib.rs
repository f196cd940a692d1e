//! Payment Domain
//!
//! Local records of the gateway integration: payments and their lifecycle
//! state, shoppers' card references, and the errors every service reports.
//!
//! # Payment Lifecycle
//!
//! ```text
//! new -> authorization -> completed -> partially_refunded -> refunded
//!              |
//!              v
//!      authorization_voided
//! ```
//!
//! # Identity Model
//!
//! - **Authenticated shoppers** own a remote customer profile; their payment
//!   methods point at cards stored on it and can be charged repeatedly.
//! - **Guests** never get a profile; their payment method holds the
//!   single-use token and can be charged exactly once.

pub mod payment;
pub mod payment_method;
pub mod owner;
pub mod address;
pub mod charge_target;
pub mod ports;
pub mod error;

pub use payment::{Payment, PaymentState, AUTHORIZATION_EXPIRATION_SECS, authorization_window};
pub use payment_method::{PaymentMethod, CardType, CardDetails, card_expiration};
pub use owner::Owner;
pub use address::BillingAddress;
pub use charge_target::{ChargeTarget, SINGLE_USE_EXPIRED_MESSAGE};
pub use ports::{OwnerStore, PaymentMethodStore};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockOwnerStore, MockPaymentMethodStore};
pub use error::{PaymentError, GENERIC_DECLINE_MESSAGE};
