//! Core Kernel - Foundational types for the payment gateway integration
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money types with precise decimal arithmetic and minor-unit rounding
//! - Strongly-typed identifiers for orders, payments, payment methods and shoppers
//! - Port infrastructure for the persistence collaborators

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{OrderId, PaymentId, PaymentMethodId, OwnerId};
pub use ports::{PortError, DomainPort, OperationMetadata};
