//! Checkout Services
//!
//! Payment gateway integration for both checkout flows:
//!
//! - **On-site**: the tokenization widget yields a single-use token,
//!   [`PaymentMethodReconciler`] turns it into a chargeable payment method and
//!   [`PaymentLifecycleEngine`] authorizes, captures, voids and refunds.
//! - **Off-site**: [`RedirectRequestBuilder`] sends the shopper to the hosted
//!   payment page and turns the return callback into a completed payment.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = GatewayConfig::from_env()?;
//! config.require_onsite()?;
//! let gateway: Arc<dyn RemoteGateway> = Arc::new(config.gateway()?);
//!
//! let engine = PaymentLifecycleEngine::new(gateway.clone());
//! engine.authorize(&mut payment, &mut payment_method, Some(&owner), false).await?;
//! engine.capture(&mut payment, None).await?;
//! ```

pub mod identity;
pub mod reconciler;
pub mod lifecycle;
pub mod redirect;
pub mod config;
pub mod telemetry;

pub use crate::identity::{CustomerIdentityResolver, PROFILE_PHONE_PLACEHOLDER};
pub use crate::reconciler::PaymentMethodReconciler;
pub use crate::lifecycle::PaymentLifecycleEngine;
pub use crate::redirect::{RedirectRequest, RedirectRequestBuilder, ReturnUrls, DEFAULT_REDIRECT_URL};
pub use crate::config::{ConfigError, GatewayConfig};
pub use crate::telemetry::init_tracing;
