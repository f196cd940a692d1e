//! Remote Processor Client
//!
//! Thin client for the processor's JSON API. It knows about passcodes, URL
//! layout and wire formats; it knows nothing about local payment state.
//!
//! # Scopes
//!
//! | Operation                          | Key      |
//! |------------------------------------|----------|
//! | create / complete / void / return  | payments |
//! | profiles and profile cards         | profiles |

pub mod credentials;
pub mod error;
pub mod types;
pub mod ports;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use credentials::{ApiScope, MerchantCredentials};
pub use error::RemoteProcessorError;
pub use types::{
    most_recently_added_card, AddCardRequest, AdjustmentRequest, CardList, CardRecord,
    CreateProfileRequest, PaymentMethodKind, PaymentRequest, PaymentResponse, ProfileBilling,
    ProfilePayment, ProfileResponse, ProfileToken, TokenPayment,
};
pub use ports::RemoteGateway;
pub use http::{BamboraGateway, DEFAULT_API_BASE_URL};
#[cfg(any(test, feature = "mock"))]
pub use mock::{CardTemplate, GatewayOperation, MockRemoteGateway, RecordedCall};
