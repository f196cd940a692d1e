//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for shoppers, addresses, tokens and
//! processor callbacks. These fixtures are consistent and predictable.

use std::collections::HashMap;

use core_kernel::{Currency, Money, OwnerId};
use domain_payment::{BillingAddress, Owner};
use gateway_client::{CardRecord, MerchantCredentials};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The order total used by the lifecycle scenarios
    pub fn cad_50() -> Money {
        Money::new(dec!(50.00), Currency::CAD)
    }

    pub fn cad(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::CAD)
    }

    pub fn cad_zero() -> Money {
        Money::zero(Currency::CAD)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_10() -> Money {
        Money::new(dec!(10.00), Currency::USD)
    }

    /// A JPY amount (zero decimal places)
    pub fn jpy_5000() -> Money {
        Money::new(dec!(5000), Currency::JPY)
    }
}

/// Fixture for billing addresses
pub struct AddressFixtures;

impl AddressFixtures {
    /// A complete Canadian address
    pub fn toronto() -> BillingAddress {
        BillingAddress::new("Ada", "Lovelace", "100 King St W", "Toronto", "M5X 1A9", "CA")
            .with_address_line2("Suite 4200")
            .with_administrative_area("ON")
    }

    /// An address with no optional lines
    pub fn minimal() -> BillingAddress {
        BillingAddress::new("Grace", "Hopper", "1 Main St", "Halifax", "B3H 1A1", "CA")
    }
}

/// Fixture for shoppers
pub struct OwnerFixtures;

impl OwnerFixtures {
    /// A logged-in shopper without a remote profile
    pub fn first_time_shopper() -> Owner {
        Owner::authenticated(OwnerId::new(), "ada@example.com")
    }

    /// A logged-in shopper already bound to `profile_id`
    pub fn returning_shopper(profile_id: &str) -> Owner {
        Owner::authenticated(OwnerId::new(), "ada@example.com").with_remote_customer(profile_id)
    }

    pub fn guest() -> Owner {
        Owner::anonymous("guest@example.com")
    }
}

/// Fixture for single-use tokens from the tokenization widget
pub struct TokenFixtures;

impl TokenFixtures {
    pub fn valid() -> &'static str {
        "c01-8f2b7d3e-4a1c-4b9e-9d0f-2e6a5c7b1d30"
    }

    pub fn other() -> &'static str {
        "c01-1a9e0b44-77d2-4f3a-8c51-93b0e2d6f7a8"
    }
}

/// Fixture for merchant credentials
pub struct CredentialFixtures;

impl CredentialFixtures {
    pub const MERCHANT_ID: &'static str = "300200578";
    pub const PAYMENTS_KEY: &'static str = "4BaD82D9197b4cc4b70a221911eE9f70";
    pub const PROFILES_KEY: &'static str = "D97D3BE1EE964A6193D17A571D9FBC80";
    pub const HASH_KEY: &'static str = "hash-key-for-tests";

    pub fn merchant() -> MerchantCredentials {
        MerchantCredentials::new(Self::MERCHANT_ID, Self::PAYMENTS_KEY, Self::PROFILES_KEY)
    }
}

/// Fixture for processor card records
pub struct CardFixtures;

impl CardFixtures {
    pub fn record(card_id: &str, card_type: &str, number: &str) -> CardRecord {
        CardRecord {
            card_id: card_id.to_string(),
            name: "Ada Lovelace".to_string(),
            number: number.to_string(),
            expiry_month: "09".to_string(),
            expiry_year: "29".to_string(),
            card_type: card_type.to_string(),
        }
    }

    pub fn visa(card_id: &str) -> CardRecord {
        Self::record(card_id, "VI", "4030XXXXXXXX3333")
    }

    pub fn mastercard(card_id: &str) -> CardRecord {
        Self::record(card_id, "MC", "5100XXXXXXXX0003")
    }
}

/// Fixture for off-site return callbacks
pub struct CallbackFixtures;

impl CallbackFixtures {
    pub fn approved(transaction_id: &str) -> HashMap<String, String> {
        HashMap::from([
            ("trnApproved".to_string(), "1".to_string()),
            ("trnId".to_string(), transaction_id.to_string()),
            ("messageID".to_string(), "1".to_string()),
            ("messageText".to_string(), "Approved".to_string()),
        ])
    }

    pub fn declined(message_id: &str, message: &str) -> HashMap<String, String> {
        HashMap::from([
            ("trnApproved".to_string(), "0".to_string()),
            ("trnId".to_string(), "10000050".to_string()),
            ("messageID".to_string(), message_id.to_string()),
            ("messageText".to_string(), message.to_string()),
        ])
    }
}
