//! Billing address types

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::PaymentError;

/// Billing address collected alongside the card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BillingAddress {
    #[validate(length(min = 1))]
    pub given_name: String,
    #[validate(length(min = 1))]
    pub family_name: String,
    #[validate(length(min = 1))]
    pub address_line1: String,
    pub address_line2: Option<String>,
    /// City
    #[validate(length(min = 1))]
    pub locality: String,
    /// Province or state code
    pub administrative_area: Option<String>,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2
    #[validate(length(equal = 2))]
    pub country_code: String,
}

impl BillingAddress {
    /// Creates a new address
    pub fn new(
        given_name: impl Into<String>,
        family_name: impl Into<String>,
        address_line1: impl Into<String>,
        locality: impl Into<String>,
        postal_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            address_line1: address_line1.into(),
            address_line2: None,
            locality: locality.into(),
            administrative_area: None,
            postal_code: postal_code.into(),
            country_code: country_code.into(),
        }
    }

    pub fn with_address_line2(mut self, line2: impl Into<String>) -> Self {
        self.address_line2 = Some(line2.into());
        self
    }

    pub fn with_administrative_area(mut self, area: impl Into<String>) -> Self {
        self.administrative_area = Some(area.into());
        self
    }

    /// Checks the address before it is sent to the processor
    pub fn ensure_valid(&self) -> Result<(), PaymentError> {
        self.validate()
            .map_err(|e| PaymentError::InvalidArgument(format!("invalid billing address: {}", e)))
    }

    /// Card holder name as sent to the processor
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}
