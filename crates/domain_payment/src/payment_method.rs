//! Stored and single-use card references
//!
//! A payment method belonging to an authenticated shopper points at a card
//! stored on the shopper's remote customer profile and can be charged
//! repeatedly. An anonymous shopper's payment method only holds the
//! single-use token produced by the tokenization widget, so it can be
//! charged once.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{OwnerId, PaymentMethodId};

use crate::address::BillingAddress;
use crate::error::PaymentError;

/// Card brands accepted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Amex,
    DinersClub,
    Jcb,
    Mastercard,
    Discover,
    Visa,
}

impl CardType {
    /// Every brand, in processor-code order
    pub const ALL: [CardType; 6] = [
        CardType::Amex,
        CardType::DinersClub,
        CardType::Jcb,
        CardType::Mastercard,
        CardType::Discover,
        CardType::Visa,
    ];

    /// Maps the processor's two-letter brand code
    pub fn from_processor_code(code: &str) -> Result<Self, PaymentError> {
        match code {
            "AM" => Ok(CardType::Amex),
            "DI" => Ok(CardType::DinersClub),
            "JB" => Ok(CardType::Jcb),
            "MC" => Ok(CardType::Mastercard),
            "NN" => Ok(CardType::Discover),
            "VI" => Ok(CardType::Visa),
            other => Err(PaymentError::UnsupportedCardType(other.to_string())),
        }
    }

    pub fn processor_code(&self) -> &'static str {
        match self {
            CardType::Amex => "AM",
            CardType::DinersClub => "DI",
            CardType::Jcb => "JB",
            CardType::Mastercard => "MC",
            CardType::Discover => "NN",
            CardType::Visa => "VI",
        }
    }

    /// Returns the storefront's machine name for the brand
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Amex => "amex",
            CardType::DinersClub => "dinersclub",
            CardType::Jcb => "jcb",
            CardType::Mastercard => "mastercard",
            CardType::Discover => "discover",
            CardType::Visa => "visa",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the last instant of the card's expiry month
///
/// Two-digit years are read as 20xx, which is how the processor reports them.
pub fn card_expiration(month: u32, year: i32) -> Result<DateTime<Utc>, PaymentError> {
    if !(1..=12).contains(&month) {
        return Err(PaymentError::InvalidArgument(format!(
            "invalid card expiry month {}",
            month
        )));
    }

    let year = if (0..100).contains(&year) { year + 2000 } else { year };
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };

    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            PaymentError::InvalidArgument(format!("invalid card expiry {}/{}", month, year))
        })?;

    Ok(Utc.from_utc_datetime(&first_of_next) - Duration::seconds(1))
}

/// Display details of a stored card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub card_type: CardType,
    pub last_four: String,
    pub exp_month: u32,
    pub exp_year: i32,
}

impl CardDetails {
    /// Builds details from the processor's card record fields
    ///
    /// `masked_number` is the processor's masked PAN, e.g. `"4030XXXXXXXX3333"`.
    pub fn from_processor(
        brand_code: &str,
        masked_number: &str,
        exp_month: u32,
        exp_year: i32,
    ) -> Result<Self, PaymentError> {
        let card_type = CardType::from_processor_code(brand_code)?;
        let chars: Vec<char> = masked_number.chars().collect();
        let last_four: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        let exp_year = if (0..100).contains(&exp_year) { exp_year + 2000 } else { exp_year };

        Ok(Self {
            card_type,
            last_four,
            exp_month,
            exp_year,
        })
    }

    pub fn expires_at(&self) -> Result<DateTime<Utc>, PaymentError> {
        card_expiration(self.exp_month, self.exp_year)
    }
}

/// A shopper's card reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Unique identifier
    pub id: PaymentMethodId,
    owner_id: Option<OwnerId>,
    /// Billing details collected with the card
    pub billing_address: BillingAddress,
    remote_id: Option<String>,
    card: Option<CardDetails>,
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    token_consumed: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl PaymentMethod {
    /// Creates an unattached payment method; `owner_id` is `None` for anonymous shoppers
    pub fn new(owner_id: Option<OwnerId>, billing_address: BillingAddress) -> Self {
        Self {
            id: PaymentMethodId::new_v7(),
            owner_id,
            billing_address,
            remote_id: None,
            card: None,
            expires_at: None,
            token_consumed: false,
            created_at: Utc::now(),
        }
    }

    pub fn owner_id(&self) -> Option<OwnerId> {
        self.owner_id
    }

    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    pub fn card(&self) -> Option<&CardDetails> {
        self.card.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns true once the method references something chargeable
    pub fn is_attached(&self) -> bool {
        self.remote_id.is_some()
    }

    /// Stored profile cards can be charged again; single-use tokens cannot
    pub fn is_reusable(&self) -> bool {
        self.owner_id.is_some() && self.card.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires) if expires <= now)
    }

    /// Returns true once a single-use token has been charged
    pub fn is_token_consumed(&self) -> bool {
        self.token_consumed
    }

    /// Stores the raw single-use token as the remote reference
    pub fn record_single_use_token(&mut self, token: impl Into<String>) {
        self.remote_id = Some(token.into());
        self.token_consumed = false;
    }

    /// Marks the single-use token as spent after a successful charge
    pub fn mark_token_consumed(&mut self) {
        self.token_consumed = true;
    }

    /// Stores a card bound to a remote customer profile
    pub fn record_profile_card(
        &mut self,
        card_id: impl Into<String>,
        details: CardDetails,
    ) -> Result<(), PaymentError> {
        self.expires_at = Some(details.expires_at()?);
        self.remote_id = Some(card_id.into());
        self.card = Some(details);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_brand_table_is_total() {
        for card_type in CardType::ALL {
            let code = card_type.processor_code();
            assert_eq!(CardType::from_processor_code(code).unwrap(), card_type);
        }
    }

    #[test]
    fn test_unknown_brand_rejected() {
        let err = CardType::from_processor_code("XX").unwrap_err();
        assert!(matches!(err, PaymentError::UnsupportedCardType(code) if code == "XX"));
        assert!(CardType::from_processor_code("vi").is_err());
    }

    #[test]
    fn test_expiration_is_last_second_of_month() {
        let expires = card_expiration(2, 2028).unwrap();
        assert_eq!((expires.year(), expires.month(), expires.day()), (2028, 2, 29));
        assert_eq!((expires.hour(), expires.minute(), expires.second()), (23, 59, 59));
    }

    #[test]
    fn test_expiration_december_rolls_year() {
        let expires = card_expiration(12, 27).unwrap();
        assert_eq!((expires.year(), expires.month(), expires.day()), (2027, 12, 31));
    }

    #[test]
    fn test_expiration_invalid_month() {
        assert!(card_expiration(13, 2027).is_err());
        assert!(card_expiration(0, 2027).is_err());
    }

    #[test]
    fn test_card_details_last_four() {
        let details = CardDetails::from_processor("VI", "4030XXXXXXXX3333", 9, 29).unwrap();
        assert_eq!(details.card_type, CardType::Visa);
        assert_eq!(details.last_four, "3333");
        assert_eq!(details.exp_year, 2029);
    }
}
