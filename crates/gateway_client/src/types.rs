//! Processor wire types
//!
//! Request and response bodies of the processor's JSON API. Amounts are
//! sent as JSON numbers already rounded to the currency's minor unit.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RemoteProcessorError;

/// How a payment is funded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    PaymentProfile,
    Token,
}

/// A card stored on a customer profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilePayment {
    pub customer_code: String,
    pub card_id: String,
    /// `true` captures immediately, `false` only authorizes
    pub complete: bool,
}

/// A single-use token with the cardholder's name
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct TokenPayment {
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
}

impl fmt::Debug for TokenPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPayment")
            .field("name", &self.name)
            .field("code", &"[REDACTED]")
            .field("complete", &self.complete)
            .finish()
    }
}

/// Body of `POST /payments`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub order_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_method: PaymentMethodKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_profile: Option<ProfilePayment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenPayment>,
}

impl PaymentRequest {
    /// Charges a card stored on a customer profile
    pub fn profile(
        order_number: impl Into<String>,
        amount: Decimal,
        customer_code: impl Into<String>,
        card_id: impl Into<String>,
        complete: bool,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            amount,
            payment_method: PaymentMethodKind::PaymentProfile,
            payment_profile: Some(ProfilePayment {
                customer_code: customer_code.into(),
                card_id: card_id.into(),
                complete,
            }),
            token: None,
        }
    }

    /// Charges a single-use token
    pub fn token(
        order_number: impl Into<String>,
        amount: Decimal,
        code: impl Into<String>,
        name: impl Into<String>,
        complete: bool,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            amount,
            payment_method: PaymentMethodKind::Token,
            payment_profile: None,
            token: Some(TokenPayment {
                name: name.into(),
                code: code.into(),
                complete: Some(complete),
            }),
        }
    }

    pub fn is_complete(&self) -> bool {
        match (&self.payment_profile, &self.token) {
            (Some(profile), _) => profile.complete,
            (None, Some(token)) => token.complete.unwrap_or(true),
            (None, None) => true,
        }
    }
}

/// Body of the completion, void and return calls
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Sent with returns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
}

impl AdjustmentRequest {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            order_number: None,
        }
    }

    pub fn with_order_number(mut self, order_number: impl Into<String>) -> Self {
        self.order_number = Some(order_number.into());
        self
    }
}

/// Answer to any payment call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// Processor transaction id
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub approved: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub auth_code: Option<String>,
    #[serde(rename = "type", default)]
    pub transaction_type: Option<String>,
}

impl PaymentResponse {
    pub fn is_approved(&self) -> bool {
        self.approved.as_deref().map_or(true, |approved| approved == "1")
    }
}

/// Billing block of a new customer profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileBilling {
    pub name: String,
    pub email_address: String,
    pub phone_number: String,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    pub postal_code: String,
    pub country: String,
}

/// A single-use token handed to the profiles API
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ProfileToken {
    pub name: String,
    pub code: String,
}

impl fmt::Debug for ProfileToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileToken")
            .field("name", &self.name)
            .field("code", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /profiles`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateProfileRequest {
    pub billing: ProfileBilling,
    pub token: ProfileToken,
    /// Asks the processor to verify the card before storing it
    pub validate: bool,
}

/// Body of `POST /profiles/{id}/cards`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddCardRequest {
    pub token: ProfileToken,
    pub validate: bool,
}

/// Answer to the profile calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub customer_code: Option<String>,
}

/// A card stored on a customer profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub card_id: String,
    #[serde(default)]
    pub name: String,
    /// Masked card number, e.g. `4030XXXXXXXX3333`
    pub number: String,
    #[serde(deserialize_with = "string_or_number")]
    pub expiry_month: String,
    #[serde(deserialize_with = "string_or_number")]
    pub expiry_year: String,
    /// Two-letter brand code
    pub card_type: String,
}

impl CardRecord {
    /// Parses the expiry fields as `(month, year)`
    pub fn expiry(&self) -> Result<(u32, i32), RemoteProcessorError> {
        let month = self.expiry_month.trim().parse::<u32>().map_err(|_| {
            RemoteProcessorError::Decode(format!("invalid expiry month {:?}", self.expiry_month))
        })?;
        let year = self.expiry_year.trim().parse::<i32>().map_err(|_| {
            RemoteProcessorError::Decode(format!("invalid expiry year {:?}", self.expiry_year))
        })?;
        Ok((month, year))
    }
}

/// Answer to `GET /profiles/{id}/cards`
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CardList {
    #[serde(default)]
    pub card: Vec<CardRecord>,
}

/// Processor error body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub category: i64,
    #[serde(default)]
    pub message: String,
}

/// Returns the card the processor stored most recently
///
/// The processor appends new cards to the end of a profile's card list.
pub fn most_recently_added_card(cards: &[CardRecord]) -> Option<&CardRecord> {
    cards.last()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Integer(i64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Integer(number) => number.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_profile_payment_body() {
        let request = PaymentRequest::profile("1001", dec!(50.00), "CUST1", "2", false);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "order_number": "1001",
                "amount": 50.0,
                "payment_method": "payment_profile",
                "payment_profile": {"customer_code": "CUST1", "card_id": "2", "complete": false}
            })
        );
        assert!(!request.is_complete());
    }

    #[test]
    fn test_token_payment_debug_is_redacted() {
        let request = PaymentRequest::token("1001", dec!(12.34), "tok-secret", "Ada Lovelace", true);
        let debug = format!("{:?}", request);
        assert!(!debug.contains("tok-secret"));
        assert!(debug.contains("Ada Lovelace"));
        assert!(request.is_complete());
    }

    #[test]
    fn test_return_body_carries_order_number() {
        let request = AdjustmentRequest::new(dec!(20.00)).with_order_number("1001");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({"amount": 20.0, "order_number": "1001"}));

        let void = serde_json::to_value(AdjustmentRequest::new(dec!(50.00))).unwrap();
        assert_eq!(void, json!({"amount": 50.0}));
    }

    #[test]
    fn test_card_list_accepts_numeric_ids() {
        let list: CardList = serde_json::from_value(json!({
            "card": [
                {"card_id": 1, "name": "Ada", "number": "4030XXXXXXXX3333",
                 "expiry_month": "09", "expiry_year": "27", "card_type": "VI"},
                {"card_id": "2", "name": "Ada", "number": "5100XXXXXXXX0003",
                 "expiry_month": 1, "expiry_year": 2030, "card_type": "MC"}
            ]
        }))
        .unwrap();

        let newest = most_recently_added_card(&list.card).unwrap();
        assert_eq!(newest.card_id, "2");
        assert_eq!(newest.expiry().unwrap(), (1, 2030));
        assert_eq!(list.card[0].expiry().unwrap(), (9, 27));
    }

    #[test]
    fn test_payment_response_approval() {
        let response: PaymentResponse =
            serde_json::from_value(json!({"id": 10000001, "approved": "1", "message": "Approved"}))
                .unwrap();
        assert_eq!(response.id, "10000001");
        assert!(response.is_approved());

        let declined: PaymentResponse =
            serde_json::from_value(json!({"id": "10000002", "approved": 0})).unwrap();
        assert!(!declined.is_approved());
    }
}
