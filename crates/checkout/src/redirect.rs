//! Off-site checkout
//!
//! The shopper is sent to the processor's hosted payment page with a GET
//! request carrying the order and billing details, and comes back to one of
//! two merchant pages with the outcome in the query string.
//!
//! The signature only proves the request came from this merchant: it is a
//! SHA-1 over `merchant_id=<id><hash key>` and does not cover the payload.
//! The return callback is not signed and is trusted as received.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use sha1::{Digest, Sha1};
use tracing::{info, warn};
use url::Url;

use core_kernel::{Money, OrderId};
use domain_payment::{BillingAddress, Payment, PaymentError};

/// Hosted payment page
pub const DEFAULT_REDIRECT_URL: &str = "https://web.na.bambora.com/scripts/payment/payment.asp";

/// Where the processor sends the shopper back to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnUrls {
    pub approved_page: String,
    pub declined_page: String,
}

impl ReturnUrls {
    pub fn new(approved_page: impl Into<String>, declined_page: impl Into<String>) -> Self {
        Self {
            approved_page: approved_page.into(),
            declined_page: declined_page.into(),
        }
    }
}

/// A signed redirect to the hosted payment page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRequest {
    pub redirect_url: String,
    /// Query fields in the order the processor documents them
    pub fields: Vec<(&'static str, String)>,
}

impl RedirectRequest {
    /// Returns the value of a field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Builds the GET URL the shopper is redirected to
    pub fn to_url(&self) -> Result<Url, PaymentError> {
        let mut url = Url::parse(&self.redirect_url).map_err(|e| {
            PaymentError::InvalidArgument(format!("invalid redirect url {}: {}", self.redirect_url, e))
        })?;
        url.query_pairs_mut()
            .extend_pairs(self.fields.iter().map(|(key, value)| (*key, value.as_str())));
        Ok(url)
    }
}

/// Builds signed redirects and interprets return callbacks
pub struct RedirectRequestBuilder {
    merchant_id: String,
    hash_key: SecretString,
    redirect_url: String,
}

impl RedirectRequestBuilder {
    pub fn new(
        merchant_id: impl Into<String>,
        hash_key: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            hash_key: SecretString::new(hash_key.into().into()),
            redirect_url: redirect_url.into(),
        }
    }

    /// Returns the `hashValue` field: hex SHA-1 of `merchant_id=<id><hash key>`
    pub fn hash_value(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update(b"merchant_id=");
        hasher.update(self.merchant_id.as_bytes());
        hasher.update(self.hash_key.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Assembles the redirect for `payment`
    ///
    /// `capture` selects an immediate purchase (`P`) over an authorization
    /// only (`PA`).
    pub fn build_signed_request(
        &self,
        payment: &Payment,
        billing_address: &BillingAddress,
        email: &str,
        urls: &ReturnUrls,
        capture: bool,
    ) -> RedirectRequest {
        let name = billing_address.full_name();
        let transaction_type = if capture { "P" } else { "PA" };

        let fields = vec![
            ("merchant_id", self.merchant_id.clone()),
            ("hashValue", self.hash_value()),
            ("trnAmount", payment.amount().to_minor_unit_string()),
            ("trnOrderNumber", payment.order_id.to_string()),
            ("trnType", transaction_type.to_string()),
            ("trnCardOwner", name.clone()),
            ("ordName", name),
            ("ordEmailAddress", email.to_string()),
            ("ordAddress1", billing_address.address_line1.clone()),
            ("ordAddress2", billing_address.address_line2.clone().unwrap_or_default()),
            ("ordCity", billing_address.locality.clone()),
            ("ordProvince", billing_address.administrative_area.clone().unwrap_or_default()),
            ("ordPostalCode", billing_address.postal_code.clone()),
            ("ordCountry", billing_address.country_code.clone()),
            ("approvedPage", urls.approved_page.clone()),
            ("declinedPage", urls.declined_page.clone()),
        ];

        info!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            transaction_type,
            "Built off-site redirect"
        );

        RedirectRequest {
            redirect_url: self.redirect_url.clone(),
            fields,
        }
    }

    /// Interprets the return callback for `order_id`
    ///
    /// Only a non-zero integer `trnApproved` counts as an approval; anything
    /// else, including a missing flag, is a decline.
    ///
    /// An approved callback yields a completed payment for `order_total`,
    /// referencing the processor transaction in `trnId`. No confirmation call
    /// is made to the processor.
    ///
    /// # Errors
    ///
    /// `PaymentGateway` with the processor's `messageText` and `messageID` when
    /// the payment was declined, or when an approval carries no transaction id.
    pub fn handle_return(
        &self,
        order_id: OrderId,
        order_total: Money,
        query: &HashMap<String, String>,
    ) -> Result<Payment, PaymentError> {
        let approved = query
            .get("trnApproved")
            .map(|value| value.trim())
            .unwrap_or_default();

        if !is_approval_flag(approved) {
            let message = query.get("messageText").cloned().unwrap_or_default();
            let code = query.get("messageID").cloned();
            warn!(order_id = %order_id, code = ?code, "Off-site payment declined");
            return Err(PaymentError::gateway(message, code));
        }

        let remote_id = query
            .get("trnId")
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                PaymentError::gateway(
                    format!("Approved return for order {} has no transaction id", order_id),
                    query.get("messageID").cloned(),
                )
            })?;

        let payment = Payment::completed_offsite(
            order_id,
            order_total.round_to_currency(),
            remote_id,
            approved,
        );
        info!(
            payment_id = %payment.id,
            order_id = %order_id,
            remote_id,
            "Off-site payment completed"
        );
        Ok(payment)
    }
}

fn is_approval_flag(value: &str) -> bool {
    value.parse::<i64>().map_or(false, |flag| flag != 0)
}
