//! What a charge is made against
//!
//! Authenticated shoppers are charged through a card stored on their remote
//! customer profile; guests are charged with the single-use token. The
//! decision is made once here so the lifecycle engine never has to look at
//! the shopper again.

use std::fmt;

use crate::error::PaymentError;
use crate::owner::Owner;
use crate::payment_method::PaymentMethod;

/// Shown to a guest whose single-use token can no longer be charged
pub const SINGLE_USE_EXPIRED_MESSAGE: &str =
    "We encountered an error processing your payment method. We use a secure, single-use \
     authorization that is temporary and it might have already expired. Please try adding \
     your payment details again using the \"New credit card\" option.";

/// The remote source of funds for one charge
#[derive(Clone, PartialEq, Eq)]
pub enum ChargeTarget {
    /// A card stored on an authenticated shopper's remote profile
    ProfileCard {
        profile_id: String,
        card_id: String,
    },
    /// A guest's single-use token, chargeable once
    SingleUseToken {
        token: String,
        cardholder_name: String,
    },
}

impl ChargeTarget {
    /// Resolves the target for `payment_method`
    ///
    /// `owner` is the payment method's owner, or `None` for a guest checkout.
    /// A stored profile card is only charged for its own authenticated owner,
    /// and a single-use token only without one; a mismatch is `InvalidArgument`.
    pub fn resolve(
        payment_method: &PaymentMethod,
        owner: Option<&Owner>,
    ) -> Result<Self, PaymentError> {
        let remote_id = payment_method.remote_id().ok_or_else(|| {
            PaymentError::InvalidArgument(format!(
                "payment method {} has not been attached to the gateway",
                payment_method.id
            ))
        })?;

        match owner.filter(|owner| owner.is_authenticated()) {
            Some(owner) => {
                let profile_id = owner.remote_customer_id().ok_or_else(|| {
                    PaymentError::InvalidRequest(format!(
                        "shopper {} has no remote customer profile",
                        owner.id
                    ))
                })?;
                if payment_method.owner_id() != Some(owner.id) {
                    return Err(PaymentError::InvalidArgument(format!(
                        "payment method {} does not belong to shopper {}",
                        payment_method.id, owner.id
                    )));
                }
                if !payment_method.is_reusable() {
                    return Err(PaymentError::InvalidArgument(format!(
                        "payment method {} holds no stored profile card",
                        payment_method.id
                    )));
                }
                Ok(ChargeTarget::ProfileCard {
                    profile_id: profile_id.to_string(),
                    card_id: remote_id.to_string(),
                })
            }
            None => {
                if payment_method.is_reusable() {
                    return Err(PaymentError::InvalidArgument(format!(
                        "payment method {} is a stored profile card and needs its authenticated owner",
                        payment_method.id
                    )));
                }
                if payment_method.is_token_consumed() {
                    return Err(PaymentError::hard_decline(format!(
                        "Single-use token for payment method {} was already charged",
                        payment_method.id
                    ))
                    .with_user_message(SINGLE_USE_EXPIRED_MESSAGE));
                }
                Ok(ChargeTarget::SingleUseToken {
                    token: remote_id.to_string(),
                    cardholder_name: payment_method.billing_address.full_name(),
                })
            }
        }
    }

    pub fn is_single_use(&self) -> bool {
        matches!(self, ChargeTarget::SingleUseToken { .. })
    }
}

impl fmt::Debug for ChargeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChargeTarget::ProfileCard { profile_id, card_id } => f
                .debug_struct("ProfileCard")
                .field("profile_id", profile_id)
                .field("card_id", card_id)
                .finish(),
            ChargeTarget::SingleUseToken { .. } => f
                .debug_struct("SingleUseToken")
                .field("token", &"[REDACTED]")
                .finish_non_exhaustive(),
        }
    }
}
