//! Payment method reconciliation
//!
//! Turns a single-use token from the tokenization widget into something the
//! lifecycle engine can charge:
//!
//! - guests keep the raw token, chargeable once, and nothing is sent remotely
//! - authenticated shoppers get the card stored on their remote profile,
//!   creating the profile on first use

use std::sync::Arc;

use tracing::{debug, info, warn};

use domain_payment::{CardDetails, Owner, PaymentError, PaymentMethod, PaymentMethodStore};
use gateway_client::{
    most_recently_added_card, AddCardRequest, ProfileToken, RemoteGateway, RemoteProcessorError,
};

use crate::identity::{CustomerIdentityResolver, VERIFY_CARD_PREFIX};

const DELETE_PREFIX: &str = "Could not delete the payment method. Message: ";

/// Binds tokens to payment methods and removes stored cards
pub struct PaymentMethodReconciler {
    gateway: Arc<dyn RemoteGateway>,
    identity: CustomerIdentityResolver,
    payment_methods: Arc<dyn PaymentMethodStore>,
}

impl PaymentMethodReconciler {
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        identity: CustomerIdentityResolver,
        payment_methods: Arc<dyn PaymentMethodStore>,
    ) -> Self {
        Self {
            gateway,
            identity,
            payment_methods,
        }
    }

    pub fn identity(&self) -> &CustomerIdentityResolver {
        &self.identity
    }

    /// Attaches `token` to `payment_method` and saves it
    ///
    /// For authenticated shoppers the processor does not say which card it
    /// just stored, so the profile's card list is fetched and the most recently
    /// added card is taken.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - the token is empty or the billing address is invalid
    /// * `HardDecline` - the processor refused the card
    /// * `UnsupportedCardType` - the stored card's brand is unknown
    pub async fn attach_card(
        &self,
        payment_method: &mut PaymentMethod,
        token: &str,
        owner: Option<&mut Owner>,
    ) -> Result<(), PaymentError> {
        if token.trim().is_empty() {
            return Err(PaymentError::InvalidArgument(
                "a single-use token is required to attach a card".to_string(),
            ));
        }
        payment_method.billing_address.ensure_valid()?;

        let owner = match owner {
            Some(owner) if owner.is_authenticated() => owner,
            _ => {
                payment_method.record_single_use_token(token);
                self.payment_methods.save_payment_method(payment_method, None).await?;
                debug!(payment_method_id = %payment_method.id, "Stored single-use token for guest");
                return Ok(());
            }
        };

        let billing_address = payment_method.billing_address.clone();
        let profile_id = match self.identity.resolve(Some(&*owner)) {
            Some(profile_id) => {
                let request = AddCardRequest {
                    token: ProfileToken {
                        name: billing_address.full_name(),
                        code: token.to_string(),
                    },
                    validate: true,
                };
                self.gateway
                    .add_card(&profile_id, &request)
                    .await
                    .map_err(|e| verification_failed(&profile_id, e))?;
                profile_id
            }
            None => {
                self.identity
                    .create_and_bind(owner, &billing_address, token)
                    .await?
            }
        };

        let cards = self
            .gateway
            .get_cards(&profile_id)
            .await
            .map_err(|e| verification_failed(&profile_id, e))?;
        let card = most_recently_added_card(&cards).ok_or_else(|| {
            PaymentError::gateway(
                format!("Profile {} has no stored cards after adding one", profile_id),
                None,
            )
        })?;

        let (month, year) = card
            .expiry()
            .map_err(|e| PaymentError::gateway(e.message(), None))?;
        let details = CardDetails::from_processor(&card.card_type, &card.number, month, year)?;
        let card_type = details.card_type;
        payment_method.record_profile_card(card.card_id.clone(), details)?;
        self.payment_methods.save_payment_method(payment_method, None).await?;

        info!(
            payment_method_id = %payment_method.id,
            owner_id = %owner.id,
            profile_id = %profile_id,
            card_id = %card.card_id,
            card_type = %card_type,
            "Attached card to customer profile"
        );
        Ok(())
    }

    /// Deletes `payment_method`, removing its remote card first when it has one
    ///
    /// The local record is kept when the remote deletion fails, so a stored
    /// card is never left without a local reference.
    pub async fn detach_card(
        &self,
        payment_method: &PaymentMethod,
        owner: Option<&Owner>,
    ) -> Result<(), PaymentError> {
        let owner = owner.filter(|owner| owner.is_authenticated());

        if let (Some(owner), true) = (owner, payment_method.is_reusable()) {
            let profile_id = self.identity.resolve(Some(owner)).ok_or_else(|| {
                PaymentError::InvalidRequest(format!(
                    "{}shopper {} has no remote customer profile",
                    DELETE_PREFIX, owner.id
                ))
            })?;
            let card_id = payment_method.remote_id().ok_or_else(|| {
                PaymentError::InvalidRequest(format!(
                    "{}payment method {} has no remote card",
                    DELETE_PREFIX, payment_method.id
                ))
            })?;

            self.gateway
                .delete_card(&profile_id, card_id)
                .await
                .map_err(|e| {
                    warn!(
                        payment_method_id = %payment_method.id,
                        profile_id = %profile_id,
                        code = ?e.code(),
                        "Remote card deletion failed"
                    );
                    PaymentError::InvalidRequest(format!("{}{}", DELETE_PREFIX, e.message()))
                })?;
        }

        self.payment_methods
            .delete_payment_method(payment_method.id, None)
            .await?;

        info!(payment_method_id = %payment_method.id, "Deleted payment method");
        Ok(())
    }
}

fn verification_failed(profile_id: &str, error: RemoteProcessorError) -> PaymentError {
    warn!(profile_id = %profile_id, code = ?error.code(), "Card verification failed");
    PaymentError::hard_decline(format!("{}{}", VERIFY_CARD_PREFIX, error.message()))
}
