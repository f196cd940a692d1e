//! Shopper to remote customer profile mapping

use std::sync::Arc;

use tracing::{info, warn};

use domain_payment::{BillingAddress, Owner, OwnerStore, PaymentError};
use gateway_client::{CreateProfileRequest, ProfileBilling, ProfileToken, RemoteGateway};

/// Prefix of every card verification failure
pub(crate) const VERIFY_CARD_PREFIX: &str = "Unable to verify the credit card: ";

/// The processor requires a phone number on profiles; shoppers are not asked for one
pub const PROFILE_PHONE_PLACEHOLDER: &str = "1234567890";

/// Resolves and creates remote customer profiles for shoppers
///
/// Only authenticated shoppers get a profile. The profile identifier is
/// written back onto the owner record, which is the only place it lives.
pub struct CustomerIdentityResolver {
    gateway: Arc<dyn RemoteGateway>,
    owners: Arc<dyn OwnerStore>,
}

impl CustomerIdentityResolver {
    pub fn new(gateway: Arc<dyn RemoteGateway>, owners: Arc<dyn OwnerStore>) -> Self {
        Self { gateway, owners }
    }

    /// Returns the shopper's remote profile, if one has been bound
    ///
    /// Guests and missing owners always resolve to `None`.
    pub fn resolve(&self, owner: Option<&Owner>) -> Option<String> {
        owner
            .filter(|owner| owner.is_authenticated())
            .and_then(Owner::remote_customer_id)
            .map(str::to_string)
    }

    /// Creates a remote profile holding `token` as its first card and binds it
    /// to `owner`
    ///
    /// Every call creates a new remote profile; callers check [`Self::resolve`]
    /// first.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - the owner is a guest or the billing address is invalid
    /// * `HardDecline` - the processor rejected the token or the billing details
    /// * `Store` - the binding could not be persisted
    pub async fn create_and_bind(
        &self,
        owner: &mut Owner,
        billing_address: &BillingAddress,
        token: &str,
    ) -> Result<String, PaymentError> {
        if !owner.is_authenticated() {
            return Err(PaymentError::InvalidArgument(format!(
                "guest shopper {} cannot own a remote customer profile",
                owner.id
            )));
        }
        billing_address.ensure_valid()?;

        let name = billing_address.full_name();
        let request = CreateProfileRequest {
            billing: ProfileBilling {
                name: name.clone(),
                email_address: owner.email.clone(),
                phone_number: PROFILE_PHONE_PLACEHOLDER.to_string(),
                address_line1: billing_address.address_line1.clone(),
                address_line2: billing_address.address_line2.clone(),
                city: billing_address.locality.clone(),
                province: billing_address.administrative_area.clone(),
                postal_code: billing_address.postal_code.clone(),
                country: billing_address.country_code.clone(),
            },
            token: ProfileToken {
                name,
                code: token.to_string(),
            },
            validate: true,
        };

        let response = self.gateway.create_profile(&request).await.map_err(|e| {
            warn!(owner_id = %owner.id, code = ?e.code(), "Customer profile creation rejected");
            PaymentError::hard_decline(format!("{}{}", VERIFY_CARD_PREFIX, e.message()))
        })?;

        let profile_id = response.customer_code.filter(|code| !code.is_empty()).ok_or_else(|| {
            PaymentError::gateway(
                format!("Processor created a profile without a customer code: {}", response.message),
                Some(response.code.to_string()),
            )
        })?;

        owner.bind_remote_customer(profile_id.clone());
        self.owners.save_owner(owner, None).await?;

        info!(owner_id = %owner.id, profile_id = %profile_id, "Bound remote customer profile");
        Ok(profile_id)
    }
}
