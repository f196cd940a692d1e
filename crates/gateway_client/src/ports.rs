//! The remote gateway port
//!
//! Services depend on this trait rather than on the HTTP client so that the
//! whole checkout flow can run against [`crate::mock::MockRemoteGateway`].

use async_trait::async_trait;

use core_kernel::DomainPort;

use crate::error::RemoteProcessorError;
use crate::types::{
    AddCardRequest, AdjustmentRequest, CardRecord, CreateProfileRequest, PaymentRequest,
    PaymentResponse, ProfileResponse,
};

/// Operations offered by the remote processor
#[async_trait]
pub trait RemoteGateway: DomainPort {
    /// Authorizes, and optionally captures, a payment
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError>;

    /// Captures a previous authorization
    async fn complete_payment(
        &self,
        transaction_id: &str,
        request: &AdjustmentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError>;

    /// Voids a previous authorization
    async fn void_payment(
        &self,
        transaction_id: &str,
        request: &AdjustmentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError>;

    /// Returns funds of a captured payment
    async fn return_payment(
        &self,
        transaction_id: &str,
        request: &AdjustmentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError>;

    /// Creates a customer profile holding one card
    async fn create_profile(
        &self,
        request: &CreateProfileRequest,
    ) -> Result<ProfileResponse, RemoteProcessorError>;

    /// Adds a card to an existing profile
    async fn add_card(
        &self,
        profile_id: &str,
        request: &AddCardRequest,
    ) -> Result<ProfileResponse, RemoteProcessorError>;

    /// Lists the cards of a profile, oldest first
    async fn get_cards(&self, profile_id: &str) -> Result<Vec<CardRecord>, RemoteProcessorError>;

    /// Removes a card from a profile
    async fn delete_card(
        &self,
        profile_id: &str,
        card_id: &str,
    ) -> Result<ProfileResponse, RemoteProcessorError>;
}
