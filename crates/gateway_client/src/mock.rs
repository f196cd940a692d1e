//! In-memory processor for testing
//!
//! Records every call, hands out sequential transaction ids and keeps
//! customer profiles with their cards so that attach, charge and detach can
//! be exercised end to end. Failures are scripted per operation.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use core_kernel::DomainPort;

use crate::error::RemoteProcessorError;
use crate::ports::RemoteGateway;
use crate::types::{
    AddCardRequest, AdjustmentRequest, CardRecord, CreateProfileRequest, PaymentRequest,
    PaymentResponse, ProfileResponse,
};

/// Names of the gateway operations, used to script failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    CreatePayment,
    CompletePayment,
    VoidPayment,
    ReturnPayment,
    CreateProfile,
    AddCard,
    GetCards,
    DeleteCard,
}

/// A call received by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    CreatePayment(PaymentRequest),
    CompletePayment {
        transaction_id: String,
        request: AdjustmentRequest,
    },
    VoidPayment {
        transaction_id: String,
        request: AdjustmentRequest,
    },
    ReturnPayment {
        transaction_id: String,
        request: AdjustmentRequest,
    },
    CreateProfile(CreateProfileRequest),
    AddCard {
        profile_id: String,
        request: AddCardRequest,
    },
    GetCards {
        profile_id: String,
    },
    DeleteCard {
        profile_id: String,
        card_id: String,
    },
}

impl RecordedCall {
    pub fn operation(&self) -> GatewayOperation {
        match self {
            RecordedCall::CreatePayment(_) => GatewayOperation::CreatePayment,
            RecordedCall::CompletePayment { .. } => GatewayOperation::CompletePayment,
            RecordedCall::VoidPayment { .. } => GatewayOperation::VoidPayment,
            RecordedCall::ReturnPayment { .. } => GatewayOperation::ReturnPayment,
            RecordedCall::CreateProfile(_) => GatewayOperation::CreateProfile,
            RecordedCall::AddCard { .. } => GatewayOperation::AddCard,
            RecordedCall::GetCards { .. } => GatewayOperation::GetCards,
            RecordedCall::DeleteCard { .. } => GatewayOperation::DeleteCard,
        }
    }
}

/// Brand, masked number and expiry of the next stored card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTemplate {
    pub card_type: String,
    pub number: String,
    pub expiry_month: String,
    pub expiry_year: String,
}

impl Default for CardTemplate {
    fn default() -> Self {
        Self {
            card_type: "VI".to_string(),
            number: "4030XXXXXXXX3333".to_string(),
            expiry_month: "12".to_string(),
            expiry_year: "30".to_string(),
        }
    }
}

#[derive(Debug)]
struct MockState {
    calls: Vec<RecordedCall>,
    failures: HashMap<GatewayOperation, VecDeque<RemoteProcessorError>>,
    profiles: HashMap<String, Vec<CardRecord>>,
    card_templates: VecDeque<CardTemplate>,
    next_transaction_id: u64,
    next_profile_id: u64,
    next_card_id: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            failures: HashMap::new(),
            profiles: HashMap::new(),
            card_templates: VecDeque::new(),
            next_transaction_id: 10_000_001,
            next_profile_id: 1,
            next_card_id: 1,
        }
    }
}

impl MockState {
    fn take_failure(&mut self, operation: GatewayOperation) -> Result<(), RemoteProcessorError> {
        match self.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn transaction(&mut self, message: &str, transaction_type: &str) -> PaymentResponse {
        let id = self.next_transaction_id;
        self.next_transaction_id += 1;
        PaymentResponse {
            id: id.to_string(),
            approved: Some("1".to_string()),
            message: message.to_string(),
            auth_code: Some("TEST".to_string()),
            transaction_type: Some(transaction_type.to_string()),
        }
    }

    fn store_card(&mut self, profile_id: &str, name: &str) {
        let template = self.card_templates.pop_front().unwrap_or_default();
        let card = CardRecord {
            card_id: self.next_card_id.to_string(),
            name: name.to_string(),
            number: template.number,
            expiry_month: template.expiry_month,
            expiry_year: template.expiry_year,
            card_type: template.card_type,
        };
        self.next_card_id += 1;
        self.profiles.entry(profile_id.to_string()).or_default().push(card);
    }
}

fn unknown_profile(profile_id: &str) -> RemoteProcessorError {
    RemoteProcessorError::Rejected {
        code: 19,
        category: 3,
        message: format!("Invalid customer code {}", profile_id),
        http_status: 404,
    }
}

/// In-memory implementation of RemoteGateway
#[derive(Debug, Default, Clone)]
pub struct MockRemoteGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockRemoteGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call of `operation` fail with `error`
    pub async fn fail_next(&self, operation: GatewayOperation, error: RemoteProcessorError) {
        self.state
            .lock()
            .await
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Shapes the next card stored by `create_profile` or `add_card`
    pub async fn queue_card(&self, template: CardTemplate) {
        self.state.lock().await.card_templates.push_back(template);
    }

    /// Pre-populates a profile with cards
    pub async fn seed_profile(&self, profile_id: &str, cards: Vec<CardRecord>) {
        self.state
            .lock()
            .await
            .profiles
            .insert(profile_id.to_string(), cards);
    }

    /// Returns every call received so far
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().await.calls.clone()
    }

    /// Returns how many calls of `operation` were received
    pub async fn call_count(&self, operation: GatewayOperation) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .count()
    }

    pub async fn last_call(&self) -> Option<RecordedCall> {
        self.state.lock().await.calls.last().cloned()
    }

    /// Returns the cards currently stored on a profile
    pub async fn profile_cards(&self, profile_id: &str) -> Vec<CardRecord> {
        self.state
            .lock()
            .await
            .profiles
            .get(profile_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl DomainPort for MockRemoteGateway {}

#[async_trait]
impl RemoteGateway for MockRemoteGateway {
    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::CreatePayment(request.clone()));
        state.take_failure(GatewayOperation::CreatePayment)?;

        let transaction_type = if request.is_complete() { "P" } else { "PA" };
        Ok(state.transaction("Approved", transaction_type))
    }

    async fn complete_payment(
        &self,
        transaction_id: &str,
        request: &AdjustmentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::CompletePayment {
            transaction_id: transaction_id.to_string(),
            request: request.clone(),
        });
        state.take_failure(GatewayOperation::CompletePayment)?;
        Ok(state.transaction("Approved", "PAC"))
    }

    async fn void_payment(
        &self,
        transaction_id: &str,
        request: &AdjustmentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::VoidPayment {
            transaction_id: transaction_id.to_string(),
            request: request.clone(),
        });
        state.take_failure(GatewayOperation::VoidPayment)?;
        Ok(state.transaction("Approved", "VP"))
    }

    async fn return_payment(
        &self,
        transaction_id: &str,
        request: &AdjustmentRequest,
    ) -> Result<PaymentResponse, RemoteProcessorError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::ReturnPayment {
            transaction_id: transaction_id.to_string(),
            request: request.clone(),
        });
        state.take_failure(GatewayOperation::ReturnPayment)?;
        Ok(state.transaction("Approved", "R"))
    }

    async fn create_profile(
        &self,
        request: &CreateProfileRequest,
    ) -> Result<ProfileResponse, RemoteProcessorError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::CreateProfile(request.clone()));
        state.take_failure(GatewayOperation::CreateProfile)?;

        let profile_id = format!("PROFILE{:05}", state.next_profile_id);
        state.next_profile_id += 1;
        state.store_card(&profile_id, &request.token.name);

        Ok(ProfileResponse {
            code: 1,
            message: "Operation Successful".to_string(),
            customer_code: Some(profile_id),
        })
    }

    async fn add_card(
        &self,
        profile_id: &str,
        request: &AddCardRequest,
    ) -> Result<ProfileResponse, RemoteProcessorError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::AddCard {
            profile_id: profile_id.to_string(),
            request: request.clone(),
        });
        state.take_failure(GatewayOperation::AddCard)?;
        if !state.profiles.contains_key(profile_id) {
            return Err(unknown_profile(profile_id));
        }
        state.store_card(profile_id, &request.token.name);

        Ok(ProfileResponse {
            code: 1,
            message: "Operation Successful".to_string(),
            customer_code: Some(profile_id.to_string()),
        })
    }

    async fn get_cards(&self, profile_id: &str) -> Result<Vec<CardRecord>, RemoteProcessorError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::GetCards {
            profile_id: profile_id.to_string(),
        });
        state.take_failure(GatewayOperation::GetCards)?;
        state
            .profiles
            .get(profile_id)
            .cloned()
            .ok_or_else(|| unknown_profile(profile_id))
    }

    async fn delete_card(
        &self,
        profile_id: &str,
        card_id: &str,
    ) -> Result<ProfileResponse, RemoteProcessorError> {
        let mut state = self.state.lock().await;
        state.calls.push(RecordedCall::DeleteCard {
            profile_id: profile_id.to_string(),
            card_id: card_id.to_string(),
        });
        state.take_failure(GatewayOperation::DeleteCard)?;

        let cards = state
            .profiles
            .get_mut(profile_id)
            .ok_or_else(|| unknown_profile(profile_id))?;
        let before = cards.len();
        cards.retain(|card| card.card_id != card_id);
        if cards.len() == before {
            return Err(RemoteProcessorError::Rejected {
                code: 20,
                category: 3,
                message: format!("Invalid card id {}", card_id),
                http_status: 404,
            });
        }

        Ok(ProfileResponse {
            code: 1,
            message: "Operation Successful".to_string(),
            customer_code: Some(profile_id.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProfileToken;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_transaction_ids_are_sequential() {
        let gateway = MockRemoteGateway::new();
        let request = PaymentRequest::profile("1", dec!(10.00), "P", "1", false);

        let first = gateway.create_payment(&request).await.unwrap();
        let second = gateway.create_payment(&request).await.unwrap();

        assert_eq!(first.id, "10000001");
        assert_eq!(second.id, "10000002");
        assert_eq!(first.transaction_type.as_deref(), Some("PA"));
    }

    #[tokio::test]
    async fn test_scripted_failure_is_consumed_once() {
        let gateway = MockRemoteGateway::new();
        gateway
            .fail_next(
                GatewayOperation::VoidPayment,
                RemoteProcessorError::Transport("timeout".to_string()),
            )
            .await;

        let request = AdjustmentRequest::new(dec!(1.00));
        assert!(gateway.void_payment("1", &request).await.is_err());
        assert!(gateway.void_payment("1", &request).await.is_ok());
        assert_eq!(gateway.call_count(GatewayOperation::VoidPayment).await, 2);
    }

    #[tokio::test]
    async fn test_cards_append_to_profile() {
        let gateway = MockRemoteGateway::new();
        gateway.seed_profile("P1", Vec::new()).await;
        gateway
            .queue_card(CardTemplate {
                card_type: "MC".to_string(),
                number: "5100XXXXXXXX0003".to_string(),
                ..CardTemplate::default()
            })
            .await;

        let token = ProfileToken {
            name: "Ada".to_string(),
            code: "tok".to_string(),
        };
        gateway
            .add_card("P1", &AddCardRequest { token: token.clone(), validate: true })
            .await
            .unwrap();
        gateway
            .add_card("P1", &AddCardRequest { token, validate: true })
            .await
            .unwrap();

        let cards = gateway.get_cards("P1").await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].card_type, "MC");
        assert_eq!(cards[1].card_type, "VI");

        gateway.delete_card("P1", &cards[0].card_id).await.unwrap();
        assert_eq!(gateway.profile_cards("P1").await.len(), 1);
        assert!(gateway.delete_card("P1", &cards[0].card_id).await.is_err());
    }
}
