//! Payment lifecycle engine
//!
//! Drives `authorize -> capture`, `void` and `refund` against the remote
//! processor. Every precondition is checked before the outbound call, so a
//! rejected operation never has a remote side effect, and local state is only
//! changed after the processor has accepted the operation.
//!
//! The engine mutates the records it is given; persisting them is left to
//! the caller. After a guest charge the caller must also persist the payment
//! method, whose single-use token is now spent.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use core_kernel::Money;
use domain_payment::{
    ChargeTarget, Owner, Payment, PaymentError, PaymentMethod, PaymentState,
    SINGLE_USE_EXPIRED_MESSAGE,
};
use gateway_client::{AdjustmentRequest, PaymentRequest, RemoteGateway, RemoteProcessorError};

const CHARGE_PREFIX: &str = "Could not charge the payment method. Message: ";
const CAPTURE_PREFIX: &str = "Could not capture the payment. Message: ";
const VOID_PREFIX: &str = "Could not void the payment. Message: ";
const REFUND_PREFIX: &str = "Could not refund the payment. Message: ";

/// Applies payment operations through the remote gateway
pub struct PaymentLifecycleEngine {
    gateway: Arc<dyn RemoteGateway>,
}

impl PaymentLifecycleEngine {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self { gateway }
    }

    /// Charges `payment_method` for the payment amount
    ///
    /// With `capture` the payment is completed immediately; otherwise it
    /// becomes an authorization that expires after the authorization window.
    ///
    /// # Errors
    ///
    /// * `InvalidState` - the payment is not `new`
    /// * `HardDecline` - the processor rejected the charge, or a guest's token
    ///   was already used
    pub async fn authorize(
        &self,
        payment: &mut Payment,
        payment_method: &mut PaymentMethod,
        owner: Option<&Owner>,
        capture: bool,
    ) -> Result<(), PaymentError> {
        payment.ensure_state("authorize", &[PaymentState::New])?;
        let target = ChargeTarget::resolve(payment_method, owner)?;

        let amount = payment.amount().round_to_currency();
        let order_number = payment.order_id.to_string();
        let request = match &target {
            ChargeTarget::ProfileCard { profile_id, card_id } => PaymentRequest::profile(
                order_number,
                amount.amount(),
                profile_id.as_str(),
                card_id.as_str(),
                capture,
            ),
            ChargeTarget::SingleUseToken {
                token,
                cardholder_name,
            } => PaymentRequest::token(
                order_number,
                amount.amount(),
                token.as_str(),
                cardholder_name.as_str(),
                capture,
            ),
        };

        let response = self
            .gateway
            .create_payment(&request)
            .await
            .map_err(|e| charge_failed(payment, &target, &e.message(), e.code()))?;
        if !response.is_approved() {
            return Err(charge_failed(payment, &target, &response.message, None));
        }

        if payment.payment_method_id.is_none() {
            payment.payment_method_id = Some(payment_method.id);
        }
        payment.record_charge(response.id, capture, Utc::now())?;
        if target.is_single_use() {
            payment_method.mark_token_consumed();
        }

        info!(
            payment_id = %payment.id,
            order_id = %payment.order_id,
            remote_id = payment.remote_id().unwrap_or_default(),
            state = %payment.state(),
            operation = "authorize",
            "Payment charged"
        );
        Ok(())
    }

    /// Captures an authorization, in full or for a lesser `amount`
    ///
    /// # Errors
    ///
    /// * `InvalidState` - the payment is not an authorization
    /// * `InvalidAmount` - the amount is not positive or exceeds the authorization
    /// * `PaymentGateway` - the processor failed the capture
    pub async fn capture(
        &self,
        payment: &mut Payment,
        amount: Option<Money>,
    ) -> Result<(), PaymentError> {
        payment.ensure_state("capture", &[PaymentState::Authorization])?;
        let amount = amount.unwrap_or_else(|| payment.amount()).round_to_currency();
        payment.check_capture_amount(&amount)?;
        let remote_id = payment.require_remote_id("capture")?.to_string();

        if payment.is_expired(Utc::now()) {
            warn!(payment_id = %payment.id, remote_id = %remote_id, "Capturing an expired authorization");
        }

        self.gateway
            .complete_payment(&remote_id, &AdjustmentRequest::new(amount.amount()))
            .await
            .map_err(|e| gateway_failed(payment, "capture", CAPTURE_PREFIX, e))?;

        payment.record_capture(amount)?;
        info!(
            payment_id = %payment.id,
            remote_id = %remote_id,
            amount = %amount,
            operation = "capture",
            "Payment captured"
        );
        Ok(())
    }

    /// Voids an authorization for its full amount
    ///
    /// # Errors
    ///
    /// * `InvalidState` - the payment is not an authorization
    /// * `PaymentGateway` - the processor failed the void
    pub async fn void(&self, payment: &mut Payment) -> Result<(), PaymentError> {
        payment.ensure_state("void", &[PaymentState::Authorization])?;
        let remote_id = payment.require_remote_id("void")?.to_string();
        let amount = payment.amount().round_to_currency();

        self.gateway
            .void_payment(&remote_id, &AdjustmentRequest::new(amount.amount()))
            .await
            .map_err(|e| gateway_failed(payment, "void", VOID_PREFIX, e))?;

        payment.record_void()?;
        info!(
            payment_id = %payment.id,
            remote_id = %remote_id,
            operation = "void",
            "Authorization voided"
        );
        Ok(())
    }

    /// Refunds `amount`, or the remaining balance when `None`
    ///
    /// # Errors
    ///
    /// * `InvalidState` - the payment has not been completed
    /// * `InvalidAmount` - the amount exceeds the remaining balance; no call is made
    /// * `InvalidRequest` - the processor rejected the refund
    pub async fn refund(
        &self,
        payment: &mut Payment,
        amount: Option<Money>,
    ) -> Result<(), PaymentError> {
        let amount = match amount {
            Some(amount) => amount,
            None => payment.remaining_balance()?,
        }
        .round_to_currency();
        payment.check_refund(&amount)?;
        let remote_id = payment.require_remote_id("refund")?.to_string();

        let request = AdjustmentRequest::new(amount.amount())
            .with_order_number(payment.order_id.to_string());
        self.gateway
            .return_payment(&remote_id, &request)
            .await
            .map_err(|e| {
                warn!(
                    payment_id = %payment.id,
                    remote_id = %remote_id,
                    code = ?e.code(),
                    operation = "refund",
                    "Processor rejected refund"
                );
                PaymentError::InvalidRequest(format!("{}{}", REFUND_PREFIX, e.message()))
            })?;

        payment.record_refund(amount)?;
        info!(
            payment_id = %payment.id,
            remote_id = %remote_id,
            amount = %amount,
            refunded = %payment.refunded_amount(),
            state = %payment.state(),
            operation = "refund",
            "Payment refunded"
        );
        Ok(())
    }
}

fn charge_failed(
    payment: &Payment,
    target: &ChargeTarget,
    message: &str,
    code: Option<String>,
) -> PaymentError {
    warn!(
        payment_id = %payment.id,
        order_id = %payment.order_id,
        code = ?code,
        single_use = target.is_single_use(),
        operation = "authorize",
        "Processor declined charge"
    );
    let error = PaymentError::hard_decline(format!("{}{}", CHARGE_PREFIX, message));
    if target.is_single_use() {
        error.with_user_message(SINGLE_USE_EXPIRED_MESSAGE)
    } else {
        error
    }
}

fn gateway_failed(
    payment: &Payment,
    operation: &'static str,
    prefix: &str,
    error: RemoteProcessorError,
) -> PaymentError {
    warn!(
        payment_id = %payment.id,
        code = ?error.code(),
        operation,
        "Processor rejected operation"
    );
    PaymentError::gateway(format!("{}{}", prefix, error.message()), error.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, OrderId};
    use domain_payment::BillingAddress;
    use gateway_client::{GatewayOperation, MockRemoteGateway, RecordedCall};
    use rust_decimal_macros::dec;

    fn cad(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::CAD)
    }

    fn guest_method() -> PaymentMethod {
        let mut method = PaymentMethod::new(
            None,
            BillingAddress::new("Ada", "Lovelace", "1 Main St", "Toronto", "M5V 2T6", "CA"),
        );
        method.record_single_use_token("tok-guest");
        method
    }

    #[tokio::test]
    async fn test_guest_token_charged_once() {
        let gateway = MockRemoteGateway::new();
        let engine = PaymentLifecycleEngine::new(Arc::new(gateway.clone()));
        let mut method = guest_method();

        let mut first = Payment::new(OrderId::new(1), cad(dec!(10.00)));
        engine.authorize(&mut first, &mut method, None, true).await.unwrap();
        assert_eq!(first.state(), PaymentState::Completed);
        assert!(method.is_token_consumed());

        let mut second = Payment::new(OrderId::new(2), cad(dec!(10.00)));
        let err = engine
            .authorize(&mut second, &mut method, None, true)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::HardDecline { .. }));
        assert_eq!(gateway.call_count(GatewayOperation::CreatePayment).await, 1);
    }

    #[tokio::test]
    async fn test_token_charge_sends_cardholder_name() {
        let gateway = MockRemoteGateway::new();
        let engine = PaymentLifecycleEngine::new(Arc::new(gateway.clone()));
        let mut method = guest_method();
        let mut payment = Payment::new(OrderId::new(77), cad(dec!(12.345)));

        engine.authorize(&mut payment, &mut method, None, false).await.unwrap();

        match gateway.last_call().await {
            Some(RecordedCall::CreatePayment(request)) => {
                assert_eq!(request.order_number, "77");
                assert_eq!(request.amount, dec!(12.35));
                let token = request.token.unwrap();
                assert_eq!(token.name, "Ada Lovelace");
                assert_eq!(token.code, "tok-guest");
                assert_eq!(token.complete, Some(false));
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_void_failure_is_gateway_error() {
        let gateway = MockRemoteGateway::new();
        let engine = PaymentLifecycleEngine::new(Arc::new(gateway.clone()));
        let mut method = guest_method();
        let mut payment = Payment::new(OrderId::new(3), cad(dec!(40.00)));
        engine.authorize(&mut payment, &mut method, None, false).await.unwrap();

        gateway
            .fail_next(
                GatewayOperation::VoidPayment,
                RemoteProcessorError::Rejected {
                    code: 311,
                    category: 2,
                    message: "Transaction cannot be voided".to_string(),
                    http_status: 400,
                },
            )
            .await;

        let err = engine.void(&mut payment).await.unwrap_err();
        match err {
            PaymentError::PaymentGateway { message, code } => {
                assert_eq!(message, "Could not void the payment. Message: Transaction cannot be voided");
                assert_eq!(code.as_deref(), Some("311"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(payment.state(), PaymentState::Authorization);
    }
}
