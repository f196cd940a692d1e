//! Payment aggregate
//!
//! A payment is one money movement attempt against an order. Its state only
//! moves forward:
//!
//! ```text
//! new ──► authorization ──► completed ──► partially_refunded ──► refunded
//!  │            │               ▲  │                                ▲
//!  │            ▼               │  └────────────────────────────────┘
//!  │   authorization_voided     │
//!  └────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! - `refunded_amount <= amount` at all times
//! - both amounts are held at the currency's minor-unit precision
//! - `remote_id` never changes once set
//! - `expires_at` is only set while an authorization is uncaptured

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use core_kernel::{Money, OrderId, PaymentId, PaymentMethodId};

use crate::error::PaymentError;

/// Seconds after which an uncaptured authorization expires (29 days)
pub const AUTHORIZATION_EXPIRATION_SECS: i64 = 2_505_600;

/// Returns the fixed authorization window
pub fn authorization_window() -> Duration {
    Duration::seconds(AUTHORIZATION_EXPIRATION_SECS)
}

/// Payment lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Created locally, no remote call yet
    New,
    /// Funds reserved on the card, not captured
    Authorization,
    /// Reservation released
    AuthorizationVoided,
    /// Funds settled
    Completed,
    /// Some but not all of the settled amount returned
    PartiallyRefunded,
    /// Full settled amount returned
    Refunded,
}

impl PaymentState {
    /// Returns the machine name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::New => "new",
            PaymentState::Authorization => "authorization",
            PaymentState::AuthorizationVoided => "authorization_voided",
            PaymentState::Completed => "completed",
            PaymentState::PartiallyRefunded => "partially_refunded",
            PaymentState::Refunded => "refunded",
        }
    }

    /// Checks if the state machine allows moving to `target`
    pub fn can_transition_to(&self, target: PaymentState) -> bool {
        use PaymentState::*;
        matches!(
            (*self, target),
            (New, Authorization)
                | (New, Completed)
                | (Authorization, Completed)
                | (Authorization, AuthorizationVoided)
                | (Completed, PartiallyRefunded)
                | (Completed, Refunded)
                | (PartiallyRefunded, PartiallyRefunded)
                | (PartiallyRefunded, Refunded)
        )
    }

    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentState::AuthorizationVoided | PaymentState::Refunded)
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment against an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Order being paid
    pub order_id: OrderId,
    /// Card used for on-site payments; absent for off-site payments
    pub payment_method_id: Option<PaymentMethodId>,
    amount: Money,
    refunded_amount: Money,
    state: PaymentState,
    remote_id: Option<String>,
    remote_state: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a payment in state `new`
    ///
    /// The amount is rounded to the currency's minor unit, the precision the
    /// processor charges and refunds in.
    pub fn new(order_id: OrderId, amount: Money) -> Self {
        let now = Utc::now();
        let amount = amount.round_to_currency();

        Self {
            id: PaymentId::new_v7(),
            order_id,
            payment_method_id: None,
            amount,
            refunded_amount: Money::zero(amount.currency()),
            state: PaymentState::New,
            remote_id: None,
            remote_state: None,
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the payment method to charge
    pub fn with_payment_method(mut self, payment_method_id: PaymentMethodId) -> Self {
        self.payment_method_id = Some(payment_method_id);
        self
    }

    /// Creates an already completed payment from an approved off-site return
    ///
    /// The processor charged the card while the shopper was on its hosted
    /// page, so no local transition from `new` is recorded.
    pub fn completed_offsite(
        order_id: OrderId,
        amount: Money,
        remote_id: impl Into<String>,
        remote_state: impl Into<String>,
    ) -> Self {
        let mut payment = Self::new(order_id, amount);
        payment.state = PaymentState::Completed;
        payment.remote_id = Some(remote_id.into());
        payment.remote_state = Some(remote_state.into());
        payment
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn refunded_amount(&self) -> Money {
        self.refunded_amount
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    pub fn remote_state(&self) -> Option<&str> {
        self.remote_state.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns the amount that can still be refunded
    pub fn remaining_balance(&self) -> Result<Money, PaymentError> {
        Ok(self.amount.checked_sub(&self.refunded_amount)?)
    }

    /// Returns true if an uncaptured authorization has passed its window
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires) if expires <= now)
    }

    /// Fails with `InvalidState` unless the payment is in one of `allowed`
    pub fn ensure_state(
        &self,
        operation: &'static str,
        allowed: &[PaymentState],
    ) -> Result<(), PaymentError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(PaymentError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Returns the remote reference, required by every follow-up operation
    pub fn require_remote_id(&self, operation: &'static str) -> Result<&str, PaymentError> {
        self.remote_id.as_deref().ok_or_else(|| {
            PaymentError::InvalidArgument(format!(
                "payment {} has no remote id; cannot {}",
                self.id, operation
            ))
        })
    }

    /// Validates a capture amount against the authorized amount
    pub fn check_capture_amount(&self, amount: &Money) -> Result<(), PaymentError> {
        let amount = &amount.round_to_currency();
        if !amount.is_positive() {
            return Err(PaymentError::invalid_amount(format!(
                "capture amount {} must be positive",
                amount
            )));
        }
        if amount.checked_cmp(&self.amount)? == Ordering::Greater {
            return Err(PaymentError::invalid_amount(format!(
                "cannot capture {} on an authorization of {}",
                amount, self.amount
            )));
        }
        Ok(())
    }

    /// Validates the state and amount of a refund before it is sent
    ///
    /// A fully refunded payment has no balance left, so any further refund is
    /// reported as an amount violation rather than a state violation.
    pub fn check_refund(&self, amount: &Money) -> Result<(), PaymentError> {
        if self.state == PaymentState::Refunded {
            return Err(PaymentError::invalid_amount(format!(
                "payment {} has already been fully refunded",
                self.id
            )));
        }
        self.ensure_state(
            "refund",
            &[PaymentState::Completed, PaymentState::PartiallyRefunded],
        )?;
        self.check_refund_amount(amount)
    }

    /// Validates that refunding `amount` keeps `refunded_amount <= amount`
    pub fn check_refund_amount(&self, amount: &Money) -> Result<(), PaymentError> {
        let amount = &amount.round_to_currency();
        if !amount.is_positive() {
            return Err(PaymentError::invalid_amount(format!(
                "refund amount {} must be positive",
                amount
            )));
        }
        let balance = self.remaining_balance()?;
        if amount.checked_cmp(&balance)? == Ordering::Greater {
            return Err(PaymentError::invalid_amount(format!(
                "cannot refund more than {}",
                balance
            )));
        }
        Ok(())
    }

    /// Records the processor's reference; it may be set only once
    pub fn set_remote_id(&mut self, remote_id: impl Into<String>) -> Result<(), PaymentError> {
        let remote_id = remote_id.into();
        match &self.remote_id {
            Some(existing) if *existing != remote_id => Err(PaymentError::InvalidArgument(format!(
                "payment {} already has remote id {}",
                self.id, existing
            ))),
            _ => {
                self.remote_id = Some(remote_id);
                Ok(())
            }
        }
    }

    /// Records a successful remote charge
    ///
    /// Without capture the payment becomes an authorization that expires
    /// after [`AUTHORIZATION_EXPIRATION_SECS`].
    pub fn record_charge(
        &mut self,
        remote_id: impl Into<String>,
        capture: bool,
        now: DateTime<Utc>,
    ) -> Result<(), PaymentError> {
        self.ensure_state("authorize", &[PaymentState::New])?;
        self.set_remote_id(remote_id)?;

        if capture {
            self.transition(PaymentState::Completed);
        } else {
            self.expires_at = Some(now + authorization_window());
            self.transition(PaymentState::Authorization);
        }
        Ok(())
    }

    /// Records a successful capture for `amount`
    pub fn record_capture(&mut self, amount: Money) -> Result<(), PaymentError> {
        self.ensure_state("capture", &[PaymentState::Authorization])?;
        self.check_capture_amount(&amount)?;

        self.amount = amount.round_to_currency();
        self.expires_at = None;
        self.transition(PaymentState::Completed);
        Ok(())
    }

    /// Records a successful void
    pub fn record_void(&mut self) -> Result<(), PaymentError> {
        self.ensure_state("void", &[PaymentState::Authorization])?;

        self.expires_at = None;
        self.transition(PaymentState::AuthorizationVoided);
        Ok(())
    }

    /// Records a successful refund of `amount`
    pub fn record_refund(&mut self, amount: Money) -> Result<(), PaymentError> {
        self.check_refund(&amount)?;
        let amount = amount.round_to_currency();

        let refunded = self.refunded_amount.checked_add(&amount)?;
        let next = if refunded.checked_cmp(&self.amount)? == Ordering::Less {
            PaymentState::PartiallyRefunded
        } else {
            PaymentState::Refunded
        };

        self.refunded_amount = refunded;
        self.transition(next);
        Ok(())
    }

    fn transition(&mut self, next: PaymentState) {
        debug_assert!(self.state.can_transition_to(next));
        tracing::debug!(
            payment_id = %self.id,
            from = %self.state,
            to = %next,
            "Payment state transition"
        );
        self.state = next;
        self.updated_at = Utc::now();
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use core_kernel::Currency;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn refunded_never_exceeds_amount(
            total in 1i64..1_000_000i64,
            refunds in proptest::collection::vec(1i64..500_000i64, 1..10)
        ) {
            let mut payment = Payment::new(OrderId::new(9), Money::from_minor(total, Currency::CAD));
            payment.record_charge("42", true, Utc::now()).unwrap();

            for minor in refunds {
                let before = payment.clone();
                let amount = Money::from_minor(minor, Currency::CAD);
                if payment.record_refund(amount).is_err() {
                    prop_assert_eq!(&payment, &before);
                }
                prop_assert!(
                    payment.refunded_amount().checked_cmp(&payment.amount()).unwrap() != Ordering::Greater
                );
            }
        }
    }
}
