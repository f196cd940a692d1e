//! Payment domain errors
//!
//! The variants follow how the failure must be handled by the caller:
//! hard declines go back to the shopper, gateway failures go to an operator,
//! and local precondition failures never reach the network.

use core_kernel::{MoneyError, PortError};
use thiserror::Error;

use crate::payment::PaymentState;

/// Message shown to shoppers when no more specific one is available
pub const GENERIC_DECLINE_MESSAGE: &str =
    "We encountered an error processing your payment method. Please verify your details and try again.";

/// Errors that can occur in the payment domain
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The processor rejected the charge or the token; fatal, never retried
    #[error("{message}")]
    HardDecline {
        message: String,
        /// Shopper-facing explanation, when it differs from the diagnostic message
        user_message: Option<String>,
    },

    /// Unexpected processor failure during capture, void or off-site approval
    #[error("{message}")]
    PaymentGateway {
        message: String,
        code: Option<String>,
    },

    /// Refund or card deletion rejected by the processor
    #[error("{0}")]
    InvalidRequest(String),

    /// Local amount precondition violated; no network call was made
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The processor returned a card brand outside the known table
    #[error("Unsupported credit card type \"{0}\".")]
    UnsupportedCardType(String),

    /// The payment is not in a state that allows the operation
    #[error("Cannot {operation} a payment in state \"{state}\"")]
    InvalidState {
        operation: &'static str,
        state: PaymentState,
    },

    /// Caller supplied malformed input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl PaymentError {
    pub fn hard_decline(message: impl Into<String>) -> Self {
        PaymentError::HardDecline {
            message: message.into(),
            user_message: None,
        }
    }

    pub fn gateway(message: impl Into<String>, code: Option<String>) -> Self {
        PaymentError::PaymentGateway {
            message: message.into(),
            code,
        }
    }

    pub fn invalid_amount(message: impl Into<String>) -> Self {
        PaymentError::InvalidAmount(message.into())
    }

    /// Attaches a shopper-facing message to a hard decline
    pub fn with_user_message(self, user_message: impl Into<String>) -> Self {
        match self {
            PaymentError::HardDecline { message, .. } => PaymentError::HardDecline {
                message,
                user_message: Some(user_message.into()),
            },
            other => other,
        }
    }

    /// Returns the message that may be displayed to the shopper
    pub fn user_message(&self) -> &str {
        match self {
            PaymentError::HardDecline {
                user_message: Some(message),
                ..
            } => message,
            _ => GENERIC_DECLINE_MESSAGE,
        }
    }

    /// Returns true if an operator may reasonably retry the operation
    ///
    /// Hard declines require the shopper to re-tokenize; local precondition
    /// failures will fail again identically.
    pub fn is_operator_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::PaymentGateway { .. } | PaymentError::Store(_)
        )
    }

    /// Returns true if the error was raised before any remote call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            PaymentError::InvalidAmount(_)
                | PaymentError::InvalidState { .. }
                | PaymentError::InvalidArgument(_)
                | PaymentError::Money(_)
        )
    }
}
