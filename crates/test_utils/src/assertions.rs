//! Custom Test Assertions
//!
//! Provides assertion helpers for payments that give more meaningful error
//! messages than standard assertions.

use core_kernel::Money;
use domain_payment::{Payment, PaymentError, PaymentState};

/// Asserts that two Money values are equal in amount and currency
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts the payment's state, showing the whole payment on failure
pub fn assert_payment_state(payment: &Payment, expected: PaymentState) {
    assert_eq!(
        payment.state(),
        expected,
        "Unexpected payment state for {}: {:?}",
        payment.id,
        payment
    );
}

/// Asserts the refund invariant `refunded_amount <= amount`
pub fn assert_refund_invariant(payment: &Payment) {
    let refunded = payment.refunded_amount();
    let amount = payment.amount();
    assert!(
        refunded.amount() <= amount.amount(),
        "Refunded {} exceeds payment amount {} for {}",
        refunded,
        amount,
        payment.id
    );
}

/// Asserts that an error was raised locally, before any remote call
pub fn assert_local_failure(error: &PaymentError) {
    assert!(
        error.is_local(),
        "Expected a local precondition failure, got: {:?}",
        error
    );
}
