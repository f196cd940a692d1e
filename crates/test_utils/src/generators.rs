//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating amounts and refund sequences.

use core_kernel::{Currency, Money};
use proptest::prelude::*;

/// Strategy for currencies the processor accepts
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::CAD),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::AUD),
        Just(Currency::JPY),
    ]
}

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000i64
}

/// Strategy for positive CAD amounts
pub fn cad_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::CAD))
}

/// Strategy for positive amounts in any supported currency
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(minor, currency)| Money::from_minor(minor, currency))
}

/// Strategy for a payment total in cents and a sequence of refund requests in cents
///
/// Requests may overshoot the total; tests assert the overshooting ones fail.
pub fn refund_sequence_strategy() -> impl Strategy<Value = (i64, Vec<i64>)> {
    (100i64..1_000_000i64).prop_flat_map(|total| {
        (
            Just(total),
            prop::collection::vec(1i64..=total, 1..8),
        )
    })
}
