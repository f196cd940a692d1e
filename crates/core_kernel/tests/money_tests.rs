//! Unit tests for the Money module
//!
//! Tests cover creation, minor-unit rounding, processor formatting,
//! currency handling, and comparisons.

use core_kernel::{Money, Currency, MoneyError};
use rust_decimal_macros::dec;
use std::cmp::Ordering;

mod creation {
    use super::*;

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::CAD);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_from_minor_converts_cents_correctly() {
        let m = Money::from_minor(5000, Currency::CAD);
        assert_eq!(m.amount(), dec!(50.00));
    }

    #[test]
    fn test_from_minor_handles_jpy_no_decimals() {
        let m = Money::from_minor(10000, Currency::JPY);
        assert_eq!(m.amount(), dec!(10000));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::USD);
        assert!(m.is_zero());
        assert!(!m.is_positive());
        assert!(!m.is_negative());
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_round_to_currency_two_places() {
        let m = Money::new(dec!(29.999), Currency::CAD);
        assert_eq!(m.round_to_currency().amount(), dec!(30.00));
    }

    #[test]
    fn test_round_midpoint_goes_away_from_zero() {
        assert_eq!(Money::new(dec!(0.125), Currency::USD).round_to_currency().amount(), dec!(0.13));
        assert_eq!(Money::new(dec!(-0.125), Currency::USD).round_to_currency().amount(), dec!(-0.13));
    }

    #[test]
    fn test_minor_unit_string() {
        assert_eq!(Money::new(dec!(30), Currency::CAD).to_minor_unit_string(), "30.00");
        assert_eq!(Money::new(dec!(10.1), Currency::CAD).to_minor_unit_string(), "10.10");
        assert_eq!(Money::new(dec!(0.004), Currency::CAD).to_minor_unit_string(), "0.00");
        assert_eq!(Money::new(dec!(999.5), Currency::JPY).to_minor_unit_string(), "1000");
    }

    #[test]
    fn test_display_uses_symbol() {
        assert_eq!(Money::new(dec!(50), Currency::CAD).to_string(), "C$ 50.00");
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add_and_sub() {
        let a = Money::new(dec!(30.00), Currency::CAD);
        let b = Money::new(dec!(10.00), Currency::CAD);

        assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(40.00));
        assert_eq!(a.checked_sub(&b).unwrap().amount(), dec!(20.00));
    }

    #[test]
    fn test_checked_cmp() {
        let a = Money::new(dec!(30.00), Currency::CAD);
        let b = Money::new(dec!(30.01), Currency::CAD);

        assert_eq!(a.checked_cmp(&b).unwrap(), Ordering::Less);
        assert_eq!(b.checked_cmp(&a).unwrap(), Ordering::Greater);
        assert_eq!(a.checked_cmp(&a).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_currency_mismatch_is_reported() {
        let cad = Money::new(dec!(1.00), Currency::CAD);
        let usd = Money::new(dec!(1.00), Currency::USD);

        assert_eq!(
            cad.checked_sub(&usd),
            Err(MoneyError::CurrencyMismatch("CAD".to_string(), "USD".to_string()))
        );
    }

    #[test]
    #[should_panic(expected = "Currency mismatch")]
    fn test_operator_add_panics_on_mismatch() {
        let _ = Money::new(dec!(1.00), Currency::CAD) + Money::new(dec!(1.00), Currency::EUR);
    }
}
