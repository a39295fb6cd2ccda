//! Property-based tests for the amount codec
//!
//! Verifies the codec invariants over randomly generated inputs: conversion
//! between decimal text and minor units must be lossless within a currency's
//! precision, and inputs that exceed it must always be refused.

use proptest::prelude::*;
use trade_ledger_client::amount::{Currency, MinorUnits, from_minor_units, to_minor_units};
use trade_ledger_client::error::ClientError;

// PROPERTY TEST STRATEGIES

/// Strategy to generate random Currency values
fn currency_strategy() -> impl Strategy<Value = Currency> {
    (0u8..=3).prop_map(|i| match i {
        0 => Currency::USD,
        1 => Currency::GBP,
        2 => Currency::EUR,
        _ => Currency::JPY,
    })
}

/// Strategy to generate minor-unit values across the interesting range,
/// including values far beyond u64
fn minor_units_strategy() -> impl Strategy<Value = u128> {
    prop_oneof![
        0u128..=1_000_000u128,
        (0u64..=u64::MAX).prop_map(|v| v as u128),
        (0u64..=u64::MAX).prop_map(|v| (v as u128) << 32),
    ]
}

/// Strategy to generate decimal text with more fractional digits than the
/// currency supports
fn excess_precision_strategy() -> impl Strategy<Value = (String, Currency)> {
    (currency_strategy(), 0u64..=1_000_000u64, 1u8..=6).prop_map(|(currency, whole, extra)| {
        let digits = currency.decimals() as usize + extra as usize;
        // All-nines fraction so trailing zeros can't mask the overflow.
        let fraction = "9".repeat(digits);
        (format!("{whole}.{fraction}"), currency)
    })
}

// PROPERTY TESTS
proptest! {
    /// Property: rendering minor units and parsing the result is lossless.
    ///
    /// `to_minor_units(from_minor_units(x)) == x` must hold for every value,
    /// in every currency, which is the round-trip invariant the ledger
    /// boundary relies on.
    #[test]
    fn prop_minor_units_roundtrip(
        units in minor_units_strategy(),
        currency in currency_strategy()
    ) {
        let text = from_minor_units(MinorUnits::new(units), currency);
        let reparsed = to_minor_units(&text, currency).unwrap();

        prop_assert_eq!(reparsed, MinorUnits::new(units), "text was {}", text);
    }

    /// Property: canonical text survives a full parse/render cycle verbatim.
    #[test]
    fn prop_canonical_text_is_stable(
        units in minor_units_strategy(),
        currency in currency_strategy()
    ) {
        let text = from_minor_units(MinorUnits::new(units), currency);
        let again = from_minor_units(to_minor_units(&text, currency).unwrap(), currency);

        prop_assert_eq!(text, again);
    }

    /// Property: any input with more fractional digits than the currency
    /// supports fails with Precision, never rounds, never parses.
    #[test]
    fn prop_excess_precision_always_fails(
        (text, currency) in excess_precision_strategy()
    ) {
        let err = to_minor_units(&text, currency).unwrap_err();

        prop_assert!(
            matches!(err, ClientError::Precision { .. }),
            "expected Precision for {} at {} decimals, got {:?}",
            text, currency.decimals(), err
        );
    }

    /// Property: parsing arbitrary text never panics, and whatever parses
    /// renders back to the same minor units.
    #[test]
    fn prop_parser_is_total(text in "\\PC*", currency in currency_strategy()) {
        if let Ok(units) = to_minor_units(&text, currency) {
            let canonical = from_minor_units(units, currency);
            prop_assert_eq!(to_minor_units(&canonical, currency).unwrap(), units);
        }
    }
}
