// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::*;
use proptest::prelude::*;

#[test]
fn mint_addition_stays_mint_when_it_fits() {
    let sum = Integer::from(2i64) + Integer::from(3i64);
    assert_eq!(sum, Integer::from(5i64));
    assert!(sum.is_mint());
}

#[test]
fn mint_overflow_promotes_to_bigint() {
    let sum = Integer::from(i64::MAX) + Integer::from(1i64);
    assert!(!sum.is_mint());
    assert_eq!(sum.to_i64(), None);
}

#[test]
fn bigint_that_fits_demotes_back_to_mint() {
    let big = Integer::from(i64::MAX) + Integer::from(1i64);
    let back = big - Integer::from(1i64);
    assert!(back.is_mint());
    assert_eq!(back, Integer::from(i64::MAX));
}

#[test]
fn division_by_zero_is_none() {
    assert!((Integer::from(10i64) / Integer::from(0i64)).is_none());
}

#[test]
fn canonical_double_treats_negative_zero_as_zero() {
    assert_eq!(canonical_double_bits(0.0), canonical_double_bits(-0.0));
}

#[test]
fn heap_words_roundtrip_through_a_bigint() {
    let big = Integer::from(i64::MAX) + Integer::from(1i64);
    let (sign, digits) = big.to_heap_words();
    assert_eq!(Integer::from_heap_words(sign, &digits), big);
}

#[test]
fn heap_words_of_zero_has_no_digits() {
    let (sign, digits) = Integer::from(0i64).to_heap_words();
    assert_eq!(sign, 0);
    assert!(digits.is_empty());
    assert_eq!(Integer::from_heap_words(sign, &digits), Integer::from(0i64));
}

proptest! {
    #[test]
    fn add_sub_roundtrip(a in any::<i64>(), b in any::<i64>()) {
        let sum = Integer::from(a) + Integer::from(b);
        let back = sum - Integer::from(b);
        prop_assert_eq!(back, Integer::from(a));
    }

    #[test]
    fn ordering_matches_i64_when_both_mint(a in any::<i64>(), b in any::<i64>()) {
        let ord = Integer::from(a).cmp(&Integer::from(b));
        prop_assert_eq!(ord, a.cmp(&b));
    }
}
