// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::integer::{fits_smi, SMI_MAX, SMI_MIN};
use super::Heap;
use crate::object::{predefined, Value};
use vm_numerics::Integer;

#[test]
fn smi_range_excludes_the_two_tag_bits() {
    assert!(fits_smi(0));
    assert!(fits_smi(SMI_MIN));
    assert!(fits_smi(SMI_MAX));
    assert!(!fits_smi(SMI_MAX + 1));
    assert!(!fits_smi(SMI_MIN - 1));
}

#[test]
fn a_value_within_smi_range_never_allocates() {
    let mut heap = Heap::new(64, 64);
    let before = heap.young.len();
    let v = heap
        .make_integer(&Integer::from_i64(7), &mut [])
        .unwrap();
    assert_eq!(v, Value::Smi(7));
    assert_eq!(heap.young.len(), before);
}

#[test]
fn a_value_outside_smi_range_is_boxed_as_a_mint() {
    let mut heap = Heap::new(64, 64);
    let v = heap
        .make_integer(&Integer::from_i64(SMI_MAX + 1), &mut [])
        .unwrap();
    let r = v.as_ref().expect("must be heap-allocated");
    assert_eq!(heap.read_header(r).class_id(), predefined::MINT);
    assert_eq!(heap.read_integer(v), Integer::from_i64(SMI_MAX + 1));
}

#[test]
fn adding_two_mints_that_overflow_i64_promotes_to_bigint() {
    let mut heap = Heap::new(64, 64);
    let a = heap.make_integer(&Integer::from_i64(i64::MAX), &mut []).unwrap();
    let b = heap.make_integer(&Integer::from_i64(1), &mut []).unwrap();

    let mut roots = [];
    let sum = heap.add_integers(a, b, &mut roots).unwrap();

    let r = sum.as_ref().expect("overflow must be heap-allocated");
    assert_eq!(heap.read_header(r).class_id(), predefined::BIGINT);
    assert_eq!(
        heap.read_integer(sum),
        Integer::from_i64(i64::MAX) + Integer::from_i64(1)
    );
}

#[test]
fn a_bigint_that_shrinks_back_under_i64_demotes_to_a_mint_on_readback() {
    let mut heap = Heap::new(64, 64);
    let overflowed = Integer::from_i64(i64::MAX) + Integer::from_i64(1);
    let boxed = heap.make_integer(&overflowed, &mut []).unwrap();

    let mut roots = [];
    let back = heap.add_integers(boxed, Value::Smi(-1), &mut roots).unwrap();

    let r = back.as_ref().expect("i64::MAX is outside the Smi range, so it stays boxed");
    assert_eq!(heap.read_header(r).class_id(), predefined::MINT);
    assert_eq!(heap.read_integer(back), Integer::from_i64(i64::MAX));
}

#[test]
fn multiplying_two_large_mints_promotes_to_bigint() {
    let mut heap = Heap::new(64, 64);
    let a = heap.make_integer(&Integer::from_i64(i64::MAX), &mut []).unwrap();
    let b = heap.make_integer(&Integer::from_i64(2), &mut []).unwrap();

    let mut roots = [];
    let product = heap.mul_integers(a, b, &mut roots).unwrap();

    assert_eq!(
        heap.read_integer(product),
        Integer::from_i64(i64::MAX) * Integer::from_i64(2)
    );
}
