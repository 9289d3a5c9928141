// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Boxing and unboxing of the `Smi`/`Mint`/`Bigint` tower (spec §3,
//! glossary) onto the heap. `vm_numerics::Integer` carries the
//! arithmetic; this module only decides which of the three
//! representations a given `Integer` takes and how it is laid out as
//! heap words.

use super::Heap;
use crate::object::{predefined, HeapRef, ObjectHeader, Value};
use vm_numerics::Integer;

/// Smi immediates are narrower than a raw `i64` word (the low bits are
/// reserved for the pointer tag on the source VM); two bits are spent
/// here so overflowing arithmetic has real Mint/Bigint promotion to
/// exercise instead of fitting every `i64` inline.
pub const SMI_MIN: i64 = -(1i64 << 61);
pub const SMI_MAX: i64 = (1i64 << 61) - 1;

#[must_use]
pub const fn fits_smi(n: i64) -> bool {
    n >= SMI_MIN && n <= SMI_MAX
}

impl Heap {
    /// Boxes `value` as whichever of `Smi`/`Mint`/`Bigint` it fits,
    /// allocating in young space when a box is needed.
    pub fn make_integer(&mut self, value: &Integer, roots: &mut [&mut Value]) -> Option<Value> {
        match value {
            Integer::Mint(n) if fits_smi(*n) => Some(Value::Smi(*n)),
            Integer::Mint(n) => {
                let header = ObjectHeader::new(predefined::MINT, 1);
                let r = self.allocate_young(header, 1, roots)?;
                self.write_field(r, 0, Value::Smi(*n));
                Some(Value::Ref(r))
            }
            Integer::Big(_) => {
                let (sign, digits) = value.to_heap_words();
                let field_count = 1 + digits.len() as u32;
                let header = ObjectHeader::new(predefined::BIGINT, u8::try_from(field_count).ok()?);
                let r = self.allocate_young(header, field_count, roots)?;
                self.write_field(r, 0, Value::Smi(sign));
                for (i, digit) in digits.iter().enumerate() {
                    self.write_field(r, 1 + i as u32, Value::Smi(i64::from(*digit)));
                }
                Some(Value::Ref(r))
            }
        }
    }

    /// Reads back the arithmetic value behind a `Smi`, `Mint`, or
    /// `Bigint` reference. Panics if `value` is some other heap kind,
    /// the same contract `read_field` already uses for slot kind
    /// mismatches.
    #[must_use]
    pub fn read_integer(&self, value: Value) -> Integer {
        match value {
            Value::Smi(n) => Integer::from_i64(n),
            Value::Ref(r) => {
                let cid = self.read_header(r).class_id();
                if cid == predefined::MINT {
                    let Value::Smi(n) = self.read_field(r, 0) else {
                        panic!("Mint payload must be a raw word");
                    };
                    Integer::from_i64(n)
                } else if cid == predefined::BIGINT {
                    self.read_bigint(r)
                } else {
                    panic!("{cid} is not an integer kind");
                }
            }
        }
    }

    fn read_bigint(&self, r: HeapRef) -> Integer {
        let Value::Smi(sign) = self.read_field(r, 0) else {
            panic!("Bigint sign word must be a raw Smi");
        };
        let field_count = self.read_header(r).size_in_alignment_units() as u32;
        let digits: Vec<u32> = (1..field_count)
            .map(|i| {
                let Value::Smi(digit) = self.read_field(r, i) else {
                    panic!("Bigint digit word must be a raw Smi");
                };
                u32::try_from(digit).expect("digit words are stored as non-negative u32s")
            })
            .collect();
        Integer::from_heap_words(sign, &digits)
    }

    /// `a + b`, promoting to Mint/Bigint as needed (spec §3 "Mint"/
    /// "Bigint").
    pub fn add_integers(&mut self, a: Value, b: Value, roots: &mut [&mut Value]) -> Option<Value> {
        let sum = self.read_integer(a) + self.read_integer(b);
        self.make_integer(&sum, roots)
    }

    /// `a * b`, promoting to Mint/Bigint as needed.
    pub fn mul_integers(&mut self, a: Value, b: Value, roots: &mut [&mut Value]) -> Option<Value> {
        let product = self.read_integer(a) * self.read_integer(b);
        self.make_integer(&product, roots)
    }
}
