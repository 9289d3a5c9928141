// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Tagged numeric tower for the VM core.
//!
//! Every runtime integer is one of three representations, matching the
//! `Smi` / `Mint` / `Bigint` split used throughout the object model:
//!
//! - `Smi` — a small integer that fits in a tagged immediate and never
//!   allocates (see `vm_core::object::Value::Smi`). This crate does not
//!   model the tag bit itself (that's the object model's job); it only
//!   carries the `i64` payload.
//! - `Mint` — a heap-allocated 64-bit two's-complement integer, used once
//!   a computation overflows the Smi range.
//! - `Bigint` — arbitrary precision, backed by `num-bigint`.
//!
//! Arithmetic on [`Integer`] always produces the narrowest representation
//! that holds the result: adding two `Mint`s that overflow `i64` promotes
//! to `Bigint`; a `Bigint` operation that now fits back in `i64` demotes
//! to `Mint`. Callers that additionally need the Smi range (the object
//! model's immediate range is narrower than `i64`) renormalize themselves.

#[cfg(test)]
mod integer_test;

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, Div, Mul, Rem, Sub};
use num_bigint::{BigInt, Sign};
use num_traits::{ToPrimitive, Zero};

/// A runtime integer, always stored in its narrowest representation.
#[derive(Clone, Debug)]
pub enum Integer {
    /// Fits in a 64-bit two's-complement word (covers both `Smi` and `Mint`
    /// payloads; the object model decides which tag to use based on the
    /// immediate range).
    Mint(i64),
    /// Arbitrary precision, used once a value no longer fits in `i64`.
    Big(BigInt),
}

impl Integer {
    /// Construct from an `i64`, always normalized to `Mint`.
    #[must_use]
    pub const fn from_i64(n: i64) -> Self {
        Self::Mint(n)
    }

    /// Demote a `Bigint` to `Mint` when it fits, otherwise keep it as-is.
    #[must_use]
    fn normalize(big: BigInt) -> Self {
        match big.to_i64() {
            Some(n) => Self::Mint(n),
            None => Self::Big(big),
        }
    }

    /// True if this value is exactly representable as `i64`.
    #[must_use]
    pub const fn is_mint(&self) -> bool {
        matches!(self, Self::Mint(_))
    }

    /// Convert to `i64`, if it fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Self::Mint(n) => Some(*n),
            Self::Big(b) => b.to_i64(),
        }
    }

    /// True if this value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Mint(n) => *n == 0,
            Self::Big(b) => b.is_zero(),
        }
    }

    fn as_big(&self) -> BigInt {
        match self {
            Self::Mint(n) => BigInt::from(*n),
            Self::Big(b) => b.clone(),
        }
    }

    /// Decompose into a sign word (-1/0/1) and little-endian `u32`
    /// digits, for callers that box a `Bigint` as a run of heap words
    /// rather than keeping it as this crate's own `BigInt`.
    #[must_use]
    pub fn to_heap_words(&self) -> (i64, Vec<u32>) {
        let (sign, digits) = self.as_big().to_u32_digits();
        let sign_word = match sign {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        };
        (sign_word, digits)
    }

    /// Inverse of [`Integer::to_heap_words`], always normalized to the
    /// narrowest representation.
    #[must_use]
    pub fn from_heap_words(sign_word: i64, digits: &[u32]) -> Self {
        let sign = match sign_word.cmp(&0) {
            Ordering::Less => Sign::Minus,
            Ordering::Equal => Sign::NoSign,
            Ordering::Greater => Sign::Plus,
        };
        Self::normalize(BigInt::from_slice(sign, digits))
    }
}

impl From<i64> for Integer {
    fn from(n: i64) -> Self {
        Self::from_i64(n)
    }
}

impl PartialEq for Integer {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Mint(a), Self::Mint(b)) => a == b,
            _ => self.as_big() == other.as_big(),
        }
    }
}
impl Eq for Integer {}

impl PartialOrd for Integer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Integer {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Mint(a), Self::Mint(b)) => a.cmp(b),
            _ => self.as_big().cmp(&other.as_big()),
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mint(n) => write!(f, "{n}"),
            Self::Big(b) => write!(f, "{b}"),
        }
    }
}

impl Add for Integer {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        if let (Self::Mint(left), Self::Mint(right)) = (&self, &rhs)
            && let Some(sum) = left.checked_add(*right)
        {
            return Self::Mint(sum);
        }
        Self::normalize(self.as_big() + rhs.as_big())
    }
}

impl Sub for Integer {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        if let (Self::Mint(left), Self::Mint(right)) = (&self, &rhs)
            && let Some(diff) = left.checked_sub(*right)
        {
            return Self::Mint(diff);
        }
        Self::normalize(self.as_big() - rhs.as_big())
    }
}

impl Mul for Integer {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        if let (Self::Mint(left), Self::Mint(right)) = (&self, &rhs)
            && let Some(prod) = left.checked_mul(*right)
        {
            return Self::Mint(prod);
        }
        Self::normalize(self.as_big() * rhs.as_big())
    }
}

impl Div for Integer {
    type Output = Option<Self>;
    #[inline]
    fn div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        if let (Self::Mint(left), Self::Mint(right)) = (&self, &rhs)
            && let Some(quotient) = left.checked_div(*right)
        {
            return Some(Self::Mint(quotient));
        }
        Some(Self::normalize(self.as_big() / rhs.as_big()))
    }
}

impl Rem for Integer {
    type Output = Option<Self>;
    #[inline]
    fn rem(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        if let (Self::Mint(left), Self::Mint(right)) = (&self, &rhs)
            && let Some(remainder) = left.checked_rem(*right)
        {
            return Some(Self::Mint(remainder));
        }
        Some(Self::normalize(self.as_big() % rhs.as_big()))
    }
}

/// Canonicalize a double so `-0.0` and `0.0` hash and compare identically,
/// matching the "canonical instance" invariant applied to heap numbers.
#[must_use]
#[inline]
pub fn canonical_double_bits(value: f64) -> u64 {
    if value == 0.0 {
        0u64
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}
