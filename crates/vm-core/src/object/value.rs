// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The runtime value representation: a small integer that never
//! allocates, or a reference into one of the heap's two spaces.

/// A reference into the heap, tagged by which space it points into. The
/// source VM encodes this as a raw pointer with a zero low tag bit and
/// relies on the space boundary to tell young from old; here the two
/// spaces are separate arenas, so the tag is carried explicitly as part
/// of the reference instead of being recovered from an address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapRef {
    /// An index into the young-space slot array.
    Young(u32),
    /// An index into the old-space slot array.
    Old(u32),
}

impl HeapRef {
    #[must_use]
    pub const fn is_young(self) -> bool {
        matches!(self, Self::Young(_))
    }

    #[must_use]
    pub const fn is_old(self) -> bool {
        matches!(self, Self::Old(_))
    }

    #[must_use]
    pub const fn slot_index(self) -> u32 {
        match self {
            Self::Young(i) | Self::Old(i) => i,
        }
    }
}

/// A tagged value: either a small integer (the "Smi" of spec §3, held
/// directly rather than allocated) or a reference to a heap object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Smi(i64),
    Ref(HeapRef),
}

impl Value {
    #[must_use]
    pub const fn null() -> Self {
        Self::Ref(HeapRef::Old(0))
    }

    #[must_use]
    pub const fn is_smi(self) -> bool {
        matches!(self, Self::Smi(_))
    }

    #[must_use]
    pub const fn as_smi(self) -> Option<i64> {
        match self {
            Self::Smi(v) => Some(v),
            Self::Ref(_) => None,
        }
    }

    #[must_use]
    pub const fn as_ref(self) -> Option<HeapRef> {
        match self {
            Self::Ref(r) => Some(r),
            Self::Smi(_) => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Smi(v)
    }
}

impl From<HeapRef> for Value {
    fn from(r: HeapRef) -> Self {
        Self::Ref(r)
    }
}
