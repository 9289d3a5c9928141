// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Class ids: small integers that key the process-wide class table.

/// A class id. `0` is illegal (never assigned to a live class); ids below
/// [`predefined::NUM_PREDEFINED_CIDS`] are reserved for built-in kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u16);

impl ClassId {
    /// Illegal/uninitialized class id.
    pub const ILLEGAL: Self = Self(0);

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_illegal(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_predefined(self) -> bool {
        self.0 < predefined::NUM_PREDEFINED_CIDS
    }
}

impl core::fmt::Display for ClassId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "cid#{}", self.0)
    }
}

/// Built-in class ids, reserved at VM start (spec §3 "class id").
pub mod predefined {
    use super::ClassId;

    /// First id available to user-loaded classes.
    pub const NUM_PREDEFINED_CIDS: u16 = 32;

    pub const SMI: ClassId = ClassId(1);
    pub const MINT: ClassId = ClassId(2);
    pub const BIGINT: ClassId = ClassId(3);
    pub const DOUBLE: ClassId = ClassId(4);
    pub const BOOL: ClassId = ClassId(5);
    pub const NULL: ClassId = ClassId(6);
    pub const ARRAY: ClassId = ClassId(7);
    pub const IMMUTABLE_ARRAY: ClassId = ClassId(8);
    pub const GROWABLE_OBJECT_ARRAY: ClassId = ClassId(9);
    pub const STRING: ClassId = ClassId(10);
    pub const TYPED_DATA_VIEW: ClassId = ClassId(11);
    pub const WEAK_PROPERTY: ClassId = ClassId(12);
    /// Class-metadata objects ("a class about classes").
    pub const CLASS: ClassId = ClassId(13);
    /// A synthesized signature-class instance.
    pub const SIGNATURE_CLASS: ClassId = ClassId(14);

    /// Marks an unallocated gap in old-space so the sweeper can walk the
    /// heap linearly. Deliberately outside the predefined range so
    /// `is_predefined` stays false for it, matching the source where it
    /// is a distinguished, non-contiguous id.
    pub const FREE_LIST_ELEMENT: ClassId = ClassId(u16::MAX);

    /// Names built-ins that may not be extended or implemented outside
    /// the core library (spec §4.3 Step A).
    pub const SEALED_BUILTIN_NAMES: &[&str] = &[
        "Number",
        "Integer",
        "Smi",
        "Mint",
        "Bigint",
        "Double",
        "Bool",
        "Null",
        "Array",
        "ImmutableArray",
        "GrowableObjectArray",
        "TypedDataView",
        "WeakProperty",
    ];
}
