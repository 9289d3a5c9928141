// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The process-wide class table (spec §4.2): an append-only array
//! indexed by [`ClassId`], plus the pending-classes list that
//! [`crate::types::finalizer::ClassFinalizer`] drains to a fixed point.

use crate::object::{predefined, ClassId};
use crate::types::ClassMetadata;

/// Grows only by appending; entries are never removed or reordered, so
/// a [`ClassId`] stays valid for the table's whole lifetime.
#[derive(Debug, Default)]
pub struct ClassTable {
    classes: Vec<ClassMetadata>,
    pending: Vec<ClassId>,
}

impl ClassTable {
    /// A table pre-populated with the built-in cids (spec §3, §4.2) and
    /// no user classes.
    #[must_use]
    pub fn new() -> Self {
        let mut classes = Vec::with_capacity(predefined::NUM_PREDEFINED_CIDS as usize);
        classes.push(ClassMetadata::placeholder("<illegal>"));
        let builtin_names = [
            "Smi",
            "Mint",
            "Bigint",
            "Double",
            "Bool",
            "Null",
            "Array",
            "ImmutableArray",
            "GrowableObjectArray",
            "String",
            "TypedDataView",
            "WeakProperty",
            "Class",
            "SignatureClass",
        ];
        for name in builtin_names {
            classes.push(ClassMetadata::placeholder(name));
        }
        while classes.len() < predefined::NUM_PREDEFINED_CIDS as usize {
            let reserved_index = classes.len();
            classes.push(ClassMetadata::placeholder(format!("<reserved-{reserved_index}>")));
        }
        Self {
            classes,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    #[must_use]
    pub fn get(&self, cid: ClassId) -> Option<&ClassMetadata> {
        self.classes.get(cid.as_u16() as usize)
    }

    pub fn get_mut(&mut self, cid: ClassId) -> Option<&mut ClassMetadata> {
        self.classes.get_mut(cid.as_u16() as usize)
    }

    /// Appends a fresh class, assigning it the next cid, and enters it
    /// into the pending-classes list awaiting finalization.
    pub fn register_pending(&mut self, class: ClassMetadata) -> ClassId {
        let cid = ClassId(self.classes.len() as u16);
        self.classes.push(class);
        self.pending.push(cid);
        cid
    }

    #[must_use]
    pub fn pending_classes(&self) -> &[ClassId] {
        &self.pending
    }

    /// Drops a class from the pending list once the finalizer has
    /// settled it (successfully or not — a failed class still occupies
    /// its cid so later references resolve to *something*).
    pub fn clear_pending(&mut self, cid: ClassId) {
        self.pending.retain(|&p| p != cid);
    }

    #[must_use]
    pub fn is_pending(&self, cid: ClassId) -> bool {
        self.pending.contains(&cid)
    }
}
