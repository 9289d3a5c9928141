// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The old-space free-list allocator (spec §4.1 "Old space — free
//! list"). Reclamation (the mark/sweep pass that returns dead objects
//! to the free lists) belongs to a tracing collector this core does not
//! implement; the spec only specifies the allocator's contract and the
//! linear-walk guarantee the `FREE_LIST_ELEMENT` cid gives a sweeper,
//! not the collector loop itself. [`OldSpace::free`] is exposed so a
//! future sweeper (or a test) can return storage to the free lists.

use super::Slot;
use crate::object::{predefined, ClassId, HeapRef, ObjectHeader, Value};

/// Number of segregated size classes, indexed by field count (spec
/// §4.1 "index = size / alignment"). Anything bigger goes on the
/// overflow list.
const NUM_SIZE_CLASSES: usize = 64;

/// Guards a page temporarily re-protected from execute-only to
/// writable during a free-list split (spec §4.1 "Contract: when
/// splitting inside a page that is marked execute-only…"). This host
/// has no real page protection to flip, so the guard is a marker type;
/// it is `!Send` so it cannot cross the single-mutator boundary (spec
/// §9 Open Question 3), restoring protection on drop.
#[derive(Debug)]
pub struct PageProtectionGuard {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl PageProtectionGuard {
    #[must_use]
    pub fn protect_for_write() -> Self {
        Self {
            _not_send: std::marker::PhantomData,
        }
    }
}

#[allow(clippy::empty_drop, reason = "this host has no page protection to restore; the impl exists for the drop-ordering contract")]
impl Drop for PageProtectionGuard {
    fn drop(&mut self) {
        // restore_protection: a no-op on this host, kept as the
        // symmetric half of the contract so callers read the same way
        // the source's allocator does.
    }
}

#[derive(Debug)]
pub struct OldSpace {
    slots: Vec<Slot>,
    capacity: usize,
    free_lists: [Vec<u32>; NUM_SIZE_CLASSES],
    non_empty_classes: u64,
    overflow: Vec<u32>,
}

impl OldSpace {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            free_lists: std::array::from_fn(|_| Vec::new()),
            non_empty_classes: 0,
            overflow: Vec::new(),
        }
    }

    #[must_use]
    pub fn header_at(&self, index: u32) -> ObjectHeader {
        match self.slots[index as usize] {
            Slot::Header(h) => h,
            _ => panic!("slot {index} is not an object header"),
        }
    }

    #[must_use]
    pub fn field_count_at(&self, index: u32) -> u32 {
        self.header_at(index).size_in_alignment_units() as u32
    }

    #[must_use]
    pub fn field_at(&self, index: u32, field: u32) -> Value {
        match self.slots[index as usize + 1 + field as usize] {
            Slot::Value(v) => v,
            _ => panic!("slot is not a field value"),
        }
    }

    pub fn set_field_at(&mut self, index: u32, field: u32, value: Value) {
        self.slots[index as usize + 1 + field as usize] = Slot::Value(value);
    }

    pub fn set_remembered(&mut self, index: u32, remembered: bool) {
        if let Slot::Header(h) = &mut self.slots[index as usize] {
            *h = h.with_remembered(remembered);
        }
    }

    /// First-fit allocation: an exact-size free class first, then the
    /// overflow list (splitting the remainder back onto a class),
    /// falling back to bump-growing the backing store.
    pub fn allocate(&mut self, header: ObjectHeader, field_count: u32) -> Option<HeapRef> {
        let total = 1 + field_count as usize;

        if (field_count as usize) < NUM_SIZE_CLASSES && self.class_non_empty(field_count as usize)
        {
            let start = self.free_lists[field_count as usize]
                .pop()
                .expect("bitset says this class is non-empty");
            if self.free_lists[field_count as usize].is_empty() {
                self.clear_class_bit(field_count as usize);
            }
            self.install(start as usize, header, field_count);
            return Some(HeapRef::Old(start));
        }

        if let Some(pos) = self.overflow.iter().position(|&start| {
            self.header_at(start).size_in_alignment_units() as usize + 1 >= total
        }) {
            let start = self.overflow.remove(pos);
            let existing_size = self.header_at(start).size_in_alignment_units() as usize + 1;
            self.install(start as usize, header, field_count);
            let remainder = existing_size - total;
            if remainder > 0 {
                self.push_free(start + total as u32, remainder as u32 - 1);
            }
            return Some(HeapRef::Old(start));
        }

        if self.slots.len() + total > self.capacity {
            return None;
        }
        let start = self.slots.len();
        self.slots.push(Slot::Header(header));
        for _ in 0..field_count {
            self.slots.push(Slot::Value(Value::null()));
        }
        Some(HeapRef::Old(start as u32))
    }

    /// Returns a live object's storage to the free lists.
    pub fn free(&mut self, r: HeapRef) {
        let HeapRef::Old(start) = r else {
            return;
        };
        let field_count = self.field_count_at(start);
        self.push_free(start, field_count);
    }

    fn push_free(&mut self, start: u32, field_count: u32) {
        self.slots[start as usize] = Slot::Header(ObjectHeader::new(
            predefined::FREE_LIST_ELEMENT,
            field_count as u8,
        ));
        if (field_count as usize) < NUM_SIZE_CLASSES {
            self.free_lists[field_count as usize].push(start);
            self.set_class_bit(field_count as usize);
        } else {
            self.overflow.push(start);
        }
    }

    fn install(&mut self, start: usize, header: ObjectHeader, field_count: u32) {
        self.slots[start] = Slot::Header(header);
        for f in 0..field_count {
            self.slots[start + 1 + f as usize] = Slot::Value(Value::null());
        }
    }

    fn class_non_empty(&self, class: usize) -> bool {
        self.non_empty_classes & (1 << class) != 0
    }

    fn set_class_bit(&mut self, class: usize) {
        self.non_empty_classes |= 1 << class;
    }

    fn clear_class_bit(&mut self, class: usize) {
        self.non_empty_classes &= !(1 << class);
    }

    #[must_use]
    pub fn class_id_at(&self, index: u32) -> ClassId {
        self.header_at(index).class_id()
    }
}
