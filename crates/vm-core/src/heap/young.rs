// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The copying young space (spec §4.1 "Young space — scavenger").

use super::old::OldSpace;
use super::Slot;
use crate::object::{ObjectHeader, Value};
use std::collections::HashMap;

/// Two equally-sized semispaces with a bump allocator over the active
/// one. `survivor_end` is the prefix of the active space (before this
/// scavenge) already known to have survived a prior scavenge — those
/// objects are promoted to old space this time instead of being copied
/// again (spec §4.1 step 5).
#[derive(Debug)]
pub struct YoungSpace {
    spaces: [Vec<Slot>; 2],
    active: usize,
    top: usize,
    capacity: usize,
    survivor_end: usize,
    /// Valid only immediately after [`scavenge`](Self::scavenge): maps
    /// each surviving object's pre-scavenge start index to its new
    /// location, so weak-property processing can tell which captured
    /// young references are still alive.
    last_forwarding: HashMap<u32, crate::object::HeapRef>,
}

impl YoungSpace {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            spaces: [Vec::with_capacity(capacity), Vec::with_capacity(capacity)],
            active: 0,
            top: 0,
            capacity,
            survivor_end: 0,
            last_forwarding: HashMap::new(),
        }
    }

    fn active_space(&self) -> &[Slot] {
        &self.spaces[self.active]
    }

    /// Number of slots (headers + fields) occupied in the active space.
    #[must_use]
    pub fn len(&self) -> usize {
        self.top
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    #[must_use]
    pub fn header_at(&self, index: u32) -> ObjectHeader {
        match self.active_space()[index as usize] {
            Slot::Header(h) => h,
            _ => panic!("slot {index} is not an object header"),
        }
    }

    #[must_use]
    pub fn field_at(&self, index: u32, field: u32) -> Value {
        match self.active_space()[index as usize + 1 + field as usize] {
            Slot::Value(v) => v,
            _ => panic!("slot is not a field value"),
        }
    }

    pub fn set_field_at(&mut self, index: u32, field: u32, value: Value) {
        self.spaces[self.active][index as usize + 1 + field as usize] = Slot::Value(value);
    }

    /// Bump-allocates `1 + field_count` slots; `None` once the space is
    /// exhausted (the caller should scavenge and retry).
    pub fn allocate(&mut self, header: ObjectHeader, field_count: u32) -> Option<crate::object::HeapRef> {
        let needed = 1 + field_count as usize;
        if self.top + needed > self.capacity {
            return None;
        }
        let start = self.top;
        let space = &mut self.spaces[self.active];
        space.push(Slot::Header(header));
        for _ in 0..field_count {
            space.push(Slot::Value(Value::null()));
        }
        self.top += needed;
        Some(crate::object::HeapRef::Young(start as u32))
    }

    #[must_use]
    pub fn is_live_after_scavenge(&self, pre_scavenge_index: u32) -> bool {
        self.last_forwarding.contains_key(&pre_scavenge_index)
    }

    /// Runs one Cheney scavenge: flips the spaces, forwards every root
    /// (promoting objects already known to have survived once), then
    /// scans the copied objects for embedded young pointers. Returns
    /// whether a promotion attempt failed and fell back to `to`-space.
    pub fn scavenge(&mut self, old: &mut OldSpace, roots: &mut [Value]) -> bool {
        let from = self.active;
        let to = 1 - self.active;
        self.spaces[to].clear();
        let survivor_end = self.survivor_end;
        let (from_space, to_space) = Self::split_spaces(&mut self.spaces, from, to);

        let mut top_to = 0usize;
        let mut forwarding: HashMap<u32, crate::object::HeapRef> = HashMap::new();
        let mut promoted_pending_scan: Vec<u32> = Vec::new();
        let mut had_promotion_failure = false;

        for root in roots.iter_mut() {
            Self::forward_value(
                root,
                from_space,
                to_space,
                &mut top_to,
                &mut forwarding,
                survivor_end,
                old,
                &mut promoted_pending_scan,
                &mut had_promotion_failure,
            );
        }

        let mut scan = 0usize;
        while scan < top_to {
            let Slot::Header(header) = to_space[scan] else {
                panic!("scan cursor must land on an object header");
            };
            let field_count = header.size_in_alignment_units() as usize;
            for f in 0..field_count {
                let field_index = scan + 1 + f;
                let Slot::Value(mut value) = to_space[field_index] else {
                    panic!("expected a field value");
                };
                Self::forward_value(
                    &mut value,
                    from_space,
                    to_space,
                    &mut top_to,
                    &mut forwarding,
                    survivor_end,
                    old,
                    &mut promoted_pending_scan,
                    &mut had_promotion_failure,
                );
                to_space[field_index] = Slot::Value(value);
            }
            scan += 1 + field_count;
        }

        while let Some(promoted_index) = promoted_pending_scan.pop() {
            let field_count = old.field_count_at(promoted_index);
            for f in 0..field_count {
                let mut value = old.field_at(promoted_index, f);
                Self::forward_value(
                    &mut value,
                    from_space,
                    to_space,
                    &mut top_to,
                    &mut forwarding,
                    survivor_end,
                    old,
                    &mut promoted_pending_scan,
                    &mut had_promotion_failure,
                );
                old.set_field_at(promoted_index, f, value);
            }
        }

        self.active = to;
        self.top = top_to;
        self.survivor_end = top_to;
        self.last_forwarding = forwarding;
        had_promotion_failure
    }

    /// Splits the two semispaces into an immutable `from` view and a
    /// mutable `to` view; `from` and `to` are always 0 and 1 in some
    /// order, so a single `split_at_mut` suffices.
    fn split_spaces(spaces: &mut [Vec<Slot>; 2], from: usize, to: usize) -> (&[Slot], &mut Vec<Slot>) {
        if from < to {
            let (left, right) = spaces.split_at_mut(to);
            (&left[from], &mut right[0])
        } else {
            let (left, right) = spaces.split_at_mut(from);
            (&right[0], &mut left[to])
        }
    }

    #[allow(clippy::too_many_arguments, reason = "forwarding needs every scavenge coordinate at once")]
    fn forward_value(
        value: &mut Value,
        from_space: &[Slot],
        to_space: &mut Vec<Slot>,
        top_to: &mut usize,
        forwarding: &mut HashMap<u32, crate::object::HeapRef>,
        survivor_end: usize,
        old: &mut OldSpace,
        promoted_pending_scan: &mut Vec<u32>,
        had_promotion_failure: &mut bool,
    ) {
        let Value::Ref(crate::object::HeapRef::Young(from_index)) = *value else {
            return;
        };
        if let Some(&new_ref) = forwarding.get(&from_index) {
            *value = Value::Ref(new_ref);
            return;
        }

        let Slot::Header(header) = from_space[from_index as usize] else {
            panic!("forwarding target must start at an object header");
        };
        let field_count = header.size_in_alignment_units() as u32;

        let already_survived = (from_index as usize) < survivor_end;
        if already_survived {
            if let Some(new_ref) = old.allocate(header, field_count) {
                if let crate::object::HeapRef::Old(new_index) = new_ref {
                    for f in 0..field_count {
                        let Slot::Value(field_value) = from_space[from_index as usize + 1 + f as usize] else {
                            panic!("expected a field value");
                        };
                        old.set_field_at(new_index, f, field_value);
                    }
                    promoted_pending_scan.push(new_index);
                }
                forwarding.insert(from_index, new_ref);
                *value = Value::Ref(new_ref);
                return;
            }
            *had_promotion_failure = true;
        }

        let new_start = *top_to;
        to_space.push(Slot::Header(header));
        for f in 0..field_count {
            let Slot::Value(field_value) = from_space[from_index as usize + 1 + f as usize] else {
                panic!("expected a field value");
            };
            to_space.push(Slot::Value(field_value));
        }
        *top_to += 1 + field_count as usize;
        let new_ref = crate::object::HeapRef::Young(new_start as u32);
        forwarding.insert(from_index, new_ref);
        *value = Value::Ref(new_ref);
    }
}
