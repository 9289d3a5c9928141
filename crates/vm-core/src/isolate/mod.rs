// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The isolate runtime harness. One mutator thread per [`Isolate`];
//! isolates never share mutable heap objects. An [`IsolateGroup`]
//! holds the class table and the set of isolates that share it plus a
//! small read-only VM-isolate heap. There is no scheduler here —
//! run-to-completion, single mutator, cooperative cancellation via
//! interrupt flags polled at back edges and safepoints.

#[cfg(test)]
mod isolate_test;

use crate::class_table::ClassTable;
use crate::handles::HandleStack;
use crate::heap::Heap;

/// Cooperative cancellation flags, polled at back edges and function
/// entry (spec §5 "Cancellation & timeouts").
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InterruptFlags {
    pub should_pause: bool,
    pub should_terminate: bool,
}

impl InterruptFlags {
    #[must_use]
    pub fn any_set(self) -> bool {
        self.should_pause || self.should_terminate
    }
}

/// A single mutator's private state: its heap, handle stack, and
/// interrupt flags. The class table it runs against lives one level up
/// in the enclosing [`IsolateGroup`].
#[derive(Debug)]
pub struct Isolate {
    pub heap: Heap,
    pub handles: HandleStack,
    pub interrupts: InterruptFlags,
}

impl Isolate {
    #[must_use]
    pub fn new(young_capacity: usize, old_capacity: usize) -> Self {
        Self {
            heap: Heap::new(young_capacity, old_capacity),
            handles: HandleStack::new(),
            interrupts: InterruptFlags::default(),
        }
    }
}

/// Owns the class table shared by every isolate spawned from it (spec
/// §5 "a small immutable VM-isolate heap holds shared read-only data").
/// This port keeps the class table here rather than splitting off a
/// separate VM-isolate heap, since nothing in this core's scope
/// allocates shared heap objects beyond class metadata.
#[derive(Debug, Default)]
pub struct IsolateGroup {
    pub class_table: ClassTable,
    isolates: Vec<Isolate>,
}

impl IsolateGroup {
    #[must_use]
    pub fn new() -> Self {
        Self {
            class_table: ClassTable::new(),
            isolates: Vec::new(),
        }
    }

    pub fn spawn_isolate(&mut self, young_capacity: usize, old_capacity: usize) -> usize {
        self.isolates.push(Isolate::new(young_capacity, old_capacity));
        self.isolates.len() - 1
    }

    #[must_use]
    pub fn isolate(&self, index: usize) -> Option<&Isolate> {
        self.isolates.get(index)
    }

    pub fn isolate_mut(&mut self, index: usize) -> Option<&mut Isolate> {
        self.isolates.get_mut(index)
    }

    #[must_use]
    pub fn isolate_count(&self) -> usize {
        self.isolates.len()
    }
}
