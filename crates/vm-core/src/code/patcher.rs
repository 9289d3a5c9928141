// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The architecture-neutral patching contract (spec §4.4 "Patching
//! contract"). Each back-end implements [`Patcher`] by pattern-matching
//! a fixed instruction sequence around a return address; this crate
//! ships [`TableCodePatcher`], a back-end-free implementation that
//! patches the object pool directly, exercising the contract without
//! an assembler.

use std::collections::HashMap;

/// A call site the patcher can read or rewrite, identified by the
/// return address (here: an offset into the owning code object's
/// instruction blob) it sits behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReturnAddress(pub u32);

/// What a call site currently targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    Function(String),
    Unresolved,
}

pub trait Patcher {
    fn read_static_call_target(&self, site: ReturnAddress) -> CallTarget;
    fn write_static_call_target(&mut self, site: ReturnAddress, target: CallTarget);
    fn read_instance_call_target(&self, site: ReturnAddress) -> CallTarget;
    fn write_instance_call_target(&mut self, site: ReturnAddress, target: CallTarget);
    fn insert_call(&mut self, site: ReturnAddress, target: CallTarget);
    fn read_edge_counter(&self, site: ReturnAddress) -> u64;
    fn write_edge_counter(&mut self, site: ReturnAddress, count: u64);
}

/// A patcher that rewrites a table of targets keyed by return address
/// rather than decoding machine instructions. Pool-indirect back-ends
/// (spec §4.4 "In pool-indirect back-ends, the patch writes the target
/// into the object pool and no I-cache flush is needed") work exactly
/// this way, so this doubles as a faithful model of that family and a
/// test double for the others.
#[derive(Debug, Default)]
pub struct TableCodePatcher {
    static_calls: HashMap<ReturnAddress, CallTarget>,
    instance_calls: HashMap<ReturnAddress, CallTarget>,
    edge_counters: HashMap<ReturnAddress, u64>,
}

impl Patcher for TableCodePatcher {
    fn read_static_call_target(&self, site: ReturnAddress) -> CallTarget {
        self.static_calls
            .get(&site)
            .cloned()
            .unwrap_or(CallTarget::Unresolved)
    }

    fn write_static_call_target(&mut self, site: ReturnAddress, target: CallTarget) {
        self.static_calls.insert(site, target);
    }

    fn read_instance_call_target(&self, site: ReturnAddress) -> CallTarget {
        self.instance_calls
            .get(&site)
            .cloned()
            .unwrap_or(CallTarget::Unresolved)
    }

    fn write_instance_call_target(&mut self, site: ReturnAddress, target: CallTarget) {
        self.instance_calls.insert(site, target);
    }

    fn insert_call(&mut self, site: ReturnAddress, target: CallTarget) {
        self.static_calls.insert(site, target);
    }

    fn read_edge_counter(&self, site: ReturnAddress) -> u64 {
        self.edge_counters.get(&site).copied().unwrap_or(0)
    }

    fn write_edge_counter(&mut self, site: ReturnAddress, count: u64) {
        self.edge_counters.insert(site, count);
    }
}
