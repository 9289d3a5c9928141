// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::patcher::{CallTarget, Patcher, ReturnAddress, TableCodePatcher};
use super::{CodeObject, PcDescriptor, PcDescriptorKind};

#[test]
fn deoptimize_marks_unoptimized_and_counts() {
    let mut code = CodeObject::new(vec![0; 4]);
    code.is_optimized = true;
    code.deoptimize();
    assert!(!code.is_optimized);
    assert_eq!(code.deopt_count, 1);
    code.deoptimize();
    assert_eq!(code.deopt_count, 2);
}

#[test]
fn find_pc_descriptor_matches_offset_and_kind() {
    let mut code = CodeObject::new(Vec::new());
    code.pc_descriptors.push(PcDescriptor {
        pc_offset: 10,
        kind: PcDescriptorKind::IcCall,
        deopt_id: 0,
        token_pos: 0,
        try_index: -1,
    });
    assert!(code.find_pc_descriptor(10, PcDescriptorKind::IcCall).is_some());
    assert!(code.find_pc_descriptor(10, PcDescriptorKind::Return).is_none());
}

#[test]
fn patcher_round_trips_static_call_target() {
    let mut patcher = TableCodePatcher::default();
    let site = ReturnAddress(42);
    assert_eq!(patcher.read_static_call_target(site), CallTarget::Unresolved);
    patcher.write_static_call_target(site, CallTarget::Function("foo".to_string()));
    assert_eq!(
        patcher.read_static_call_target(site),
        CallTarget::Function("foo".to_string())
    );
}

#[test]
fn patcher_edge_counter_round_trips() {
    let mut patcher = TableCodePatcher::default();
    let site = ReturnAddress(7);
    assert_eq!(patcher.read_edge_counter(site), 0);
    patcher.write_edge_counter(site, 100);
    assert_eq!(patcher.read_edge_counter(site), 100);
}
