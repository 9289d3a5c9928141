// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::{InterruptFlags, IsolateGroup};

#[test]
fn new_group_shares_one_class_table_across_isolates() {
    let mut group = IsolateGroup::new();
    let a = group.spawn_isolate(64, 64);
    let b = group.spawn_isolate(64, 64);
    assert_eq!(group.isolate_count(), 2);
    assert!(group.isolate(a).is_some());
    assert!(group.isolate(b).is_some());
    assert!(group.isolate(2).is_none());
}

#[test]
fn interrupt_flags_any_set() {
    assert!(!InterruptFlags::default().any_set());
    let flags = InterruptFlags {
        should_pause: true,
        ..Default::default()
    };
    assert!(flags.any_set());
}
