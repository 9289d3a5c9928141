// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use crate::class_table::ClassTable;
use crate::object::predefined;
use crate::types::ClassMetadata;

#[test]
fn new_table_reserves_predefined_cids() {
    let table = ClassTable::new();
    assert_eq!(table.len(), predefined::NUM_PREDEFINED_CIDS as usize);
    assert_eq!(table.get(predefined::SMI).unwrap().name, "Smi");
    assert_eq!(table.get(predefined::ARRAY).unwrap().name, "Array");
}

#[test]
fn register_pending_assigns_increasing_cids_and_tracks_pending() {
    let mut table = ClassTable::new();
    let first_len = table.len();
    let cid = table.register_pending(ClassMetadata::pending("Foo", None));
    assert_eq!(cid.as_u16() as usize, first_len);
    assert!(table.is_pending(cid));
    assert_eq!(table.pending_classes(), &[cid]);

    table.clear_pending(cid);
    assert!(!table.is_pending(cid));
    assert!(table.pending_classes().is_empty());
}

#[test]
fn get_mut_allows_editing_a_registered_class() {
    let mut table = ClassTable::new();
    let cid = table.register_pending(ClassMetadata::pending("Foo", None));
    table.get_mut(cid).unwrap().instance_size_words = 3;
    assert_eq!(table.get(cid).unwrap().instance_size_words, 3);
}
