// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! End-to-end scenarios exercising more than one module together: the
//! minimal front end into the class finalizer, the heap across a
//! scavenge, and the inliner's polymorphic decision DAG.

use crate::class_table::ClassTable;
use crate::code::PcDescriptorKind;
use crate::frontend::{ClassBuilder, StubCodeGenerator};
use crate::heap::Heap;
use crate::inline::poly::build_decision_dag;
use crate::inline::ssa::{Graph, Instr, PolyVariant};
use crate::inline::{should_inline, CalleeInfo, CallSite, CallSiteKind, InlineConfig};
use crate::isolate::Isolate;
use crate::object::{predefined, HeapRef, ObjectHeader, Value};
use crate::types::{ClassFinalizer, NullInvalidationSink, Type, TypeArguments, TypeVariant};
use std::collections::HashMap;

fn finalize(table: &mut ClassTable) {
    ClassFinalizer::finalize_pending_classes(table, &mut NullInvalidationSink).unwrap();
}

/// S1 — a type that refers back to its own class within one type tree
/// (the shape an F-bounded type parameter's instantiated bound takes,
/// `A<A<...>>`) has its inner self-reference substituted with `dynamic`
/// rather than recursing forever, and the result is stable under a
/// second, independent finalization of the same structure.
#[test]
fn f_bounded_self_reference_collapses_to_dynamic_and_is_stable() {
    // A second, concrete argument (`Smi`) keeps the vector from
    // collapsing to the all-dynamic null marker (spec §4.3 step 6), so
    // the substituted self-reference stays observable alongside it.
    let build_table_and_holder = || {
        let mut table = ClassTable::new();
        let a_cid = table.register_pending(crate::types::ClassMetadata::pending("A", None));
        let mut class = crate::types::ClassMetadata::pending("Holder", None);
        class.super_type = Some(Type::parameterized(
            a_cid,
            Some(TypeArguments::Flat(vec![
                Type::parameterized(a_cid, None),
                Type::parameterized(predefined::SMI, None),
            ])),
        ));
        let holder_cid = table.register_pending(class);
        (table, holder_cid)
    };

    let (mut table, holder_one) = build_table_and_holder();
    finalize(&mut table);
    let (mut table2, holder_two) = build_table_and_holder();
    finalize(&mut table2);

    let super_one = table.get(holder_one).unwrap().super_type.clone().unwrap();
    let super_two = table2.get(holder_two).unwrap().super_type.clone().unwrap();

    let TypeVariant::Parameterized { arguments: Some(TypeArguments::Flat(args)), .. } = &super_one.variant else {
        panic!("expected a parameterized super type with two arguments");
    };
    assert!(args[0].is_dynamic(), "inner self-reference must collapse to dynamic");
    assert!(!args[1].is_dynamic(), "the unrelated Smi argument is untouched");
    assert_eq!(super_one, super_two, "finalizing the same shape twice is idempotent");
}

/// S2 — `class C extends S with M` synthesizes `S&M` once, built
/// through the minimal front end rather than by constructing
/// `ClassMetadata` directly.
#[test]
fn mixin_application_built_through_front_end_is_named_and_shared() {
    let mut table = ClassTable::new();
    {
        let mut builder = ClassBuilder::new(&mut table);
        let s = builder.new_class("S", 0);
        let m = builder.new_class("M", 0);
        let c = builder.new_class("C", 0);
        builder.add_super(c, "S");
        builder.add_mixin(c, "M");
        let d = builder.new_class("D", 0);
        builder.add_super(d, "S");
        builder.add_mixin(d, "M");
        let _ = (s, m);
    }

    finalize(&mut table);

    let synthesized: Vec<_> = (0..table.len())
        .map(|i| crate::object::ClassId(i as u16))
        .filter(|&cid| table.get(cid).unwrap().name == "S&M")
        .collect();
    assert_eq!(synthesized.len(), 1, "both C and D must reuse the same synthesized S&M");
}

/// S3 — half of 1000 young allocations are retained through external
/// roots; after one scavenge, exactly the retained half are reported
/// live and the discarded half are not.
#[test]
fn scavenge_survival_of_every_second_allocation() {
    let mut heap = Heap::new(4096, 4096);
    let mut no_roots: [&mut Value; 0] = [];
    let mut refs = Vec::with_capacity(1000);
    for i in 0..1000i64 {
        let r = heap.allocate_young(ObjectHeader::new(predefined::ARRAY, 1), 1, &mut no_roots).unwrap();
        heap.write_field(r, 0, Value::Smi(i));
        refs.push(r);
    }

    let mut retained_values: Vec<Value> = refs
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 0)
        .map(|(_, r)| Value::Ref(*r))
        .collect();
    {
        let mut roots: Vec<&mut Value> = retained_values.iter_mut().collect();
        heap.scavenge(&mut roots);
    }

    for (i, r) in refs.iter().enumerate() {
        let HeapRef::Young(pre_index) = r else {
            panic!("every allocation in this test is young");
        };
        let expected_alive = i % 2 == 0;
        assert_eq!(
            heap.young.is_live_after_scavenge(*pre_index),
            expected_alive,
            "allocation #{i} survival mismatch"
        );
    }
}

/// S4 — an isolate's old-space array holding a freshly allocated
/// young-space object keeps its remembered bit and its store-buffer
/// entry, and still finds the (possibly forwarded) young object after
/// a scavenge.
#[test]
fn store_buffer_correctness_across_an_isolate_scavenge() {
    let mut isolate = Isolate::new(64, 64);
    let array = isolate.heap.allocate_old(ObjectHeader::new(predefined::ARRAY, 1), 1).unwrap();
    let mut no_roots: [&mut Value; 0] = [];
    let young_obj = isolate
        .heap
        .allocate_young(ObjectHeader::new(predefined::ARRAY, 1), 1, &mut no_roots)
        .unwrap();
    isolate.heap.write_field(young_obj, 0, Value::Smi(123));
    isolate.heap.write_field(array, 0, Value::Ref(young_obj));

    assert!(isolate.heap.read_header(array).is_remembered());
    assert_eq!(isolate.heap.store_buffer.len(), 1);

    isolate.heap.scavenge(&mut []);

    let surviving = isolate.heap.read_field(array, 0);
    assert!(matches!(surviving, Value::Ref(_)));
    assert_eq!(isolate.heap.read_field(surviving.as_ref().unwrap(), 0), Value::Smi(123));
}

/// S5 — a small, single-call-site callee is inlined; a 1000-instruction
/// callee is not.
#[test]
fn inliner_heuristic_small_callee_in_large_callee_out() {
    let config = InlineConfig::default();
    let hot = CallSite {
        node: 0,
        kind: CallSiteKind::Static,
        count: 10,
        hotness_ratio: 1.0,
    };
    let small_callee = CalleeInfo {
        instruction_count: 10,
        call_site_count: 0,
        constant_actual_count: 0,
        is_inlinable: true,
        is_always_inline: false,
        inside_try_block: false,
        deopt_count: 0,
    };
    assert!(should_inline(0, small_callee, hot, &config));

    let large_callee = CalleeInfo {
        instruction_count: 1000,
        call_site_count: 5,
        ..small_callee
    };
    assert!(!should_inline(0, large_callee, hot, &config));
}

/// S6 — three polymorphic variants of counts 100, 50, 1: the two
/// hottest are inlined behind class-id-equality branches, and the
/// coldest is left as a fallback polymorphic call.
#[test]
fn polymorphic_expansion_inlines_two_and_leaves_one_fallback() {
    let mut graph = Graph::new();
    let receiver = graph.push(Instr::Other);
    let hot_body = graph.push(Instr::Other);
    let warm_body = graph.push(Instr::Other);
    let variants = vec![
        PolyVariant {
            class_id: predefined::ARRAY,
            target: "hot".to_string(),
            count: 100,
        },
        PolyVariant {
            class_id: predefined::STRING,
            target: "warm".to_string(),
            count: 50,
        },
        PolyVariant {
            class_id: predefined::GROWABLE_OBJECT_ARRAY,
            target: "cold".to_string(),
            count: 1,
        },
    ];
    let mut inlined_bodies = HashMap::new();
    inlined_bodies.insert("hot".to_string(), hot_body);
    inlined_bodies.insert("warm".to_string(), warm_body);

    let dag = build_decision_dag(&mut graph, receiver, &variants, &inlined_bodies);

    let Instr::ClassIdEquals {
        class_id: first_cid,
        otherwise: next,
        ..
    } = graph.nodes[dag]
    else {
        panic!("expected the hottest variant's equality branch first");
    };
    assert_eq!(first_cid, predefined::ARRAY);

    let Instr::ClassIdEquals {
        class_id: second_cid,
        otherwise: fallback,
        ..
    } = graph.nodes[next]
    else {
        panic!("expected a second branch for the warm variant");
    };
    assert_eq!(second_cid, predefined::STRING);

    let Instr::FallbackPolymorphicCall { remaining_variants, .. } = &graph.nodes[fallback] else {
        panic!("expected the fallback tail to carry only the cold variant");
    };
    assert_eq!(remaining_variants.len(), 1);
    assert_eq!(remaining_variants[0].target, "cold");
}

/// Exercises the front end's code-generation side end to end: a
/// finalized class's method gets a stub code object with a findable
/// `Return` descriptor.
#[test]
fn stub_code_generator_is_reachable_after_finalization() {
    let mut table = ClassTable::new();
    {
        let mut builder = ClassBuilder::new(&mut table);
        let object = builder.new_class("Object", 0);
        let widget = builder.new_class("Widget", 0);
        builder.add_super(widget, "Object");
        let _ = object;
    }
    finalize(&mut table);

    let generator = StubCodeGenerator::new();
    let code = generator.finalize_code("Widget.paint", vec![0; 4]);
    assert!(code.find_pc_descriptor(3, PcDescriptorKind::Return).is_some());
}
