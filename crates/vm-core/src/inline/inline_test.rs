// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

use super::poly::build_decision_dag;
use super::ssa::{Graph, Instr, PolyVariant};
use super::{collect_call_sites, inline_static_call, should_inline, CalleeInfo, CallSiteKind, InlineConfig};
use crate::object::{predefined, Value};
use std::collections::HashMap;

fn base_callee() -> CalleeInfo {
    CalleeInfo {
        instruction_count: 5,
        call_site_count: 0,
        constant_actual_count: 0,
        is_inlinable: true,
        is_always_inline: false,
        inside_try_block: false,
        deopt_count: 0,
    }
}

fn hot_site(node: usize) -> super::CallSite {
    super::CallSite {
        node,
        kind: CallSiteKind::Static,
        count: 100,
        hotness_ratio: 1.0,
    }
}

#[test]
fn small_callee_is_inlined() {
    let config = InlineConfig::default();
    assert!(should_inline(0, base_callee(), hot_site(0), &config));
}

#[test]
fn non_inlinable_callee_is_rejected() {
    let config = InlineConfig::default();
    let mut callee = base_callee();
    callee.is_inlinable = false;
    assert!(!should_inline(0, callee, hot_site(0), &config));
}

#[test]
fn callee_over_deopt_threshold_is_rejected() {
    let config = InlineConfig::default();
    let mut callee = base_callee();
    callee.deopt_count = config.deopt_threshold;
    assert!(!should_inline(0, callee, hot_site(0), &config));
}

#[test]
fn cold_call_site_is_rejected() {
    let config = InlineConfig::default();
    let cold = super::CallSite {
        node: 0,
        kind: CallSiteKind::Static,
        count: 0,
        hotness_ratio: 0.0,
    };
    assert!(!should_inline(0, base_callee(), cold, &config));
}

#[test]
fn caller_at_size_ceiling_is_rejected() {
    let config = InlineConfig::default();
    assert!(!should_inline(config.caller_size_ceiling, base_callee(), hot_site(0), &config));
}

#[test]
fn large_callee_with_few_call_sites_is_still_inlined() {
    let config = InlineConfig::default();
    let mut callee = base_callee();
    callee.instruction_count = config.callee_size_threshold + 50;
    callee.call_site_count = config.call_sites_threshold;
    assert!(should_inline(0, callee, hot_site(0), &config));
}

#[test]
fn always_inline_flag_bypasses_size_gates() {
    let config = InlineConfig::default();
    let mut callee = base_callee();
    callee.instruction_count = u32::MAX;
    callee.call_site_count = u32::MAX;
    callee.is_always_inline = true;
    assert!(should_inline(0, callee, hot_site(0), &config));
}

#[test]
fn hotness_ratio_is_relative_to_the_hottest_site_in_the_batch() {
    let mut graph = Graph::new();
    let a = graph.push(Instr::StaticCall {
        target: "a".to_string(),
        args: Vec::new(),
    });
    let b = graph.push(Instr::StaticCall {
        target: "b".to_string(),
        args: Vec::new(),
    });
    let mut counts = HashMap::new();
    counts.insert(a, 100);
    counts.insert(b, 25);

    let collected = collect_call_sites(&graph, &counts);
    let ratio_a = collected.static_calls.iter().find(|s| s.node == a).unwrap().hotness_ratio;
    let ratio_b = collected.static_calls.iter().find(|s| s.node == b).unwrap().hotness_ratio;
    assert_eq!(ratio_a, 1.0);
    assert_eq!(ratio_b, 0.25);
}

#[test]
fn splicing_a_static_call_replaces_it_with_the_callees_body() {
    let mut caller = Graph::new();
    let arg = caller.push(Instr::Constant(Value::Smi(7)));
    let call = caller.push(Instr::StaticCall {
        target: "double".to_string(),
        args: vec![arg],
    });

    let mut callee = Graph::new();
    let param = callee.push(Instr::Parameter(0));
    let ret = callee.push(Instr::Return(param));
    callee.returns.push(ret);

    let exit = inline_static_call(&mut caller, call, &callee, 1, &[]).unwrap();
    let Instr::Return(value_node) = caller.nodes[exit] else {
        panic!("expected the spliced callee's return node");
    };
    assert_eq!(caller.nodes[value_node], Instr::Constant(Value::Smi(7)));
    assert!(matches!(caller.nodes[call], Instr::Join { .. }));
}

#[test]
fn optional_parameter_falls_back_to_default_when_omitted() {
    let mut caller = Graph::new();
    let call = caller.push(Instr::StaticCall {
        target: "greet".to_string(),
        args: Vec::new(),
    });

    let mut callee = Graph::new();
    let param = callee.push(Instr::Parameter(0));
    let ret = callee.push(Instr::Return(param));
    callee.returns.push(ret);

    let exit = inline_static_call(&mut caller, call, &callee, 0, &[Value::Smi(42)]).unwrap();
    let Instr::Return(value_node) = caller.nodes[exit] else {
        panic!("expected a return node");
    };
    assert_eq!(caller.nodes[value_node], Instr::Constant(Value::Smi(42)));
}

#[test]
fn mismatched_argument_count_fails_inlining() {
    let mut caller = Graph::new();
    let call = caller.push(Instr::StaticCall {
        target: "needs_one".to_string(),
        args: Vec::new(),
    });
    let mut callee = Graph::new();
    let param = callee.push(Instr::Parameter(0));
    let ret = callee.push(Instr::Return(param));
    callee.returns.push(ret);

    let err = inline_static_call(&mut caller, call, &callee, 1, &[]).unwrap_err();
    assert_eq!(err, super::InlineFailure::ArgumentCountMismatch);
}

#[test]
fn decision_dag_ends_in_type_guard_when_no_variants_remain() {
    let mut graph = Graph::new();
    let receiver = graph.push(Instr::Other);
    let body_a = graph.push(Instr::Other);
    let body_b = graph.push(Instr::Other);
    let variants = vec![
        PolyVariant {
            class_id: predefined::ARRAY,
            target: "a".to_string(),
            count: 10,
        },
        PolyVariant {
            class_id: predefined::STRING,
            target: "b".to_string(),
            count: 5,
        },
    ];
    let mut inlined_bodies = HashMap::new();
    inlined_bodies.insert("a".to_string(), body_a);
    inlined_bodies.insert("b".to_string(), body_b);

    let dag = build_decision_dag(&mut graph, receiver, &variants, &inlined_bodies);
    assert!(matches!(graph.nodes[dag], Instr::ClassIdEquals { .. }));
    let Instr::ClassIdEquals { otherwise, .. } = graph.nodes[dag] else {
        unreachable!()
    };
    assert!(matches!(graph.nodes[otherwise], Instr::TypeGuard { .. }));
}

#[test]
fn decision_dag_keeps_a_fallback_for_uninlined_variants() {
    let mut graph = Graph::new();
    let receiver = graph.push(Instr::Other);
    let body_a = graph.push(Instr::Other);
    let variants = vec![
        PolyVariant {
            class_id: predefined::ARRAY,
            target: "a".to_string(),
            count: 10,
        },
        PolyVariant {
            class_id: predefined::STRING,
            target: "b".to_string(),
            count: 1,
        },
    ];
    let mut inlined_bodies = HashMap::new();
    inlined_bodies.insert("a".to_string(), body_a);

    let dag = build_decision_dag(&mut graph, receiver, &variants, &inlined_bodies);
    let Instr::ClassIdEquals { otherwise, .. } = graph.nodes[dag] else {
        panic!("expected an equality branch when a fallback remains");
    };
    assert!(matches!(
        graph.nodes[otherwise],
        Instr::FallbackPolymorphicCall { .. }
    ));
}
