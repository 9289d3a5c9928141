// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Polymorphic instance-call expansion into a decision DAG (spec §4.5
//! "Polymorphic expansion").

use super::ssa::{Graph, Instr, NodeId, PolyVariant};
use crate::object::ClassId;
use std::collections::HashMap;

/// Builds the decision DAG for a polymorphic instance call whose
/// variants are already sorted by count (the caller's job — this
/// function only expands them).
///
/// `inlined_bodies` gives, for each variant that was chosen for
/// inlining (spec §4.5's should-inline heuristic applied per variant),
/// the entry node of its spliced body. Variants sharing a target that
/// was already inlined share that body's entry instead of getting a
/// second copy (point 1, "share the body by converting its original
/// entry into a join entry").
pub fn build_decision_dag(
    graph: &mut Graph,
    receiver: NodeId,
    variants: &[PolyVariant],
    inlined_bodies: &HashMap<String, NodeId>,
) -> NodeId {
    let mut shared_bodies: HashMap<String, NodeId> = HashMap::new();
    for variant in variants {
        if let Some(&body) = inlined_bodies.get(&variant.target) {
            shared_bodies
                .entry(variant.target.clone())
                .or_insert_with(|| graph.push(Instr::Join { inputs: vec![body] }));
        }
    }

    let inlined: Vec<(&PolyVariant, NodeId)> = variants
        .iter()
        .filter_map(|v| shared_bodies.get(&v.target).map(|&body| (v, body)))
        .collect();
    let remaining: Vec<PolyVariant> = variants
        .iter()
        .filter(|v| !shared_bodies.contains_key(&v.target))
        .cloned()
        .collect();

    if inlined.is_empty() {
        return graph.push(Instr::FallbackPolymorphicCall {
            receiver,
            remaining_variants: remaining,
        });
    }

    let fallback = if remaining.is_empty() {
        None
    } else {
        Some(graph.push(Instr::FallbackPolymorphicCall {
            receiver,
            remaining_variants: remaining,
        }))
    };

    // Point 2: every inlined variant but the last gets a strict
    // equality branch; the last ends in a type guard, unconditionally
    // followed by its body, only when no fallback is needed.
    let (last, head) = inlined.split_last().expect("checked non-empty above");

    let mut dag = if let Some(fallback) = fallback {
        build_equality_branch(graph, receiver, last.0.class_id, last.1, fallback)
    } else {
        graph.push(Instr::TypeGuard {
            receiver,
            class_id: last.0.class_id,
            then_body: last.1,
        })
    };

    for (variant, body) in head.iter().rev() {
        dag = build_equality_branch(graph, receiver, variant.class_id, *body, dag);
    }
    dag
}

fn build_equality_branch(
    graph: &mut Graph,
    receiver: NodeId,
    class_id: ClassId,
    then_body: NodeId,
    otherwise: NodeId,
) -> NodeId {
    graph.push(Instr::ClassIdEquals {
        receiver,
        class_id,
        then_body,
        otherwise,
    })
}
