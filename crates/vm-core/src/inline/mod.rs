// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The optimizing call-site inliner (spec §4.5): call-site collection
//! over the caller's SSA graph, a should-inline heuristic, callee graph
//! construction and splicing, and polymorphic decision-DAG expansion.

#[cfg(test)]
mod inline_test;

pub mod poly;
pub mod ssa;

use ssa::{Graph, Instr, NodeId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSiteKind {
    Static,
    Closure,
    Polymorphic,
}

/// A recorded call site plus its hotness ratio (spec §4.5 "Call-site
/// collection"): `site_count / max_count` in the batch, or zero if no
/// site executed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallSite {
    pub node: NodeId,
    pub kind: CallSiteKind,
    pub count: u64,
    pub hotness_ratio: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CollectedCallSites {
    pub static_calls: Vec<CallSite>,
    pub closure_calls: Vec<CallSite>,
    pub polymorphic_calls: Vec<CallSite>,
}

/// Walks `graph` once in post-order, bucketing static, closure, and
/// polymorphic instance calls and stamping each with its hotness ratio
/// against the batch's hottest site.
#[must_use]
pub fn collect_call_sites(graph: &Graph, counts: &HashMap<NodeId, u64>) -> CollectedCallSites {
    let mut raw: Vec<(NodeId, CallSiteKind, u64)> = Vec::new();
    for node in graph.post_order() {
        let kind = match &graph.nodes[node] {
            Instr::StaticCall { .. } => CallSiteKind::Static,
            Instr::ClosureCall { .. } => CallSiteKind::Closure,
            Instr::PolymorphicInstanceCall { .. } => CallSiteKind::Polymorphic,
            _ => continue,
        };
        raw.push((node, kind, counts.get(&node).copied().unwrap_or(0)));
    }

    let max_count = raw.iter().map(|(_, _, c)| *c).max().unwrap_or(0);
    let mut collected = CollectedCallSites::default();
    for (node, kind, count) in raw {
        let hotness_ratio = if max_count == 0 {
            0.0
        } else {
            count as f64 / max_count as f64
        };
        let site = CallSite {
            node,
            kind,
            count,
            hotness_ratio,
        };
        match kind {
            CallSiteKind::Static => collected.static_calls.push(site),
            CallSiteKind::Closure => collected.closure_calls.push(site),
            CallSiteKind::Polymorphic => collected.polymorphic_calls.push(site),
        }
    }
    collected
}

/// Configured thresholds for the should-inline heuristic and the
/// depth-bounded driver (spec §4.5).
#[derive(Debug, Clone, Copy)]
pub struct InlineConfig {
    pub caller_size_ceiling: u32,
    pub callee_size_threshold: u32,
    pub call_sites_threshold: u32,
    pub constant_arg_threshold: u32,
    pub constant_arg_size_threshold: u32,
    pub deopt_threshold: u32,
    pub hotness_percentile: f64,
    pub max_depth: u32,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            caller_size_ceiling: 200,
            callee_size_threshold: 30,
            call_sites_threshold: 1,
            constant_arg_threshold: 1,
            constant_arg_size_threshold: 60,
            deopt_threshold: 2,
            hotness_percentile: 0.1,
            max_depth: 4,
        }
    }
}

/// What the inliner needs to know about a candidate callee, independent
/// of its actual compiled body.
#[derive(Debug, Clone, Copy)]
pub struct CalleeInfo {
    pub instruction_count: u32,
    pub call_site_count: u32,
    pub constant_actual_count: u32,
    pub is_inlinable: bool,
    pub is_always_inline: bool,
    pub inside_try_block: bool,
    pub deopt_count: u32,
}

/// Spec §4.5 "Should-inline heuristic" plus its additional gates, all
/// as a single boolean predicate.
#[must_use]
#[allow(clippy::suspicious_operation_groupings, reason = "the threshold fields are intentionally compared once each")]
pub fn should_inline(
    caller_accumulated_size: u32,
    callee: CalleeInfo,
    call_site: CallSite,
    config: &InlineConfig,
) -> bool {
    if !callee.is_inlinable || callee.inside_try_block || callee.deopt_count >= config.deopt_threshold
    {
        return false;
    }
    if call_site.hotness_ratio < config.hotness_percentile {
        return false;
    }

    let under_caller_ceiling = caller_accumulated_size < config.caller_size_ceiling;
    if !under_caller_ceiling {
        return false;
    }

    callee.instruction_count <= config.callee_size_threshold
        || callee.call_site_count <= config.call_sites_threshold
        || (callee.constant_actual_count >= config.constant_arg_threshold
            && callee.instruction_count <= config.constant_arg_size_threshold)
        || callee.is_always_inline
}

/// A parameter stub: either a constant fed straight from the caller's
/// constant pool, or a true parameter node rooted at the callee's
/// entry (spec §4.5 "Callee graph construction").
#[derive(Debug, Clone, PartialEq)]
enum ParamStub {
    Constant(crate::object::Value),
    Argument(NodeId),
}

/// Why a requested inline did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineFailure {
    ArgumentCountMismatch,
    CallSiteNotFound,
    NotAStaticCall,
}

/// Builds parameter stubs for a static call's actual arguments,
/// applying optional-parameter adaptation (spec §4.5
/// "Optional-parameter adaptation"): present positional actuals fill
/// stubs in order, missing trailing positions get `default`.
fn build_parameter_stubs(
    args: &[NodeId],
    caller: &Graph,
    required_count: usize,
    optional_defaults: &[crate::object::Value],
) -> Result<Vec<ParamStub>, InlineFailure> {
    let max_params = required_count + optional_defaults.len();
    if args.len() < required_count || args.len() > max_params {
        return Err(InlineFailure::ArgumentCountMismatch);
    }
    let mut stubs = Vec::with_capacity(max_params);
    for &arg in args {
        stubs.push(match &caller.nodes[arg] {
            Instr::Constant(v) => ParamStub::Constant(*v),
            _ => ParamStub::Argument(arg),
        });
    }
    for default in optional_defaults.iter().skip(args.len().saturating_sub(required_count)) {
        stubs.push(ParamStub::Constant(*default));
    }
    Ok(stubs)
}

/// Splices `callee` into `caller` at `site_node` (which must be a
/// `StaticCall`), replacing parameter nodes with the built stubs and
/// routing every callee return through a single exit node (spec §4.5
/// "Splicing").
pub fn inline_static_call(
    caller: &mut Graph,
    site_node: NodeId,
    callee: &Graph,
    required_count: usize,
    optional_defaults: &[crate::object::Value],
) -> Result<NodeId, InlineFailure> {
    let args = match caller.nodes.get(site_node) {
        Some(Instr::StaticCall { args, .. }) => args.clone(),
        Some(_) => return Err(InlineFailure::NotAStaticCall),
        None => return Err(InlineFailure::CallSiteNotFound),
    };
    let stubs = build_parameter_stubs(&args, caller, required_count, optional_defaults)?;

    let mut remap: HashMap<NodeId, NodeId> = HashMap::new();
    for (old_id, instr) in callee.nodes.iter().enumerate() {
        let new_id = match instr {
            Instr::Parameter(index) => {
                let stub = &stubs[*index as usize];
                match stub {
                    ParamStub::Constant(v) => caller.push(Instr::Constant(*v)),
                    ParamStub::Argument(arg) => *arg,
                }
            }
            other => {
                let remapped = remap_instr(other, &remap);
                caller.push(remapped)
            }
        };
        remap.insert(old_id, new_id);
    }

    let return_nodes: Vec<NodeId> = callee
        .returns
        .iter()
        .filter_map(|r| remap.get(r).copied())
        .collect();
    let exit = if return_nodes.len() == 1 {
        return_nodes[0]
    } else {
        caller.push(Instr::Join { inputs: return_nodes })
    };

    caller.nodes[site_node] = Instr::Join { inputs: vec![exit] };
    Ok(exit)
}

fn remap_instr(instr: &Instr, remap: &HashMap<NodeId, NodeId>) -> Instr {
    let r = |id: &NodeId| remap.get(id).copied().unwrap_or(*id);
    match instr {
        Instr::StaticCall { target, args } => Instr::StaticCall {
            target: target.clone(),
            args: args.iter().map(r).collect(),
        },
        Instr::ClosureCall { args } => Instr::ClosureCall {
            args: args.iter().map(r).collect(),
        },
        Instr::PolymorphicInstanceCall { receiver, variants } => Instr::PolymorphicInstanceCall {
            receiver: r(receiver),
            variants: variants.clone(),
        },
        Instr::Join { inputs } => Instr::Join {
            inputs: inputs.iter().map(r).collect(),
        },
        Instr::ClassIdEquals {
            receiver,
            class_id,
            then_body,
            otherwise,
        } => Instr::ClassIdEquals {
            receiver: r(receiver),
            class_id: *class_id,
            then_body: r(then_body),
            otherwise: r(otherwise),
        },
        Instr::TypeGuard {
            receiver,
            class_id,
            then_body,
        } => Instr::TypeGuard {
            receiver: r(receiver),
            class_id: *class_id,
            then_body: r(then_body),
        },
        Instr::FallbackPolymorphicCall {
            receiver,
            remaining_variants,
        } => Instr::FallbackPolymorphicCall {
            receiver: r(receiver),
            remaining_variants: remaining_variants.clone(),
        },
        Instr::Return(value) => Instr::Return(r(value)),
        Instr::Constant(v) => Instr::Constant(*v),
        Instr::DefaultValue(v) => Instr::DefaultValue(*v),
        Instr::Parameter(p) => Instr::Parameter(*p),
        Instr::Other => Instr::Other,
    }
}
