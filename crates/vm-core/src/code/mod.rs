// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The code-object model and architecture-neutral patcher (spec §4.4).

#[cfg(test)]
mod code_test;

pub mod patcher;

use crate::object::Value;

/// What a [`PcDescriptor`] marks a program counter as (spec §4.4 "PC
/// descriptors").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcDescriptorKind {
    Deopt,
    EntryPatch,
    PatchCode,
    LazyDeoptJump,
    IcCall,
    UnoptimizedStaticCall,
    OptimizedStaticCall,
    ClosureCall,
    RuntimeCall,
    Return,
    OsrEntry,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcDescriptor {
    pub pc_offset: u32,
    pub kind: PcDescriptorKind,
    pub deopt_id: u32,
    pub token_pos: u32,
    pub try_index: i32,
}

/// One instruction of a deopt-info blob: a prefix of
/// `MaterializeObject` entries followed by `CopyFromOptimizedFrame`
/// entries that fill the unoptimized frame (spec §4.4
/// "Deoptimization").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeoptInstruction {
    MaterializeObject { class_slot_count: u32 },
    CopyFromOptimizedFrame { from_index: u32 },
    Constant { value_pool_index: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeoptInfo {
    pub deopt_id: u32,
    pub instructions: Vec<DeoptInstruction>,
}

/// A bit per stack slot marking whether it holds a tagged pointer, read
/// by the scavenger at a safepoint (spec §5 "the compiler must
/// materialize a stack map").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackMapEntry {
    pub pc_offset: u32,
    pub tagged_slots: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionHandler {
    pub try_index: i32,
    pub pc_offset: u32,
    pub needs_stacktrace: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVarDescriptor {
    pub name: String,
    pub frame_slot: i32,
    pub scope_start_pc: u32,
    pub scope_end_pc: u32,
}

/// One entry of the static-call target table (spec §4.4 "a static-call
/// target table (tuples of instruction-offset, function, code)").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCallEntry {
    pub pc_offset: u32,
    pub target_function: String,
    /// `None` until the target itself has compiled code attached.
    pub target_code: Option<usize>,
}

/// A compiled function's code object: an instruction blob plus the
/// side-tables the runtime and the inliner/deoptimizer consult.
#[derive(Debug, Clone, Default)]
pub struct CodeObject {
    pub instructions: Vec<u8>,
    pub object_pool: Vec<Value>,
    pub pc_descriptors: Vec<PcDescriptor>,
    pub deopt_info: Vec<DeoptInfo>,
    pub stack_maps: Vec<StackMapEntry>,
    pub exception_handlers: Vec<ExceptionHandler>,
    pub local_variables: Vec<LocalVarDescriptor>,
    pub static_calls: Vec<StaticCallEntry>,
    pub comments: Vec<(u32, String)>,
    /// Incremented each time a live optimized frame is kicked back to
    /// unoptimized code; read by the inliner's deopt-threshold gate.
    pub deopt_count: u32,
    pub is_optimized: bool,
}

impl CodeObject {
    #[must_use]
    pub fn new(instructions: Vec<u8>) -> Self {
        Self {
            instructions,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn find_pc_descriptor(&self, pc_offset: u32, kind: PcDescriptorKind) -> Option<&PcDescriptor> {
        self.pc_descriptors
            .iter()
            .find(|d| d.pc_offset == pc_offset && d.kind == kind)
    }

    /// Switches this code object to unoptimized and records the
    /// deoptimization (spec §4.3 "CHA dependence invalidation": "…
    /// deoptimizes any live optimized frames, and switches the method
    /// to unoptimized code").
    pub fn deoptimize(&mut self) {
        self.is_optimized = false;
        self.deopt_count += 1;
    }
}
