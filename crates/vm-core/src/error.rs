// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! Crate-wide error types.
//!
//! "Long-jump base" in the source VM becomes, in this port, a plain
//! `Result<T, VmError>` chain: each phase (class finalization, inlining,
//! the test front end) is already structured as a function that can bail
//! with `?`. There is no non-local control transfer to model.

use crate::types::TypeError;
use std::fmt;

/// A source position within a (conceptual) script, used to stamp
/// compile errors and runtime type errors the way the source VM stamps
/// a token position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePos {
    /// Script/library identifier the position is relative to.
    pub script: u32,
    /// Token offset within the script.
    pub token_pos: u32,
}

/// A fatal error raised while resolving or finalizing classes and types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeError {
    /// A super-type, interface, or typedef chain cycles back on itself.
    CyclicInheritance { class: String },
    /// A built-in class outside the core library may not be extended or
    /// implemented (spec §4.3 Step A).
    ExtendsSealedBuiltin { class: String },
    /// Duplicate entries in an `implements` clause.
    DuplicateInterface { class: String },
    /// An interface identical to the super type.
    InterfaceEqualsSuper { class: String },
    /// A type-argument bound check failed unconditionally.
    BoundViolation {
        type_name: String,
        bound_name: String,
    },
    /// A mixin application's cloned parameter declared a non-top bound
    /// (spec §9 Open Question 1 — rejected, matching the source).
    MixinParameterBoundUnsupported { parameter: String },
    /// A redirecting factory's redirection chain cycles.
    CyclicFactoryRedirection { factory: String },
    /// A const factory redirects to a non-const target.
    ConstFactoryRedirectsToNonConst { factory: String },
    /// Member resolution found a fatal override conflict (spec §7).
    OverrideConflict {
        member: String,
        reason: &'static str,
    },
}

impl fmt::Display for FinalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CyclicInheritance { class } => write!(f, "cyclic inheritance at '{class}'"),
            Self::ExtendsSealedBuiltin { class } => {
                write!(f, "'{class}' may not extend or implement a sealed builtin")
            }
            Self::DuplicateInterface { class } => {
                write!(f, "duplicate interface on '{class}'")
            }
            Self::InterfaceEqualsSuper { class } => {
                write!(f, "interface identical to super type on '{class}'")
            }
            Self::BoundViolation { type_name, bound_name } => {
                write!(f, "'{type_name}' does not satisfy bound '{bound_name}'")
            }
            Self::MixinParameterBoundUnsupported { parameter } => {
                write!(f, "bound on cloned mixin parameter '{parameter}' is unsupported")
            }
            Self::CyclicFactoryRedirection { factory } => {
                write!(f, "cyclic factory redirection at '{factory}'")
            }
            Self::ConstFactoryRedirectsToNonConst { factory } => {
                write!(f, "const factory '{factory}' redirects to a non-const target")
            }
            Self::OverrideConflict { member, reason } => {
                write!(f, "override conflict on '{member}': {reason}")
            }
        }
    }
}

impl std::error::Error for FinalizeError {}

/// Top-level error kinds a mutator can observe (spec §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// A compile-time (language) error, fatal for the enclosing load.
    Compile(FinalizeError),
    /// A runtime type error from a failed checked cast or bound check.
    RuntimeType(TypeError),
    /// Allocation failed persistently after a retry.
    OutOfMemory,
    /// A stack-overflow check at function entry tripped.
    StackOverflow,
    /// A user exception propagated out of a call.
    Unhandled { message: String },
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile(e) => write!(f, "compile error: {e}"),
            Self::RuntimeType(e) => write!(f, "type error: {e}"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::StackOverflow => write!(f, "stack overflow"),
            Self::Unhandled { message } => write!(f, "unhandled exception: {message}"),
        }
    }
}

impl std::error::Error for VmError {}

impl From<FinalizeError> for VmError {
    fn from(e: FinalizeError) -> Self {
        Self::Compile(e)
    }
}

impl From<TypeError> for VmError {
    fn from(e: TypeError) -> Self {
        Self::RuntimeType(e)
    }
}

