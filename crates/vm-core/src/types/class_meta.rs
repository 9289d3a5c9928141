// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! The class record (spec §3 "Class metadata").

use super::Type;
use crate::object::ClassId;

/// A class's progress through `allocated → type-finalized → finalized`
/// (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ClassFinalizationState {
    Allocated,
    TypeFinalized,
    Finalized,
}

/// The flag bitfield named in spec §3, kept as plain bools rather than
/// hand-packed bits: nothing here shares a machine word with compiled
/// code, so there is no layout reason to pack them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassFlags {
    pub is_const: bool,
    pub is_abstract: bool,
    pub is_mixin_application: bool,
    pub is_mixin_typedef: bool,
    pub is_mixin_type_applied: bool,
    pub is_synthesized: bool,
    pub is_marked_for_parsing: bool,
    pub is_patch: bool,
    pub is_implemented: bool,
}

/// A declared type parameter, with its bound (defaults to `dynamic`,
/// the top type, until resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameterDecl {
    pub name: String,
    pub bound: Type,
}

impl TypeParameterDecl {
    #[must_use]
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: Type::dynamic(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMetadata {
    pub name: String,
    pub declared_type: Type,
    pub is_static: bool,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMetadata {
    pub name: String,
    pub declared_type: Type,
    pub is_optional: bool,
    pub is_named: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMetadata {
    pub name: String,
    pub parameters: Vec<ParameterMetadata>,
    pub result_type: Type,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_factory: bool,
    pub is_const: bool,
    /// If this is a redirecting factory, the name of the constructor or
    /// factory it redirects to (spec §4.3 "Redirecting factories").
    /// Updated in place to the terminal target once resolved.
    pub redirect_target: Option<String>,
    /// Set once member resolution (spec §4.3 "Member resolution &
    /// overrides") has checked this function against its overridden
    /// counterparts in the super chain.
    pub overrides_checked: bool,
}

impl FunctionMetadata {
    #[must_use]
    pub fn simple(name: impl Into<String>, parameters: Vec<ParameterMetadata>) -> Self {
        Self {
            name: name.into(),
            parameters,
            result_type: Type::dynamic(),
            is_static: false,
            is_abstract: false,
            is_factory: false,
            is_const: false,
            redirect_target: None,
            overrides_checked: false,
        }
    }
}

/// A class record (spec §3 "Class metadata"). Everything the finalizer
/// needs to drive a class from `allocated` to `finalized` lives here;
/// the allocation-stub pointer and instance layout that the allocator
/// (C1) and code objects (C4) would consume are represented narrowly
/// (`instance_size_words`, `next_field_offset`) since this port does not
/// model a machine-code allocation stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetadata {
    pub name: String,
    pub script_origin: u32,
    pub type_parameters: Vec<TypeParameterDecl>,
    pub super_type: Option<Type>,
    pub mixin: Option<Type>,
    /// The original `with M1, M2, …` clause of a not-yet-synthesized
    /// declaration (spec §4.3 Step B). Drained to empty once the
    /// finalizer has rewritten this class's `super_type` through the
    /// chain of synthesized `S&M` classes.
    pub declared_mixins: Vec<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldMetadata>,
    pub functions: Vec<FunctionMetadata>,
    /// Number of type parameters of this class plus all its super
    /// classes — the length of the flattened type-argument vector.
    pub num_type_arguments: u32,
    pub instance_size_words: u32,
    pub next_field_offset: u32,
    pub canonical_instantiations: Vec<super::TypeArguments>,
    pub state: ClassFinalizationState,
    pub flags: ClassFlags,
    /// Direct subclasses, grown (never shrunk) as later classes join the
    /// hierarchy; read by the inliner's CHA invalidation.
    pub direct_subclasses: Vec<ClassId>,
}

impl ClassMetadata {
    /// A minimal record for a built-in class id, already finalized.
    /// Predefined cids never run through the finalizer.
    #[must_use]
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script_origin: 0,
            type_parameters: Vec::new(),
            super_type: None,
            mixin: None,
            declared_mixins: Vec::new(),
            interfaces: Vec::new(),
            fields: Vec::new(),
            functions: Vec::new(),
            num_type_arguments: 0,
            instance_size_words: 0,
            next_field_offset: 0,
            canonical_instantiations: Vec::new(),
            state: ClassFinalizationState::Finalized,
            flags: ClassFlags::default(),
            direct_subclasses: Vec::new(),
        }
    }

    /// A user-declared class, freshly parsed and awaiting finalization.
    #[must_use]
    pub fn pending(name: impl Into<String>, super_type: Option<Type>) -> Self {
        Self {
            name: name.into(),
            script_origin: 0,
            type_parameters: Vec::new(),
            super_type,
            mixin: None,
            declared_mixins: Vec::new(),
            interfaces: Vec::new(),
            fields: Vec::new(),
            functions: Vec::new(),
            num_type_arguments: 0,
            instance_size_words: 0,
            next_field_offset: 0,
            canonical_instantiations: Vec::new(),
            state: ClassFinalizationState::Allocated,
            flags: ClassFlags::default(),
            direct_subclasses: Vec::new(),
        }
    }

    /// A user-declared class with a `with M1, M2, …` mixin clause,
    /// rewritten into synthesized `S&M` classes by
    /// [`super::ClassFinalizer::finalize_pending_classes`].
    #[must_use]
    pub fn pending_with_mixins(
        name: impl Into<String>,
        super_type: Type,
        mixins: Vec<Type>,
    ) -> Self {
        let mut class = Self::pending(name, Some(super_type));
        class.declared_mixins = mixins;
        class
    }
}
