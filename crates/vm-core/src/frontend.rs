// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! A minimal front end standing in for the excluded parser/assembler
//! (spec §6 "Minimal front-end for exercising the core").
//!
//! [`ClassBuilder`] mirrors the `Parser` contract 1:1 (`new_class`,
//! `add_super`, `add_interface`, `add_type_parameter`, `add_field`,
//! `add_function`) so integration tests and the CLI's demo mode can
//! populate a [`ClassTable`]'s pending list without a concrete-syntax
//! parser. [`StubCodeGenerator`] stands in for the assembler, handing
//! back a [`CodeObject`] with an opaque instruction blob but correctly
//! populated side-tables.

use crate::class_table::ClassTable;
use crate::code::{CodeObject, PcDescriptor, PcDescriptorKind};
use crate::object::ClassId;
use crate::types::{ClassMetadata, FunctionMetadata, ParameterMetadata, FieldMetadata, Type, TypeParameterDecl};

/// Builds pending classes directly into a [`ClassTable`], the role the
/// real parser plays feeding `FinalizePendingClasses` (spec §4.3).
pub struct ClassBuilder<'a> {
    table: &'a mut ClassTable,
}

impl<'a> ClassBuilder<'a> {
    pub fn new(table: &'a mut ClassTable) -> Self {
        Self { table }
    }

    /// Registers a fresh pending class with no super type yet (call
    /// [`Self::add_super`] to set one before finalization runs).
    pub fn new_class(&mut self, name: impl Into<String>, script: u32) -> ClassId {
        let mut class = ClassMetadata::pending(name, None);
        class.script_origin = script;
        self.table.register_pending(class)
    }

    /// Sets `class`'s super type to a reference to `super_name`, which
    /// must already be registered (built-in or a previously-built
    /// class) — the parser's job of resolving a name against the
    /// declaring library, reduced to a table lookup.
    pub fn add_super(&mut self, class: ClassId, super_name: &str) {
        let super_cid = self.find_by_name(super_name);
        if let Some(c) = self.table.get_mut(class) {
            c.super_type = Some(Type::parameterized(super_cid, None));
        }
    }

    /// Appends a `with M1, M2, …` mixin to `class`'s declared-mixins
    /// list (spec §4.3 Step B input).
    pub fn add_mixin(&mut self, class: ClassId, mixin_name: &str) {
        let mixin_cid = self.find_by_name(mixin_name);
        if let Some(c) = self.table.get_mut(class) {
            c.declared_mixins.push(Type::parameterized(mixin_cid, None));
        }
    }

    pub fn add_interface(&mut self, class: ClassId, interface_name: &str) {
        let iface_cid = self.find_by_name(interface_name);
        if let Some(c) = self.table.get_mut(class) {
            c.interfaces.push(Type::parameterized(iface_cid, None));
        }
    }

    pub fn add_type_parameter(&mut self, class: ClassId, name: impl Into<String>, bound: Option<Type>) {
        let decl = TypeParameterDecl {
            name: name.into(),
            bound: bound.unwrap_or_else(Type::dynamic),
        };
        if let Some(c) = self.table.get_mut(class) {
            c.type_parameters.push(decl);
        }
    }

    pub fn add_field(&mut self, class: ClassId, field: FieldMetadata) {
        if let Some(c) = self.table.get_mut(class) {
            c.fields.push(field);
        }
    }

    pub fn add_function(&mut self, class: ClassId, function: FunctionMetadata) {
        if let Some(c) = self.table.get_mut(class) {
            c.functions.push(function);
        }
    }

    fn find_by_name(&self, name: &str) -> ClassId {
        for i in 0..self.table.len() {
            let cid = ClassId(i as u16);
            if self.table.get(cid).is_some_and(|c| c.name == name) {
                return cid;
            }
        }
        panic!("front end: unresolved class reference '{name}' — built-ins and earlier new_class calls only");
    }
}

/// Convenience constructor matching `Parser::add_function`'s usual
/// shape, for callers that don't want to build a [`ParameterMetadata`]
/// vector by hand.
#[must_use]
pub fn simple_parameter(name: impl Into<String>, is_optional: bool) -> ParameterMetadata {
    ParameterMetadata {
        name: name.into(),
        declared_type: Type::dynamic(),
        is_optional,
        is_named: false,
    }
}

/// Stands in for the assembler (spec §6 `finalize_code(name, buffer) ->
/// code_object`): hands back a [`CodeObject`] whose instruction blob is
/// opaque bytes, with one synthesized `Return` descriptor at its last
/// offset so [`CodeObject::find_pc_descriptor`] has something real to
/// find in tests.
#[derive(Debug, Default)]
pub struct StubCodeGenerator;

impl StubCodeGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn finalize_code(&self, _name: &str, buffer: Vec<u8>) -> CodeObject {
        let return_offset = buffer.len().saturating_sub(1) as u32;
        let mut code = CodeObject::new(buffer);
        code.pc_descriptors.push(PcDescriptor {
            pc_offset: return_offset,
            kind: PcDescriptorKind::Return,
            deopt_id: 0,
            token_pos: 0,
            try_index: -1,
        });
        code
    }
}
