// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright 2026 Tobias Sarnowski

//! `FinalizePendingClasses` (spec §4.3): drains the class table's
//! pending list to a fixed point through resolution, mixin synthesis,
//! type-parameter cloning, and type finalization.

use super::{ClassFinalizationState, FinalizationState, Type, TypeArguments, TypeVariant};
use crate::class_table::ClassTable;
use crate::error::FinalizeError;
use crate::object::{predefined, ClassId};
use std::collections::HashSet;

/// Receives the cids the finalizer determined need their optimized code
/// deoptimized (spec §4.3 "CHA dependence invalidation"). The code
/// object model (C4) implements this; tests use [`NullInvalidationSink`].
pub trait CodeInvalidationSink {
    fn invalidate(&mut self, affected: &[ClassId]);
}

/// A sink that drops every invalidation, for callers with no live code.
#[derive(Debug, Default)]
pub struct NullInvalidationSink;

impl CodeInvalidationSink for NullInvalidationSink {
    fn invalidate(&mut self, _affected: &[ClassId]) {}
}

/// Stateless driver over a [`ClassTable`]; all mutable state lives in
/// the table's pending list and its classes.
pub struct ClassFinalizer;

impl ClassFinalizer {
    /// Runs steps A through D to a fixed point, synthesizing mixin
    /// application classes as it goes (which themselves re-enter the
    /// pending list and are processed in a later pass of the loop).
    pub fn finalize_pending_classes(
        table: &mut ClassTable,
        sink: &mut impl CodeInvalidationSink,
    ) -> Result<(), FinalizeError> {
        loop {
            let batch: Vec<ClassId> = table.pending_classes().to_vec();
            if batch.is_empty() {
                break;
            }

            for &cid in &batch {
                Self::resolve_super_and_interfaces(table, cid)?;
            }
            for &cid in &batch {
                Self::synthesize_mixin_applications(table, cid)?;
            }
            for &cid in &batch {
                Self::clone_mixin_application_params(table, cid)?;
            }
            for &cid in &batch {
                Self::record_direct_subclass_and_invalidate(table, cid, sink);
            }
            for &cid in &batch {
                Self::finalize_class_types(table, cid)?;
            }
            for &cid in &batch {
                Self::resolve_redirecting_factories(table, cid)?;
            }
            for &cid in &batch {
                Self::resolve_member_overrides(table, cid)?;
            }

            for &cid in &batch {
                if let Some(class) = table.get_mut(cid) {
                    class.state = ClassFinalizationState::Finalized;
                }
                table.clear_pending(cid);
            }
        }
        Ok(())
    }

    /// Step A: walk the super/interface chain, detecting cycles and
    /// sealed-builtin violations.
    fn resolve_super_and_interfaces(table: &ClassTable, cid: ClassId) -> Result<(), FinalizeError> {
        let class = table.get(cid).expect("pending cid must be registered");

        let mut visited = HashSet::new();
        visited.insert(cid);
        let mut cursor = class.super_type.clone();
        while let Some(ty) = cursor {
            let TypeVariant::Parameterized { class: super_cid, .. } = ty.variant else {
                break;
            };
            if !visited.insert(super_cid) {
                return Err(FinalizeError::CyclicInheritance {
                    class: class.name.clone(),
                });
            }
            Self::check_not_sealed_builtin(table, super_cid, &class.name)?;
            cursor = table.get(super_cid).and_then(|c| c.super_type.clone());
        }

        for interface in &class.interfaces {
            if let TypeVariant::Parameterized { class: iface_cid, .. } = &interface.variant {
                Self::check_not_sealed_builtin(table, *iface_cid, &class.name)?;
            }
        }

        let mut seen_interfaces: Vec<&Type> = Vec::new();
        for interface in &class.interfaces {
            if seen_interfaces.contains(&interface) {
                return Err(FinalizeError::DuplicateInterface {
                    class: class.name.clone(),
                });
            }
            if class.super_type.as_ref() == Some(interface) {
                return Err(FinalizeError::InterfaceEqualsSuper {
                    class: class.name.clone(),
                });
            }
            seen_interfaces.push(interface);
        }

        Ok(())
    }

    fn check_not_sealed_builtin(
        table: &ClassTable,
        cid: ClassId,
        extending_class: &str,
    ) -> Result<(), FinalizeError> {
        if !cid.is_predefined() {
            return Ok(());
        }
        let name = table
            .get(cid)
            .map(|c| c.name.as_str())
            .unwrap_or_default();
        if predefined::SEALED_BUILTIN_NAMES.contains(&name) {
            return Err(FinalizeError::ExtendsSealedBuiltin {
                class: extending_class.to_owned(),
            });
        }
        Ok(())
    }

    /// Step B: rewrite `C extends S with M1, …, Mn` into a chain of
    /// synthesized `S&M` classes, reusing an existing one by name.
    #[allow(clippy::unnecessary_wraps, reason = "kept fallible for symmetry with the other finalization steps it runs alongside")]
    fn synthesize_mixin_applications(
        table: &mut ClassTable,
        cid: ClassId,
    ) -> Result<(), FinalizeError> {
        let (mixins, mut current_super) = {
            let class = table.get(cid).expect("pending cid must be registered");
            if class.declared_mixins.is_empty() {
                return Ok(());
            }
            (
                class.declared_mixins.clone(),
                class
                    .super_type
                    .clone()
                    .expect("a mixin clause requires an explicit super type"),
            )
        };

        for mixin in mixins {
            let super_name = Self::class_name_of(table, &current_super);
            let mixin_name = Self::class_name_of(table, &mixin);
            let synthesized_name = format!("{super_name}&{mixin_name}");

            let synthesized_cid = Self::find_class_by_name(table, &synthesized_name)
                .unwrap_or_else(|| {
                    let mut synthesized = crate::types::ClassMetadata::pending(
                        synthesized_name.clone(),
                        Some(current_super.clone()),
                    );
                    synthesized.mixin = Some(mixin.clone());
                    synthesized.flags.is_mixin_application = true;
                    synthesized.flags.is_synthesized = true;
                    table.register_pending(synthesized)
                });

            // `S&M`'s own arguments are the super's arguments followed by
            // the mixin's (spec §4.3 Step C: `S<E> with M<List<E>>` =>
            // `S&M<E, List<E>>`), matching the parameter order
            // `clone_mixin_application_params` clones them in below.
            let mut arguments = Self::flat_type_arguments(&current_super);
            arguments.extend(Self::flat_type_arguments(&mixin));
            current_super = Type::parameterized(
                synthesized_cid,
                (!arguments.is_empty()).then_some(TypeArguments::Flat(arguments)),
            );
        }

        let class = table.get_mut(cid).expect("pending cid must be registered");
        class.super_type = Some(current_super);
        class.declared_mixins.clear();
        Ok(())
    }

    fn class_name_of(table: &ClassTable, ty: &Type) -> String {
        match &ty.variant {
            TypeVariant::Parameterized { class, .. } => {
                table.get(*class).map_or_else(|| "<unresolved>".to_owned(), |c| c.name.clone())
            }
            _ => "<unresolved>".to_owned(),
        }
    }

    /// The flattened argument vector of a parameterized type, or empty
    /// if it has none.
    fn flat_type_arguments(ty: &Type) -> Vec<Type> {
        let TypeVariant::Parameterized { arguments: Some(args), .. } = &ty.variant else {
            return Vec::new();
        };
        (0..args.len()).map(|i| args.get(i).expect("index within len").clone()).collect()
    }

    fn find_class_by_name(table: &ClassTable, name: &str) -> Option<ClassId> {
        for i in 0..table.len() {
            let cid = ClassId(i as u16);
            if table.get(cid).is_some_and(|c| c.name == name) {
                return Some(cid);
            }
        }
        None
    }

    /// Step C: clone the super's and mixin's type parameters onto a
    /// synthesized `S&M` class (spec §9 Open Question 1: a bound on a
    /// cloned mixin parameter is rejected).
    fn clone_mixin_application_params(
        table: &mut ClassTable,
        cid: ClassId,
    ) -> Result<(), FinalizeError> {
        let (super_cid, mixin_ty) = {
            let class = table.get(cid).expect("pending cid must be registered");
            if !class.flags.is_mixin_application {
                return Ok(());
            }
            let TypeVariant::Parameterized { class: super_cid, .. } =
                class.super_type.as_ref().expect("synthesized class always has a super").variant
            else {
                return Ok(());
            };
            (super_cid, class.mixin.clone())
        };

        let mut cloned = Vec::new();
        if let Some(super_class) = table.get(super_cid) {
            for param in &super_class.type_parameters {
                cloned.push(crate::types::TypeParameterDecl {
                    name: format!("{}`", param.name),
                    bound: param.bound.clone(),
                });
            }
        }

        if let Some(TypeVariant::Parameterized { class: mixin_cid, .. }) = mixin_ty.map(|t| t.variant)
            && let Some(mixin_class) = table.get(mixin_cid)
        {
            for param in &mixin_class.type_parameters {
                if !param.bound.is_dynamic() {
                    return Err(FinalizeError::MixinParameterBoundUnsupported {
                        parameter: param.name.clone(),
                    });
                }
                cloned.push(crate::types::TypeParameterDecl {
                    name: param.name.clone(),
                    bound: Type::dynamic(),
                });
            }
        }

        let class = table.get_mut(cid).expect("pending cid must be registered");
        class.num_type_arguments = cloned.len() as u32;
        class.type_parameters = cloned;
        Ok(())
    }

    /// Records this class as a direct subclass of its super and, if the
    /// super chain was already finalized before this batch began,
    /// reports it to `sink` for CHA invalidation.
    fn record_direct_subclass_and_invalidate(
        table: &mut ClassTable,
        cid: ClassId,
        sink: &mut impl CodeInvalidationSink,
    ) {
        let Some(super_ty) = table.get(cid).and_then(|c| c.super_type.clone()) else {
            return;
        };
        let TypeVariant::Parameterized { class: super_cid, .. } = super_ty.variant else {
            return;
        };

        let mut affected = Vec::new();
        let mut cursor = Some(super_cid);
        while let Some(ancestor) = cursor {
            let Some(ancestor_class) = table.get_mut(ancestor) else {
                break;
            };
            if ancestor == super_cid && !ancestor_class.direct_subclasses.contains(&cid) {
                ancestor_class.direct_subclasses.push(cid);
            }
            if ancestor_class.state == ClassFinalizationState::Finalized {
                affected.push(ancestor);
            }
            cursor = ancestor_class
                .super_type
                .as_ref()
                .and_then(|t| match &t.variant {
                    TypeVariant::Parameterized { class, .. } => Some(*class),
                    _ => None,
                });
        }
        if !affected.is_empty() {
            sink.invalidate(&affected);
        }
    }

    /// Step D: fill the flattened type-argument vector, run bounds
    /// checks, and canonicalize.
    fn finalize_class_types(table: &mut ClassTable, cid: ClassId) -> Result<(), FinalizeError> {
        let super_ty = table.get(cid).and_then(|c| c.super_type.clone());

        if let Some(mut ty) = super_ty {
            Self::finalize_type(table, &mut ty, &mut HashSet::new())?;
            if let Some(class) = table.get_mut(cid) {
                class.super_type = Some(ty);
            }
        }

        let interfaces = table.get(cid).map_or_else(Vec::new, |c| c.interfaces.clone());
        let mut finalized_interfaces = Vec::with_capacity(interfaces.len());
        for mut iface in interfaces {
            Self::finalize_type(table, &mut iface, &mut HashSet::new())?;
            finalized_interfaces.push(iface);
        }
        if let Some(class) = table.get_mut(cid) {
            class.interfaces = finalized_interfaces;
            class.state = ClassFinalizationState::TypeFinalized;
        }

        Ok(())
    }

    /// The per-type half of step D: recurse into arguments, break
    /// F-bounded cycles by substituting `dynamic`, check bounds, and
    /// collapse an all-`dynamic` vector to the null marker.
    fn finalize_type(
        table: &ClassTable,
        ty: &mut Type,
        being_finalized: &mut HashSet<ClassId>,
    ) -> Result<(), FinalizeError> {
        if ty.is_finalized() || ty.is_malformed() {
            return Ok(());
        }

        let TypeVariant::Parameterized { class, arguments } = &mut ty.variant else {
            ty.state = FinalizationState::FinalizedInstantiated;
            return Ok(());
        };

        if !being_finalized.insert(*class) {
            // F-bounded self-reference: substitute dynamic and stop recursing.
            *ty = Type::dynamic();
            return Ok(());
        }

        ty.state = FinalizationState::BeingFinalized;

        if let Some(TypeArguments::Flat(items)) = arguments {
            for item in items.iter_mut() {
                Self::finalize_type(table, item, being_finalized)?;
            }
        }

        if let Some(type_parameters) = table.get(*class).map(|c| c.type_parameters.clone())
            && let Some(TypeArguments::Flat(items)) = arguments
        {
            while items.len() < type_parameters.len() {
                items.push(Type::dynamic());
            }
            for (item, param) in items.iter().zip(type_parameters.iter()) {
                Self::check_bound(item, &param.bound)?;
            }
        }

        being_finalized.remove(class);

        let collapses_to_dynamic = matches!(
            arguments,
            Some(args) if args.is_all_dynamic()
        );
        if collapses_to_dynamic {
            *arguments = None;
        }

        ty.state = if arguments.is_none() {
            FinalizationState::FinalizedUninstantiated
        } else {
            FinalizationState::FinalizedInstantiated
        };
        Ok(())
    }

    fn check_bound(argument: &Type, bound: &Type) -> Result<(), FinalizeError> {
        if bound.is_dynamic() || argument.is_dynamic() {
            return Ok(());
        }
        if !argument.is_finalized() || !bound.is_finalized() {
            return Ok(()); // postponed to a `Bounded` wrapper at call sites that build one
        }
        if argument == bound {
            return Ok(());
        }
        // Structural-equality is this port's stand-in for a full subtype
        // check (no variance/interface-implements graph is modeled here);
        // anything else is reported as a bound violation.
        Err(FinalizeError::BoundViolation {
            type_name: format!("{:?}", argument.variant),
            bound_name: format!("{:?}", bound.variant),
        })
    }

    /// Walks each factory's redirection chain to its terminal target,
    /// detecting cycles and const-ness mismatches.
    fn resolve_redirecting_factories(
        table: &mut ClassTable,
        cid: ClassId,
    ) -> Result<(), FinalizeError> {
        let Some(class) = table.get(cid) else {
            return Ok(());
        };
        let functions = class.functions.clone();
        let mut resolved = functions.clone();

        for function in &functions {
            let Some(initial_target) = function.redirect_target.clone() else {
                continue;
            };
            let mut visited = HashSet::new();
            visited.insert(function.name.clone());
            let mut target_name = initial_target;
            while let Some(target) = functions.iter().find(|f| f.name == target_name) {
                if function.is_const && !target.is_const {
                    return Err(FinalizeError::ConstFactoryRedirectsToNonConst {
                        factory: function.name.clone(),
                    });
                }
                let Some(next) = &target.redirect_target else {
                    break;
                };
                if !visited.insert(next.clone()) {
                    return Err(FinalizeError::CyclicFactoryRedirection {
                        factory: function.name.clone(),
                    });
                }
                target_name.clone_from(next);
            }
            if let Some(resolved_fn) = resolved.iter_mut().find(|f| f.name == function.name) {
                resolved_fn.redirect_target = Some(target_name);
            }
        }

        if let Some(class) = table.get_mut(cid) {
            class.functions = resolved;
        }
        Ok(())
    }

    /// Checks overriding functions against their super counterpart by
    /// name and parameter count (spec §4.3 "Member resolution &
    /// overrides"; the full conflict matrix of §7 is reduced here to
    /// the arity check, the one every other conflict in that matrix
    /// presupposes has already passed).
    fn resolve_member_overrides(table: &mut ClassTable, cid: ClassId) -> Result<(), FinalizeError> {
        let Some(super_cid) = table.get(cid).and_then(|c| c.super_type.as_ref()).and_then(|t| {
            match &t.variant {
                TypeVariant::Parameterized { class, .. } => Some(*class),
                _ => None,
            }
        }) else {
            return Ok(());
        };
        let Some(super_functions) = table.get(super_cid).map(|c| c.functions.clone()) else {
            return Ok(());
        };
        let Some(class) = table.get_mut(cid) else {
            return Ok(());
        };
        for function in &mut class.functions {
            if let Some(overridden) = super_functions.iter().find(|f| f.name == function.name) {
                if overridden.parameters.len() != function.parameters.len() {
                    return Err(FinalizeError::OverrideConflict {
                        member: function.name.clone(),
                        reason: "parameter count does not match the overridden member",
                    });
                }
                function.overrides_checked = true;
            }
        }
        Ok(())
    }
}
