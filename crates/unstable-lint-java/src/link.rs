//! Type linking (pass 2).
//!
//! Resolves supertypes, the declared types of fields and methods, and the
//! qualified names of declaration annotations. Runs after every unit has
//! been indexed, since any of these may name a type from another file.

use unstable_lint_core::{SymbolId, SymbolTable};

use crate::index::{Index, PendingAnnotation};
use crate::syntax::TypeName;

pub(crate) fn link(index: &mut Index, table: &mut SymbolTable) {
    // Member types inherited through a supertype are only visible once that
    // supertype is linked, so a second round picks up what the first missed.
    link_supertypes(index);
    link_supertypes(index);
    link_members(index);
    resolve_annotations(index, table);
}

fn link_supertypes(index: &mut Index) {
    let mut ids: Vec<SymbolId> = index.types.keys().copied().collect();
    ids.sort();

    for id in ids {
        let Some(info) = index.types.get(&id) else {
            continue;
        };
        let context = index.enclosing_chain(id);
        let resolve = |name: &TypeName| {
            index
                .resolve_type_name(info.unit, &context, &[], name)
                .filter(|resolved| *resolved != id)
        };
        let superclass = info.superclass_name.as_ref().and_then(resolve);
        let interfaces: Vec<SymbolId> = info.interface_names.iter().filter_map(resolve).collect();

        if let Some(info) = index.types.get_mut(&id) {
            info.superclass = superclass;
            info.interfaces = interfaces;
        }
    }
}

fn link_members(index: &mut Index) {
    let ids: Vec<SymbolId> = index.members.keys().copied().collect();

    for id in ids {
        let Some(member) = index.members.get(&id) else {
            continue;
        };
        let Some(declared) = member.declared_type.as_ref() else {
            continue;
        };
        let Some(unit) = index.types.get(&member.owner).map(|t| t.unit) else {
            continue;
        };
        let context = index.enclosing_chain(member.owner);
        let resolved = index.resolve_type_name(unit, &context, &member.type_params, declared);

        if let Some(member) = index.members.get_mut(&id) {
            member.value_type = resolved;
        }
    }
}

fn resolve_annotations(index: &mut Index, table: &mut SymbolTable) {
    let pending = std::mem::take(&mut index.pending_annotations);
    for annotation in pending {
        let name = qualified_annotation(index, table, &annotation);
        if let Some(symbol) = table.get_mut(annotation.target) {
            symbol.annotations.push(name);
        }
    }
}

/// Qualified name of an annotation as written at a declaration.
///
/// Annotation types declared in the analyzed sources resolve like any other
/// type. Others (typically from a jar) fall back to the single-type import
/// that introduced the simple name, then to the name as written.
fn qualified_annotation(index: &Index, table: &SymbolTable, annotation: &PendingAnnotation) -> String {
    let context = annotation
        .context
        .map(|c| index.enclosing_chain(c))
        .unwrap_or_default();

    if let Some(symbol) = index
        .resolve_type_name(annotation.unit, &context, &[], &annotation.name)
        .and_then(|id| table.get(id))
    {
        return symbol.qualified_name.clone();
    }

    let imported = annotation.name.split_first().and_then(|(first, rest)| {
        let import = index.units.get(annotation.unit)?.single_imports.get(first)?;
        Some(import.iter().chain(rest).cloned().collect::<Vec<_>>())
    });

    imported.unwrap_or_else(|| annotation.name.clone()).join(".")
}
