//! Declaration index (pass 1) and the name lookups built on it.
//!
//! Every declaration becomes a [`Symbol`] in the shared [`SymbolTable`];
//! the index keeps the Java-specific structure the table does not model:
//! imports per compilation unit, member maps per type, and the syntax
//! node each declaration came from.

use std::collections::{HashMap, HashSet, VecDeque};

use tree_sitter::Node;
use unstable_lint_core::{Symbol, SymbolId, SymbolKind, SymbolTable};

use crate::syntax::{self, SourceUnit, TypeName};

/// Name used for constructor symbols.
pub(crate) const CONSTRUCTOR_NAME: &str = "<init>";

/// Imports and package of one compilation unit.
#[derive(Debug, Default)]
pub(crate) struct UnitScope {
    pub package: String,
    pub single_imports: HashMap<String, TypeName>,
    pub on_demand: Vec<TypeName>,
    pub static_single: Vec<(TypeName, String)>,
    pub static_on_demand: Vec<TypeName>,
}

/// Structure of a declared type.
#[derive(Debug, Default)]
pub(crate) struct TypeInfo {
    pub unit: usize,
    pub outer: Option<SymbolId>,
    pub type_params: Vec<(String, SymbolId)>,
    pub superclass_name: Option<TypeName>,
    pub interface_names: Vec<TypeName>,
    pub superclass: Option<SymbolId>,
    pub interfaces: Vec<SymbolId>,
    pub member_types: HashMap<String, SymbolId>,
    pub fields: HashMap<String, SymbolId>,
    pub methods: HashMap<String, Vec<SymbolId>>,
    pub constructors: Vec<SymbolId>,
    /// Record component count.
    pub components: usize,
}

impl TypeInfo {
    pub fn supertypes(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.superclass.into_iter().chain(self.interfaces.iter().copied())
    }
}

/// Signature data of a field, method, constructor or enum constant.
#[derive(Debug)]
pub(crate) struct MemberInfo {
    pub owner: SymbolId,
    pub arity: usize,
    pub varargs: bool,
    pub type_params: Vec<(String, SymbolId)>,
    pub declared_type: Option<TypeName>,
    /// Type of the field's value or the method's result, once linked.
    pub value_type: Option<SymbolId>,
}

/// An annotation seen in pass 1, resolved to a qualified name in pass 2.
#[derive(Debug)]
pub(crate) struct PendingAnnotation {
    pub target: SymbolId,
    pub unit: usize,
    pub context: Option<SymbolId>,
    pub name: TypeName,
}

/// Cross-file declaration index.
#[derive(Debug, Default)]
pub(crate) struct Index {
    pub units: Vec<UnitScope>,
    pub packages: HashMap<String, SymbolId>,
    pub types_by_name: HashMap<String, SymbolId>,
    pub package_types: HashMap<String, HashMap<String, SymbolId>>,
    pub types: HashMap<SymbolId, TypeInfo>,
    pub members: HashMap<SymbolId, MemberInfo>,
    /// Declaration symbol per `(unit, node id)`.
    pub declarations: HashMap<(usize, usize), SymbolId>,
    pub pending_annotations: Vec<PendingAnnotation>,
}

impl Index {
    /// Runs pass 1 over all units.
    pub fn build(units: &[SourceUnit], table: &mut SymbolTable) -> Self {
        let mut index = Self::default();
        for (unit, source) in units.iter().enumerate() {
            let mut indexer = Indexer {
                index: &mut index,
                table: &mut *table,
                unit,
                src: source.src(),
                package: String::new(),
                package_symbol: None,
            };
            indexer.program(source.tree.root_node());
        }
        index
    }

    pub fn package(&self, name: &str) -> Option<SymbolId> {
        self.packages.get(name).copied()
    }

    pub fn package_type(&self, package: &str, name: &str) -> Option<SymbolId> {
        self.package_types
            .get(package)
            .and_then(|types| types.get(name))
            .copied()
    }

    pub fn type_by_segments(&self, segments: &[String]) -> Option<SymbolId> {
        self.types_by_name.get(&segments.join(".")).copied()
    }

    /// The type followed by all of its known supertypes, breadth first.
    pub fn hierarchy(&self, ty: SymbolId) -> Vec<SymbolId> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([ty]);
        let mut order = Vec::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            if let Some(info) = self.types.get(&current) {
                queue.extend(info.supertypes());
            }
        }
        order
    }

    pub fn member_type(&self, ty: SymbolId, name: &str) -> Option<SymbolId> {
        self.hierarchy(ty)
            .into_iter()
            .find_map(|t| self.types.get(&t)?.member_types.get(name).copied())
    }

    pub fn field(&self, ty: SymbolId, name: &str) -> Option<SymbolId> {
        self.hierarchy(ty)
            .into_iter()
            .find_map(|t| self.types.get(&t)?.fields.get(name).copied())
    }

    pub fn methods(&self, ty: SymbolId, name: &str) -> Vec<SymbolId> {
        self.hierarchy(ty)
            .into_iter()
            .filter_map(|t| self.types.get(&t)?.methods.get(name))
            .flatten()
            .copied()
            .collect()
    }

    pub fn constructors(&self, ty: SymbolId) -> &[SymbolId] {
        self.types
            .get(&ty)
            .map_or(&[][..], |info| info.constructors.as_slice())
    }

    pub fn superclass(&self, ty: SymbolId) -> Option<SymbolId> {
        self.types.get(&ty)?.superclass
    }

    pub fn value_type(&self, member: SymbolId) -> Option<SymbolId> {
        self.members.get(&member)?.value_type
    }

    /// Picks an overload by argument count. Without a count (method
    /// references) the first candidate wins.
    pub fn select_overload(&self, candidates: &[SymbolId], args: Option<usize>) -> Option<SymbolId> {
        let Some(count) = args else {
            return candidates.first().copied();
        };
        let shape = |id: &SymbolId| self.members.get(id).map(|m| (m.arity, m.varargs));
        candidates
            .iter()
            .find(|c| shape(*c) == Some((count, false)))
            .or_else(|| {
                candidates.iter().find(|c| {
                    shape(*c).is_some_and(|(arity, varargs)| varargs && count + 1 >= arity)
                })
            })
            .copied()
    }

    /// Enclosing chain of a type, innermost first.
    pub fn enclosing_chain(&self, ty: SymbolId) -> Vec<SymbolId> {
        let mut chain = Vec::new();
        let mut current = Some(ty);
        while let Some(t) = current {
            if chain.contains(&t) {
                break;
            }
            chain.push(t);
            current = self.types.get(&t).and_then(|info| info.outer);
        }
        chain
    }

    /// Resolves a simple type name as seen from `enclosing` (innermost
    /// first) in compilation unit `unit`.
    ///
    /// Lookup order: type parameters, member types of the enclosing types and
    /// their supertypes, single-type imports, the unit's own package,
    /// on-demand imports.
    pub fn resolve_simple_type(
        &self,
        unit: usize,
        enclosing: &[SymbolId],
        params: &[(String, SymbolId)],
        name: &str,
    ) -> Option<SymbolId> {
        let scope = self.units.get(unit)?;

        params
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
            .or_else(|| {
                enclosing.iter().find_map(|t| {
                    self.types
                        .get(t)?
                        .type_params
                        .iter()
                        .find(|(n, _)| n == name)
                        .map(|(_, id)| *id)
                })
            })
            .or_else(|| enclosing.iter().find_map(|t| self.member_type(*t, name)))
            .or_else(|| {
                scope
                    .single_imports
                    .get(name)
                    .and_then(|segments| self.type_by_segments(segments))
            })
            .or_else(|| self.package_type(&scope.package, name))
            .or_else(|| {
                scope.on_demand.iter().find_map(|segments| {
                    let joined = segments.join(".");
                    self.package_type(&joined, name).or_else(|| {
                        self.types_by_name
                            .get(&joined)
                            .and_then(|t| self.member_type(*t, name))
                    })
                })
            })
    }

    /// Resolves a possibly qualified type name.
    pub fn resolve_type_name(
        &self,
        unit: usize,
        enclosing: &[SymbolId],
        params: &[(String, SymbolId)],
        segments: &[String],
    ) -> Option<SymbolId> {
        let (first, rest) = segments.split_first()?;
        if let Some(mut current) = self.resolve_simple_type(unit, enclosing, params, first) {
            for segment in rest {
                current = self.member_type(current, segment)?;
            }
            return Some(current);
        }
        if rest.is_empty() {
            return None;
        }
        self.type_by_segments(segments)
    }

    pub fn static_import_field(&self, unit: usize, name: &str) -> Option<SymbolId> {
        let scope = self.units.get(unit)?;
        scope
            .static_single
            .iter()
            .filter(|(_, member)| member == name)
            .map(|(owner, _)| owner)
            .chain(scope.static_on_demand.iter())
            .find_map(|owner| self.field(self.type_by_segments(owner)?, name))
    }

    pub fn static_import_methods(&self, unit: usize, name: &str) -> Vec<SymbolId> {
        let Some(scope) = self.units.get(unit) else {
            return Vec::new();
        };
        scope
            .static_single
            .iter()
            .filter(|(_, member)| member == name)
            .map(|(owner, _)| owner)
            .chain(scope.static_on_demand.iter())
            .filter_map(|owner| self.type_by_segments(owner))
            .flat_map(|ty| self.methods(ty, name))
            .collect()
    }
}

struct Indexer<'a> {
    index: &'a mut Index,
    table: &'a mut SymbolTable,
    unit: usize,
    src: &'a [u8],
    package: String,
    package_symbol: Option<SymbolId>,
}

impl Indexer<'_> {
    fn program(&mut self, root: Node<'_>) {
        let mut scope = UnitScope::default();
        let children = syntax::named_children(root);

        if let Some(decl) = children.iter().find(|c| c.kind() == "package_declaration") {
            self.package_declaration(*decl);
        }
        scope.package.clone_from(&self.package);

        for child in &children {
            if child.kind() == "import_declaration" {
                self.import(*child, &mut scope);
            }
        }
        self.index.units.push(scope);

        for child in children {
            if is_type_declaration(child) {
                self.type_declaration(child, None, "");
            }
        }
    }

    fn package_declaration(&mut self, node: Node<'_>) {
        let Some(name) = syntax::named_children(node)
            .into_iter()
            .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
        else {
            return;
        };
        self.package = syntax::dotted(name, self.src).join(".");
        self.package_symbol = self.ensure_package(&self.package.clone());

        if let Some(symbol) = self.package_symbol {
            self.queue_annotations(node, symbol, None);
        }
    }

    /// Returns the package symbol, creating it and its parents as needed.
    fn ensure_package(&mut self, name: &str) -> Option<SymbolId> {
        if name.is_empty() {
            return None;
        }
        if let Some(id) = self.index.package(name) {
            return Some(id);
        }
        let (parent, simple) = match name.rsplit_once('.') {
            Some((parent, simple)) => (self.ensure_package(parent), simple),
            None => (None, name),
        };
        let mut symbol = Symbol::new(simple, name, name, SymbolKind::Package);
        if let Some(parent) = parent {
            symbol = symbol.with_owner(parent);
        }
        let id = self.table.insert(symbol);
        self.index.packages.insert(name.to_string(), id);
        Some(id)
    }

    fn import(&mut self, node: Node<'_>, scope: &mut UnitScope) {
        let mut is_static = false;
        let mut on_demand = false;
        let mut segments = Vec::new();

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "static" => is_static = true,
                "asterisk" => on_demand = true,
                "identifier" | "scoped_identifier" => segments = syntax::dotted(child, self.src),
                _ => {}
            }
        }

        if segments.is_empty() {
            return;
        }

        match (is_static, on_demand) {
            (true, true) => scope.static_on_demand.push(segments),
            (true, false) => {
                if let Some((member, owner)) = segments.split_last() {
                    scope.static_single.push((owner.to_vec(), member.clone()));
                }
            }
            (false, true) => scope.on_demand.push(segments),
            (false, false) => {
                if let Some(last) = segments.last().cloned() {
                    scope.single_imports.insert(last, segments);
                }
            }
        }
    }

    fn type_declaration(&mut self, node: Node<'_>, outer: Option<SymbolId>, outer_name: &str) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = syntax::text(name_node, self.src).to_owned();
        let kind = match node.kind() {
            "interface_declaration" => SymbolKind::Interface,
            "enum_declaration" => SymbolKind::Enum,
            "annotation_type_declaration" => SymbolKind::AnnotationType,
            _ => SymbolKind::Class,
        };

        let qualified_name = match (outer_name, self.package.as_str()) {
            ("", "") => name.clone(),
            ("", package) => format!("{package}.{name}"),
            (outer, _) => format!("{outer}.{name}"),
        };

        let mut symbol = Symbol::new(&name, &qualified_name, &self.package, kind);
        if let Some(owner) = outer.or(self.package_symbol) {
            symbol = symbol.with_owner(owner);
        }
        let id = self.table.insert(symbol);
        self.index.declarations.insert((self.unit, node.id()), id);
        self.queue_annotations(node, id, outer);

        let mut info = TypeInfo {
            unit: self.unit,
            outer,
            type_params: self.type_parameters(node, id),
            ..TypeInfo::default()
        };

        for child in syntax::named_children(node) {
            match child.kind() {
                "superclass" => {
                    info.superclass_name = syntax::named_children(child)
                        .into_iter()
                        .find_map(|t| syntax::type_name(t, self.src));
                }
                "super_interfaces" | "extends_interfaces" => {
                    info.interface_names.extend(self.type_list(child));
                }
                _ => {}
            }
        }

        if let Some(outer) = outer {
            if let Some(outer_info) = self.index.types.get_mut(&outer) {
                outer_info.member_types.insert(name.clone(), id);
            }
        } else {
            self.index
                .package_types
                .entry(self.package.clone())
                .or_default()
                .insert(name, id);
        }
        self.index.types_by_name.insert(qualified_name.clone(), id);
        self.index.types.insert(id, info);

        if node.kind() == "record_declaration" {
            self.record_components(node, id);
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.body(body, id, &qualified_name);
        }

        if matches!(kind, SymbolKind::Class | SymbolKind::Enum) {
            self.default_constructor(id);
        }
    }

    fn type_list(&self, node: Node<'_>) -> Vec<TypeName> {
        syntax::named_children(node)
            .into_iter()
            .flat_map(|child| {
                if child.kind() == "type_list" {
                    self.type_list(child)
                } else {
                    syntax::type_name(child, self.src).into_iter().collect()
                }
            })
            .collect()
    }

    fn type_parameters(&mut self, node: Node<'_>, owner: SymbolId) -> Vec<(String, SymbolId)> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        syntax::named_children(params)
            .into_iter()
            .filter(|p| p.kind() == "type_parameter")
            .filter_map(|p| syntax::child_of_kind(p, "type_identifier"))
            .map(|name_node| {
                let name = syntax::text(name_node, self.src).to_owned();
                let id = self.table.insert(
                    Symbol::new(&name, &name, &self.package, SymbolKind::TypeParameter)
                        .with_owner(owner),
                );
                (name, id)
            })
            .collect()
    }

    fn body(&mut self, body: Node<'_>, owner: SymbolId, owner_name: &str) {
        for child in syntax::named_children(body) {
            match child.kind() {
                "enum_body_declarations" => self.body(child, owner, owner_name),
                "enum_constant" => self.enum_constant(child, owner),
                "field_declaration" | "constant_declaration" => self.field(child, owner),
                "method_declaration" | "annotation_type_element_declaration" => {
                    self.method(child, owner);
                }
                "constructor_declaration" | "compact_constructor_declaration" => {
                    self.constructor(child, owner);
                }
                _ if is_type_declaration(child) => {
                    self.type_declaration(child, Some(owner), owner_name);
                }
                _ => {}
            }
        }
    }

    fn member_symbol(&mut self, node: Node<'_>, name: &str, kind: SymbolKind, owner: SymbolId) -> SymbolId {
        let id = self
            .table
            .insert(Symbol::new(name, name, &self.package, kind).with_owner(owner));
        self.index.declarations.insert((self.unit, node.id()), id);
        self.queue_annotations(node, id, Some(owner));
        id
    }

    fn enum_constant(&mut self, node: Node<'_>, owner: SymbolId) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = syntax::text(name_node, self.src).to_owned();
        let id = self.member_symbol(node, &name, SymbolKind::EnumConstant, owner);
        self.index.members.insert(
            id,
            MemberInfo {
                owner,
                arity: 0,
                varargs: false,
                type_params: Vec::new(),
                declared_type: None,
                value_type: Some(owner),
            },
        );
        if let Some(info) = self.index.types.get_mut(&owner) {
            info.fields.insert(name, id);
        }
    }

    fn field(&mut self, node: Node<'_>, owner: SymbolId) {
        let declared_type = node
            .child_by_field_name("type")
            .and_then(|t| syntax::type_name(t, self.src));

        for declarator in syntax::children_by_field(node, "declarator") {
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let name = syntax::text(name_node, self.src).to_owned();
            // Annotations sit on the declaration, so each declarator shares them.
            let id = self.member_symbol(node, &name, SymbolKind::Field, owner);
            self.index.declarations.insert((self.unit, declarator.id()), id);
            self.index.members.insert(
                id,
                MemberInfo {
                    owner,
                    arity: 0,
                    varargs: false,
                    type_params: Vec::new(),
                    declared_type: declared_type.clone(),
                    value_type: None,
                },
            );
            if let Some(info) = self.index.types.get_mut(&owner) {
                info.fields.insert(name, id);
            }
        }
    }

    fn method(&mut self, node: Node<'_>, owner: SymbolId) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = syntax::text(name_node, self.src).to_owned();
        let id = self.member_symbol(node, &name, SymbolKind::Method, owner);
        let (arity, varargs) = node
            .child_by_field_name("parameters")
            .map_or((0, false), syntax::parameter_shape);
        let type_params = self.type_parameters(node, id);
        let declared_type = node
            .child_by_field_name("type")
            .and_then(|t| syntax::type_name(t, self.src));

        self.index.members.insert(
            id,
            MemberInfo {
                owner,
                arity,
                varargs,
                type_params,
                declared_type,
                value_type: None,
            },
        );
        if let Some(info) = self.index.types.get_mut(&owner) {
            info.methods.entry(name).or_default().push(id);
        }
    }

    fn constructor(&mut self, node: Node<'_>, owner: SymbolId) {
        let id = self.member_symbol(node, CONSTRUCTOR_NAME, SymbolKind::Constructor, owner);
        let (arity, varargs) = match node.child_by_field_name("parameters") {
            Some(params) => syntax::parameter_shape(params),
            // Compact canonical constructor: the record's components.
            None => (
                self.index.types.get(&owner).map_or(0, |info| info.components),
                false,
            ),
        };
        let type_params = self.type_parameters(node, id);
        self.index.members.insert(
            id,
            MemberInfo {
                owner,
                arity,
                varargs,
                type_params,
                declared_type: None,
                value_type: Some(owner),
            },
        );
        if let Some(info) = self.index.types.get_mut(&owner) {
            info.constructors.push(id);
        }
    }

    /// Record components become a field plus an accessor method.
    fn record_components(&mut self, node: Node<'_>, owner: SymbolId) {
        let Some(params) = node.child_by_field_name("parameters") else {
            return;
        };
        for param in syntax::named_children(params) {
            let Some(name_node) = param.child_by_field_name("name") else {
                continue;
            };
            let name = syntax::text(name_node, self.src).to_owned();
            let declared_type = param
                .child_by_field_name("type")
                .and_then(|t| syntax::type_name(t, self.src));

            let field = self.member_symbol(param, &name, SymbolKind::Field, owner);
            let accessor = self
                .table
                .insert(Symbol::new(&name, &name, &self.package, SymbolKind::Method).with_owner(owner));

            for id in [field, accessor] {
                self.index.members.insert(
                    id,
                    MemberInfo {
                        owner,
                        arity: 0,
                        varargs: false,
                        type_params: Vec::new(),
                        declared_type: declared_type.clone(),
                        value_type: None,
                    },
                );
            }
            if let Some(info) = self.index.types.get_mut(&owner) {
                info.components += 1;
                info.fields.insert(name.clone(), field);
                info.methods.entry(name).or_default().push(accessor);
            }
        }
    }

    /// Classes without a declared constructor get the implicit one.
    fn default_constructor(&mut self, owner: SymbolId) {
        let has_constructor = self
            .index
            .types
            .get(&owner)
            .is_some_and(|info| !info.constructors.is_empty());
        if has_constructor {
            return;
        }

        let arity = self.index.types.get(&owner).map_or(0, |info| info.components);

        let id = self.table.insert(
            Symbol::new(CONSTRUCTOR_NAME, CONSTRUCTOR_NAME, &self.package, SymbolKind::Constructor)
                .with_owner(owner),
        );
        self.index.members.insert(
            id,
            MemberInfo {
                owner,
                arity,
                varargs: false,
                type_params: Vec::new(),
                declared_type: None,
                value_type: Some(owner),
            },
        );
        if let Some(info) = self.index.types.get_mut(&owner) {
            info.constructors.push(id);
        }
    }

    fn queue_annotations(&mut self, node: Node<'_>, target: SymbolId, context: Option<SymbolId>) {
        for annotation in syntax::annotations(node) {
            let name = syntax::annotation_name(annotation, self.src);
            if name.is_empty() {
                continue;
            }
            self.index.pending_annotations.push(PendingAnnotation {
                target,
                unit: self.unit,
                context,
                name,
            });
        }
    }
}

pub(crate) fn is_type_declaration(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "annotation_type_declaration"
            | "record_declaration"
    )
}
