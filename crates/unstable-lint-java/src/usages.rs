//! Usage extraction (pass 3).
//!
//! Walks one compilation unit and turns every identifier and member-select
//! reference into a resolved [`Usage`]. Declaration names are not usages
//! and are skipped. Local variables and parameters are added to the symbol
//! table as they are declared so that receivers like `a.instanceMethod()`
//! resolve through the declared type of `a`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tree_sitter::Node;
use unstable_lint_core::{Location, Symbol, SymbolId, SymbolKind, SymbolTable, Usage};

use crate::error::AnalyzerError;
use crate::index::{is_type_declaration, Index};
use crate::syntax::{self, SourceUnit};

/// Syntax-tree depth the walk follows before giving up on a unit.
///
/// Left-nested operator chains (`a + b + c`) and member chains
/// (`a.b().c()`) are walked iteratively and do not add to the depth.
pub(crate) const MAX_NESTING: usize = 256;

/// What an expression denotes, as far as member lookup is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Value {
    /// A package name (`com.google`).
    Package(String),
    /// A type used as a qualifier (`AnnotatedClass.staticMethod()`).
    Type(SymbolId),
    /// A value of the given static type.
    Instance(SymbolId),
    /// Anything the index cannot see into.
    Unknown,
}

impl Value {
    fn instance(ty: Option<SymbolId>) -> Self {
        ty.map_or(Self::Unknown, Self::Instance)
    }

    fn as_type(&self) -> Option<SymbolId> {
        match self {
            Self::Type(t) => Some(*t),
            _ => None,
        }
    }

    fn receiver(&self) -> Option<SymbolId> {
        match self {
            Self::Type(t) | Self::Instance(t) => Some(*t),
            _ => None,
        }
    }
}

/// Where a dotted name occurs; decides which member kinds a segment may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Type,
    Expression,
    Import,
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// A declared class, interface, enum, record or annotation type.
    Type(SymbolId),
    /// An anonymous or local class body, with its supertype if known.
    Anonymous(Option<SymbolId>),
}

#[derive(Debug, Clone, Copy)]
struct Local {
    symbol: SymbolId,
    ty: Option<SymbolId>,
}

#[derive(Debug, Default)]
struct Scope {
    locals: HashMap<String, Local>,
    type_params: Vec<(String, SymbolId)>,
}

/// Extracts the usages of one unit.
///
/// Fails with [`AnalyzerError::NestingTooDeep`] instead of exhausting the
/// stack on pathologically nested sources.
pub(crate) fn collect(
    index: &Index,
    table: &mut SymbolTable,
    unit: usize,
    source: &SourceUnit,
) -> Result<Vec<Usage>, AnalyzerError> {
    let package = index
        .units
        .get(unit)
        .map(|scope| scope.package.clone())
        .unwrap_or_default();

    let mut collector = UsageCollector {
        index,
        table,
        unit,
        src: source.src(),
        path: &source.path,
        package,
        frames: Vec::new(),
        scopes: vec![Scope::default()],
        suppressions: vec![Arc::from(Vec::<String>::new())],
        muted: 0,
        switches: Vec::new(),
        depth: 0,
        too_deep: None,
        usages: Vec::new(),
    };
    collector.eval(source.tree.root_node());
    match collector.too_deep {
        Some(line) => Err(AnalyzerError::NestingTooDeep {
            path: source.path.clone(),
            line,
            limit: MAX_NESTING,
        }),
        None => Ok(collector.usages),
    }
}

struct UsageCollector<'a> {
    index: &'a Index,
    table: &'a mut SymbolTable,
    unit: usize,
    src: &'a [u8],
    path: &'a Path,
    package: String,
    frames: Vec<Frame>,
    scopes: Vec<Scope>,
    suppressions: Vec<Arc<[String]>>,
    /// Non-zero while evaluating a node whose references are not reported.
    muted: usize,
    /// Selector types of the enclosing switches, innermost last.
    switches: Vec<Option<SymbolId>>,
    depth: usize,
    /// Line where the nesting limit was hit.
    too_deep: Option<usize>,
    usages: Vec<Usage>,
}

impl UsageCollector<'_> {
    fn location(&self, node: Node<'_>) -> Location {
        let (line, column) = syntax::position(node);
        Location::new(self.path.to_path_buf(), line, column)
            .with_span(node.start_byte(), node.end_byte() - node.start_byte())
    }

    fn emit(&mut self, usage: Usage) {
        if self.muted > 0 {
            return;
        }
        let suppressions = self
            .suppressions
            .last()
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::<String>::new()));
        self.usages.push(usage.suppressed(suppressions));
    }

    fn emit_identifier(&mut self, node: Node<'_>, name: &str, target: Option<SymbolId>) {
        let usage = Usage::identifier(name, self.location(node)).resolved_to(target);
        self.emit(usage);
    }

    fn emit_select(&mut self, node: Node<'_>, member: &str, target: Option<SymbolId>, in_import: bool) {
        let usage = Usage::member_select(member, self.location(node))
            .in_import(in_import)
            .resolved_to(target);
        self.emit(usage);
    }

    fn push_suppressions(&mut self, decl: Node<'_>) {
        let current = self
            .suppressions
            .last()
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::<String>::new()));
        let added = syntax::suppressed_warnings(decl, self.src);
        let next = if added.is_empty() {
            current
        } else {
            Arc::from(current.iter().cloned().chain(added).collect::<Vec<_>>())
        };
        self.suppressions.push(next);
    }

    fn pop_suppressions(&mut self) {
        self.suppressions.pop();
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name_node: Option<Node<'_>>, kind: SymbolKind, ty: Option<SymbolId>) {
        let Some(name_node) = name_node else {
            return;
        };
        let name = syntax::text(name_node, self.src).to_owned();
        let mut symbol = Symbol::new(&name, &name, &self.package, kind);
        if let Some(owner) = self.this_type() {
            symbol = symbol.with_owner(owner);
        }
        let symbol = self.table.insert(symbol);
        if let Some(scope) = self.scopes.last_mut() {
            scope.locals.insert(name, Local { symbol, ty });
        }
    }

    fn declare_type_param(&mut self, name: String, symbol: SymbolId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.type_params.push((name, symbol));
        }
    }

    fn local(&self, name: &str) -> Option<Local> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.locals.get(name).copied())
    }

    /// Types whose members are in scope, innermost first.
    fn enclosing_types(&self) -> Vec<SymbolId> {
        self.frames
            .iter()
            .rev()
            .filter_map(|frame| match frame {
                Frame::Type(t) => Some(*t),
                Frame::Anonymous(s) => *s,
            })
            .collect()
    }

    fn this_type(&self) -> Option<SymbolId> {
        match self.frames.last()? {
            Frame::Type(t) => Some(*t),
            Frame::Anonymous(s) => *s,
        }
    }

    fn super_type(&self) -> Option<SymbolId> {
        match self.frames.last()? {
            Frame::Type(t) => self.index.superclass(*t),
            Frame::Anonymous(s) => *s,
        }
    }

    fn resolve_type(&self, name: &str) -> Option<SymbolId> {
        let params: Vec<(String, SymbolId)> = self
            .scopes
            .iter()
            .flat_map(|scope| scope.type_params.iter().cloned())
            .collect();
        self.index
            .resolve_simple_type(self.unit, &self.enclosing_types(), &params, name)
    }

    fn resolve_type_node(&self, node: Option<Node<'_>>) -> Option<SymbolId> {
        let segments = syntax::type_name(node?, self.src)?;
        self.index
            .resolve_type_name(self.unit, &self.enclosing_types(), &[], &segments)
    }

    /// Resolves `name` selected from `qualifier`.
    fn select(&self, qualifier: &Value, name: &str, context: Context) -> (Option<SymbolId>, Value) {
        match qualifier {
            Value::Package(package) => {
                if let Some(ty) = self.index.package_type(package, name) {
                    return (Some(ty), Value::Type(ty));
                }
                let nested = format!("{package}.{name}");
                match self.index.package(&nested) {
                    Some(id) => (Some(id), Value::Package(nested)),
                    None => (None, Value::Unknown),
                }
            }
            Value::Type(ty) | Value::Instance(ty) => {
                let is_type = matches!(qualifier, Value::Type(_));
                if context != Context::Type {
                    if let Some(field) = self.index.field(*ty, name) {
                        return (Some(field), Value::instance(self.index.value_type(field)));
                    }
                }
                if is_type || context == Context::Type {
                    if let Some(member) = self.index.member_type(*ty, name) {
                        return (Some(member), Value::Type(member));
                    }
                }
                if context == Context::Import {
                    if let Some(method) = self.index.methods(*ty, name).first() {
                        return (Some(*method), Value::Unknown);
                    }
                }
                (None, Value::Unknown)
            }
            Value::Unknown => (None, Value::Unknown),
        }
    }

    fn walk(&mut self, node: Node<'_>) {
        for child in syntax::named_children(node) {
            self.eval(child);
        }
    }

    fn scoped(&mut self, node: Node<'_>) {
        self.push_scope();
        self.walk(node);
        self.pop_scope();
    }

    fn eval(&mut self, node: Node<'_>) -> Value {
        if self.too_deep.is_some() {
            return Value::Unknown;
        }
        if self.depth >= MAX_NESTING {
            self.too_deep = Some(syntax::position(node).0);
            return Value::Unknown;
        }
        self.depth += 1;
        let value = self.eval_node(node);
        self.depth -= 1;
        value
    }

    fn eval_node(&mut self, node: Node<'_>) -> Value {
        match node.kind() {
            "package_declaration" => {
                for annotation in syntax::annotations(node) {
                    self.annotation(annotation);
                }
                Value::Unknown
            }
            "import_declaration" => {
                if let Some(name) = syntax::named_children(node)
                    .into_iter()
                    .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
                {
                    self.name_chain(name, Context::Import);
                }
                Value::Unknown
            }
            "module_declaration" | "line_comment" | "block_comment" => Value::Unknown,
            _ if is_type_declaration(node) => {
                self.type_declaration(node);
                Value::Unknown
            }
            "field_declaration" | "constant_declaration" => {
                self.field_declaration(node);
                Value::Unknown
            }
            "method_declaration"
            | "constructor_declaration"
            | "compact_constructor_declaration"
            | "annotation_type_element_declaration" => {
                self.method_declaration(node);
                Value::Unknown
            }
            "enum_constant" => {
                self.enum_constant(node);
                Value::Unknown
            }
            "local_variable_declaration" => {
                self.local_variable_declaration(node);
                Value::Unknown
            }
            "formal_parameter" | "spread_parameter" | "catch_formal_parameter" => {
                self.parameter(node);
                Value::Unknown
            }
            "variable_declarator" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.eval(value);
                }
                Value::Unknown
            }
            "block"
            | "constructor_body"
            | "static_initializer"
            | "switch_block_statement_group"
            | "switch_rule"
            | "for_statement"
            | "catch_clause"
            | "try_with_resources_statement" => {
                self.scoped(node);
                Value::Unknown
            }
            "enhanced_for_statement" => {
                self.enhanced_for(node);
                Value::Unknown
            }
            "resource" => {
                self.resource(node);
                Value::Unknown
            }
            "lambda_expression" => {
                self.lambda(node);
                Value::Unknown
            }
            "labeled_statement" => {
                for child in syntax::named_children(node).into_iter().skip(1) {
                    self.eval(child);
                }
                Value::Unknown
            }
            "break_statement" | "continue_statement" => Value::Unknown,
            "explicit_constructor_invocation" => {
                self.explicit_constructor_invocation(node);
                Value::Unknown
            }
            "type_identifier" => self.type_identifier(node),
            "scoped_type_identifier" => self.scoped_type(node),
            "generic_type" => {
                let mut value = Value::Unknown;
                for (i, child) in syntax::named_children(node).into_iter().enumerate() {
                    let v = self.eval(child);
                    if i == 0 {
                        value = v;
                    }
                }
                value
            }
            "type_parameter" => {
                // The first type identifier is the declared name.
                let name = syntax::child_of_kind(node, "type_identifier");
                for child in syntax::named_children(node) {
                    if !syntax::same_node(name, child) {
                        self.eval(child);
                    }
                }
                Value::Unknown
            }
            "marker_annotation" | "annotation" => {
                self.annotation(node);
                Value::Unknown
            }
            "identifier" => self.identifier(node),
            "scoped_identifier" => self.name_chain(node, Context::Expression),
            "field_access" | "method_invocation" => self.member_chain(node),
            "binary_expression" => {
                self.binary_chain(node);
                Value::Unknown
            }
            "switch_expression" => {
                self.switch(node);
                Value::Unknown
            }
            "switch_label" => {
                self.switch_label(node);
                Value::Unknown
            }
            "object_creation_expression" => self.object_creation(node),
            "method_reference" => {
                self.method_reference(node);
                Value::Unknown
            }
            "this" => Value::instance(self.this_type()),
            "cast_expression" => {
                let ty = node
                    .child_by_field_name("type")
                    .map(|t| self.eval(t))
                    .and_then(|v| v.as_type());
                if let Some(value) = node.child_by_field_name("value") {
                    self.eval(value);
                }
                Value::instance(ty)
            }
            "parenthesized_expression" => syntax::named_children(node)
                .into_iter()
                .next()
                .map_or(Value::Unknown, |inner| self.eval(inner)),
            "ternary_expression" => {
                let mut value = Value::Unknown;
                for child in syntax::named_children(node) {
                    let v = self.eval(child);
                    if syntax::same_node(node.child_by_field_name("consequence"), child) {
                        value = v;
                    }
                }
                value
            }
            "assignment_expression" => {
                let left = node
                    .child_by_field_name("left")
                    .map_or(Value::Unknown, |l| self.eval(l));
                if let Some(right) = node.child_by_field_name("right") {
                    self.eval(right);
                }
                left
            }
            "instanceof_expression" => {
                self.instanceof(node);
                Value::Unknown
            }
            "type_pattern" | "record_pattern_component" => {
                self.type_pattern(node);
                Value::Unknown
            }
            _ => {
                self.walk(node);
                Value::Unknown
            }
        }
    }

    fn type_declaration(&mut self, node: Node<'_>) {
        let frame = match self.index.declarations.get(&(self.unit, node.id())) {
            Some(symbol) => Frame::Type(*symbol),
            // Local class: members are not indexed, but its supertype's are.
            None => Frame::Anonymous(
                self.resolve_type_node(
                    node.child_by_field_name("superclass")
                        .and_then(|s| syntax::named_children(s).into_iter().next()),
                ),
            ),
        };

        self.push_suppressions(node);
        self.frames.push(frame);
        self.push_scope();

        let name = node.child_by_field_name("name");
        for child in syntax::named_children(node) {
            if syntax::same_node(name, child) {
                continue;
            }
            if child.kind() == "formal_parameters" {
                // Record components: only their types are usages.
                for component in syntax::named_children(child) {
                    self.parameter_types(component);
                }
                continue;
            }
            self.eval(child);
        }

        self.pop_scope();
        self.frames.pop();
        self.pop_suppressions();
    }

    fn field_declaration(&mut self, node: Node<'_>) {
        self.push_suppressions(node);
        self.walk(node);
        self.pop_suppressions();
    }

    fn method_declaration(&mut self, node: Node<'_>) {
        self.push_suppressions(node);
        self.push_scope();

        let symbol = self.index.declarations.get(&(self.unit, node.id())).copied();
        let known_params = symbol
            .and_then(|s| self.index.members.get(&s))
            .map(|m| m.type_params.clone());
        match known_params {
            Some(params) => {
                for (name, id) in params {
                    self.declare_type_param(name, id);
                }
            }
            None => self.declare_local_type_params(node),
        }

        let name = node.child_by_field_name("name");
        for child in syntax::named_children(node) {
            if !syntax::same_node(name, child) {
                self.eval(child);
            }
        }

        self.pop_scope();
        self.pop_suppressions();
    }

    fn declare_local_type_params(&mut self, node: Node<'_>) {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return;
        };
        for param in syntax::named_children(params) {
            if let Some(name_node) = syntax::child_of_kind(param, "type_identifier") {
                let name = syntax::text(name_node, self.src).to_owned();
                let id = self.table.insert(Symbol::new(
                    &name,
                    &name,
                    &self.package,
                    SymbolKind::TypeParameter,
                ));
                self.declare_type_param(name, id);
            }
        }
    }

    fn enum_constant(&mut self, node: Node<'_>) {
        self.push_suppressions(node);
        let name = node.child_by_field_name("name");
        let body = node.child_by_field_name("body");
        for child in syntax::named_children(node) {
            if syntax::same_node(name, child) || syntax::same_node(body, child) {
                continue;
            }
            self.eval(child);
        }
        if let Some(body) = body {
            self.anonymous_body(body, self.this_type());
        }
        self.pop_suppressions();
    }

    fn anonymous_body(&mut self, body: Node<'_>, supertype: Option<SymbolId>) {
        self.frames.push(Frame::Anonymous(supertype));
        self.scoped(body);
        self.frames.pop();
    }

    fn local_variable_declaration(&mut self, node: Node<'_>) {
        self.push_suppressions(node);

        let type_node = node.child_by_field_name("type");
        let inferred = type_node.is_some_and(|t| syntax::text(t, self.src) == "var");
        let declared = match type_node {
            Some(t) if !inferred => self.eval(t).as_type(),
            _ => None,
        };
        if let Some(modifiers) = syntax::child_of_kind(node, "modifiers") {
            self.eval(modifiers);
        }

        for declarator in syntax::children_by_field(node, "declarator") {
            let value = declarator
                .child_by_field_name("value")
                .map_or(Value::Unknown, |v| self.eval(v));
            let ty = match value {
                Value::Instance(t) if inferred => Some(t),
                _ => declared,
            };
            self.declare(declarator.child_by_field_name("name"), SymbolKind::LocalVariable, ty);
        }

        self.pop_suppressions();
    }

    /// Walks a parameter's modifiers and type, returning the resolved type.
    fn parameter_types(&mut self, node: Node<'_>) -> Option<SymbolId> {
        let name = node.child_by_field_name("name");
        let mut ty = None;
        for child in syntax::named_children(node) {
            if syntax::same_node(name, child) {
                continue;
            }
            match child.kind() {
                "modifiers" => {
                    self.eval(child);
                }
                "variable_declarator" | "dimensions" | "underscore_pattern" => {}
                "catch_type" => {
                    let alternatives: Vec<Value> = syntax::named_children(child)
                        .into_iter()
                        .map(|t| self.eval(t))
                        .collect();
                    if let [single] = alternatives.as_slice() {
                        ty = single.as_type();
                    }
                }
                _ => ty = self.eval(child).as_type(),
            }
        }
        ty
    }

    fn parameter(&mut self, node: Node<'_>) {
        let kind = if node.kind() == "catch_formal_parameter" {
            SymbolKind::ExceptionParameter
        } else {
            SymbolKind::Parameter
        };
        let ty = self.parameter_types(node);
        let name = node.child_by_field_name("name").or_else(|| {
            syntax::child_of_kind(node, "variable_declarator")
                .and_then(|d| d.child_by_field_name("name"))
        });
        self.declare(name, kind, ty);
    }

    fn enhanced_for(&mut self, node: Node<'_>) {
        self.push_scope();
        let ty = self.parameter_types_excluding(node, &["value", "body"]);
        if let Some(value) = node.child_by_field_name("value") {
            self.eval(value);
        }
        self.declare(node.child_by_field_name("name"), SymbolKind::LocalVariable, ty);
        if let Some(body) = node.child_by_field_name("body") {
            self.eval(body);
        }
        self.pop_scope();
    }

    fn parameter_types_excluding(&mut self, node: Node<'_>, fields: &[&str]) -> Option<SymbolId> {
        let excluded: Vec<Option<Node<'_>>> =
            fields.iter().map(|f| node.child_by_field_name(f)).collect();
        let name = node.child_by_field_name("name");
        let mut ty = None;
        for child in syntax::named_children(node) {
            if syntax::same_node(name, child) || excluded.iter().any(|e| syntax::same_node(*e, child)) {
                continue;
            }
            match child.kind() {
                "modifiers" => {
                    self.eval(child);
                }
                "dimensions" => {}
                _ => ty = self.eval(child).as_type(),
            }
        }
        ty
    }

    fn resource(&mut self, node: Node<'_>) {
        if node.child_by_field_name("name").is_none() {
            self.walk(node);
            return;
        }
        let ty = self.parameter_types_excluding(node, &["value"]);
        if let Some(value) = node.child_by_field_name("value") {
            self.eval(value);
        }
        self.declare(node.child_by_field_name("name"), SymbolKind::LocalVariable, ty);
    }

    fn lambda(&mut self, node: Node<'_>) {
        self.push_scope();
        if let Some(params) = node.child_by_field_name("parameters") {
            match params.kind() {
                "identifier" => self.declare(Some(params), SymbolKind::Parameter, None),
                "inferred_parameters" => {
                    for param in syntax::named_children(params) {
                        self.declare(Some(param), SymbolKind::Parameter, None);
                    }
                }
                _ => self.walk(params),
            }
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.eval(body);
        }
        self.pop_scope();
    }

    fn instanceof(&mut self, node: Node<'_>) {
        let name = node.child_by_field_name("name");
        let mut ty = None;
        for child in syntax::named_children(node) {
            if syntax::same_node(name, child) {
                continue;
            }
            let value = self.eval(child);
            if syntax::same_node(node.child_by_field_name("right"), child) {
                ty = value.as_type();
            }
        }
        // Pattern bindings stay visible for the rest of the enclosing scope.
        self.declare(name, SymbolKind::LocalVariable, ty);
    }

    fn type_pattern(&mut self, node: Node<'_>) {
        let mut ty = None;
        for child in syntax::named_children(node) {
            match child.kind() {
                "identifier" => self.declare(Some(child), SymbolKind::LocalVariable, ty),
                "modifiers" => {
                    self.eval(child);
                }
                _ => ty = self.eval(child).as_type(),
            }
        }
    }

    fn type_identifier(&mut self, node: Node<'_>) -> Value {
        let name = syntax::text(node, self.src);
        if name == "var" {
            return Value::Unknown;
        }
        let target = self.resolve_type(name);
        self.emit_identifier(node, name, target);
        target.map_or(Value::Unknown, Value::Type)
    }

    /// Leftmost segment of a qualified type: a type if one is in scope,
    /// otherwise a package.
    fn type_or_package(&mut self, node: Node<'_>) -> Value {
        let name = syntax::text(node, self.src);
        if let Some(ty) = self.resolve_type(name) {
            self.emit_identifier(node, name, Some(ty));
            return Value::Type(ty);
        }
        let package = self.index.package(name);
        self.emit_identifier(node, name, package);
        package.map_or(Value::Unknown, |_| Value::Package(name.to_owned()))
    }

    fn scoped_type(&mut self, node: Node<'_>) -> Value {
        let children = syntax::named_children(node);
        let Some(last) = children.iter().rev().find(|c| c.kind() == "type_identifier").copied() else {
            self.walk(node);
            return Value::Unknown;
        };

        let mut qualifier = Value::Unknown;
        for (i, child) in children.iter().enumerate() {
            if child.id() == last.id() {
                continue;
            }
            let value = match child.kind() {
                "type_identifier" if i == 0 => self.type_or_package(*child),
                "scoped_type_identifier" => self.scoped_type(*child),
                _ => self.eval(*child),
            };
            if i == 0 {
                qualifier = value;
            }
        }

        let name = syntax::text(last, self.src);
        let (target, value) = self.select(&qualifier, name, Context::Type);
        self.emit_select(last, name, target, false);
        value
    }

    /// `a.b.c` written as `identifier`/`scoped_identifier` (imports,
    /// annotation names).
    fn name_chain(&mut self, node: Node<'_>, context: Context) -> Value {
        let in_import = context == Context::Import;
        if node.kind() == "identifier" {
            let name = syntax::text(node, self.src);
            let ty = if in_import { None } else { self.resolve_type(name) };
            if let Some(ty) = ty {
                let usage = Usage::identifier(name, self.location(node))
                    .in_import(in_import)
                    .resolved_to(Some(ty));
                self.emit(usage);
                return Value::Type(ty);
            }
            let package = self.index.package(name);
            let usage = Usage::identifier(name, self.location(node))
                .in_import(in_import)
                .resolved_to(package);
            self.emit(usage);
            return package.map_or(Value::Unknown, |_| Value::Package(name.to_owned()));
        }

        let qualifier = node
            .child_by_field_name("scope")
            .map_or(Value::Unknown, |scope| self.name_chain(scope, context));
        let Some(name_node) = node.child_by_field_name("name") else {
            return Value::Unknown;
        };
        let name = syntax::text(name_node, self.src);
        let select_context = if in_import { Context::Import } else { Context::Type };
        let (target, value) = self.select(&qualifier, name, select_context);
        self.emit_select(name_node, name, target, in_import);
        value
    }

    fn annotation(&mut self, node: Node<'_>) {
        let annotation_type = node
            .child_by_field_name("name")
            .map(|name| self.name_chain(name, Context::Type))
            .and_then(|v| v.as_type());

        let Some(args) = node.child_by_field_name("arguments") else {
            return;
        };
        for arg in syntax::named_children(args) {
            if arg.kind() != "element_value_pair" {
                self.eval(arg);
                continue;
            }
            if let Some(key) = arg.child_by_field_name("key") {
                let name = syntax::text(key, self.src);
                let element = annotation_type
                    .and_then(|t| self.index.methods(t, name).first().copied());
                self.emit_identifier(key, name, element);
            }
            if let Some(value) = arg.child_by_field_name("value") {
                self.eval(value);
            }
        }
    }

    /// Expression name: locals, then fields of enclosing types, then static
    /// imports, then types, then packages.
    fn identifier(&mut self, node: Node<'_>) -> Value {
        let name = syntax::text(node, self.src);

        if let Some(local) = self.local(name) {
            self.emit_identifier(node, name, Some(local.symbol));
            return Value::instance(local.ty);
        }

        let field = self
            .enclosing_types()
            .into_iter()
            .find_map(|t| self.index.field(t, name))
            .or_else(|| self.index.static_import_field(self.unit, name));
        if let Some(field) = field {
            self.emit_identifier(node, name, Some(field));
            return Value::instance(self.index.value_type(field));
        }

        if let Some(ty) = self.resolve_type(name) {
            self.emit_identifier(node, name, Some(ty));
            return Value::Type(ty);
        }

        let package = self.index.package(name);
        self.emit_identifier(node, name, package);
        package.map_or(Value::Unknown, |_| Value::Package(name.to_owned()))
    }

    fn receiver(&mut self, object: Node<'_>) -> Value {
        if object.kind() == "super" {
            Value::instance(self.super_type())
        } else {
            self.eval(object)
        }
    }

    /// `a.b().c.d()` is walked from the innermost link outwards; each link
    /// gets the value of the one before it as its receiver.
    fn member_chain(&mut self, node: Node<'_>) -> Value {
        let mut spine = vec![node];
        while let Some(object) = spine
            .last()
            .and_then(|link| link.child_by_field_name("object"))
            .filter(|object| matches!(object.kind(), "field_access" | "method_invocation"))
        {
            spine.push(object);
        }

        let mut value = None;
        for link in spine.into_iter().rev() {
            let next = if link.kind() == "method_invocation" {
                self.method_invocation(link, value.take())
            } else {
                self.field_access(link, value.take())
            };
            value = Some(next);
        }
        value.unwrap_or(Value::Unknown)
    }

    /// Operators nest to the left, so `a + b + c` is walked down its left
    /// spine instead of recursing per operand.
    fn binary_chain(&mut self, node: Node<'_>) {
        let mut spine = vec![node];
        while let Some(left) = spine
            .last()
            .and_then(|op| op.child_by_field_name("left"))
            .filter(|left| left.kind() == "binary_expression")
        {
            spine.push(left);
        }

        if let Some(left) = spine.last().and_then(|op| op.child_by_field_name("left")) {
            self.eval(left);
        }
        for op in spine.into_iter().rev() {
            if let Some(right) = op.child_by_field_name("right") {
                self.eval(right);
            }
        }
    }

    fn switch(&mut self, node: Node<'_>) {
        let selector = node
            .child_by_field_name("condition")
            .map_or(Value::Unknown, |condition| self.eval(condition));
        self.switches.push(selector.receiver());
        if let Some(body) = node.child_by_field_name("body") {
            self.eval(body);
        }
        self.switches.pop();
    }

    /// `case B:` in a switch over an enum names the constant `B` of the
    /// selector's type.
    fn switch_label(&mut self, node: Node<'_>) {
        let selector = self.switches.last().copied().flatten();
        for child in syntax::named_children(node) {
            let name = syntax::text(child, self.src);
            let constant = selector
                .filter(|_| child.kind() == "identifier")
                .and_then(|ty| self.selector_constant(ty, name));
            match constant {
                Some(constant) => self.emit_identifier(child, name, Some(constant)),
                None => {
                    self.eval(child);
                }
            }
        }
    }

    fn selector_constant(&self, ty: SymbolId, name: &str) -> Option<SymbolId> {
        self.index
            .field(ty, name)
            .filter(|field| self.table.get(*field).is_some_and(|s| s.kind == SymbolKind::EnumConstant))
    }

    fn field_access(&mut self, node: Node<'_>, qualifier: Option<Value>) -> Value {
        let qualifier = match qualifier {
            Some(value) => value,
            None => node
                .child_by_field_name("object")
                .map_or(Value::Unknown, |object| self.receiver(object)),
        };
        let Some(field) = node.child_by_field_name("field") else {
            return Value::Unknown;
        };
        if field.kind() == "this" {
            return qualifier.as_type().map_or(Value::Unknown, Value::Instance);
        }

        let name = syntax::text(field, self.src);
        let (target, value) = self.select(&qualifier, name, Context::Expression);
        self.emit_select(field, name, target, false);
        value
    }

    fn method_invocation(&mut self, node: Node<'_>, receiver: Option<Value>) -> Value {
        let Some(name_node) = node.child_by_field_name("name") else {
            self.walk(node);
            return Value::Unknown;
        };
        let name = syntax::text(name_node, self.src);
        let args = node.child_by_field_name("arguments");
        let count = args.map(syntax::argument_count);

        let target = if let Some(object) = node.child_by_field_name("object") {
            let receiver = match receiver {
                Some(value) => value,
                None => self.receiver(object),
            };
            let target = receiver
                .receiver()
                .and_then(|t| self.index.select_overload(&self.index.methods(t, name), count));
            self.emit_select(name_node, name, target, false);
            target
        } else {
            let target = self
                .enclosing_types()
                .into_iter()
                .find_map(|t| self.index.select_overload(&self.index.methods(t, name), count))
                .or_else(|| {
                    self.index
                        .select_overload(&self.index.static_import_methods(self.unit, name), count)
                });
            self.emit_identifier(name_node, name, target);
            target
        };

        if let Some(type_args) = node.child_by_field_name("type_arguments") {
            self.eval(type_args);
        }
        if let Some(args) = args {
            self.walk(args);
        }
        Value::instance(target.and_then(|m| self.index.value_type(m)))
    }

    fn object_creation(&mut self, node: Node<'_>) -> Value {
        let type_node = node.child_by_field_name("type");
        let args = node.child_by_field_name("arguments");
        let body = syntax::child_of_kind(node, "class_body");

        // Outer instance of a qualified creation (`outer.new Inner()`) and
        // explicit type arguments.
        for child in syntax::named_children(node) {
            if syntax::same_node(type_node, child)
                || syntax::same_node(args, child)
                || syntax::same_node(body, child)
            {
                continue;
            }
            self.eval(child);
        }

        let ty = type_node.map(|t| self.eval(t)).and_then(|v| v.as_type());
        if let Some(args) = args {
            self.walk(args);
        }
        if let Some(body) = body {
            self.anonymous_body(body, ty);
        }
        Value::instance(ty)
    }

    /// `Q::m` and `Q::new` report the member only.
    fn method_reference(&mut self, node: Node<'_>) {
        let children = syntax::named_children(node);
        let Some(qualifier) = children.first().copied() else {
            return;
        };

        let receiver = match qualifier.kind() {
            "super" => Value::instance(self.super_type()),
            "identifier" | "field_access" | "scoped_identifier" | "type_identifier"
            | "scoped_type_identifier" | "generic_type" => {
                self.muted += 1;
                let value = self.eval(qualifier);
                self.muted -= 1;
                value
            }
            _ => self.eval(qualifier),
        };

        for child in children.iter().skip(1) {
            if child.kind() == "type_arguments" {
                self.eval(*child);
            }
        }

        let mut cursor = node.walk();
        let member = node.children(&mut cursor).last();
        let Some(member) = member else {
            return;
        };
        let Some(ty) = receiver.receiver() else {
            if member.kind() == "identifier" {
                let name = syntax::text(member, self.src);
                self.emit_select(member, name, None, false);
            }
            return;
        };

        match member.kind() {
            "new" => {
                let target = self.index.constructors(ty).first().copied();
                self.emit_select(member, "new", target, false);
            }
            "identifier" => {
                let name = syntax::text(member, self.src);
                let target = self.index.methods(ty, name).first().copied();
                self.emit_select(member, name, target, false);
            }
            _ => {}
        }
    }

    fn explicit_constructor_invocation(&mut self, node: Node<'_>) {
        if let Some(object) = node.child_by_field_name("object") {
            self.eval(object);
        }
        if let Some(type_args) = syntax::child_of_kind(node, "type_arguments") {
            self.eval(type_args);
        }

        let args = node.child_by_field_name("arguments");
        if let Some(keyword) = node.child_by_field_name("constructor") {
            let (name, owner) = if keyword.kind() == "super" {
                ("super", self.super_type())
            } else {
                ("this", self.this_type())
            };
            let target = owner.and_then(|t| {
                self.index
                    .select_overload(self.index.constructors(t), args.map(syntax::argument_count))
            });
            self.emit_identifier(keyword, name, target);
        }

        if let Some(args) = args {
            self.walk(args);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Program;
    use unstable_lint_core::UsageShape;

    fn usages(sources: &[(&str, &str)]) -> (Program, Vec<Vec<Usage>>) {
        let mut program = Program::parse(
            sources
                .iter()
                .map(|(p, s)| (std::path::PathBuf::from(p), (*s).to_string()))
                .collect(),
        )
        .expect("parses");
        let all = (0..program.unit_count())
            .map(|u| program.usages(u).expect("usages"))
            .collect();
        (program, all)
    }

    fn names(usages: &[Usage]) -> Vec<String> {
        usages
            .iter()
            .map(|u| match &u.shape {
                UsageShape::Identifier { name } => format!("id:{name}"),
                UsageShape::MemberSelect { member } => format!("sel:{member}"),
            })
            .collect()
    }

    fn target_name<'p>(program: &'p Program, usage: &Usage) -> Option<&'p str> {
        usage
            .target
            .and_then(|t| program.table().get(t))
            .map(|s| s.qualified_name.as_str())
    }

    const LIB: &str = r"
package com.lib;

public class Widget {
  public static final int SIZE = 1;
  public Widget() {}
  public static Widget create() { return new Widget(); }
  public Part part() { return null; }
  public void run() {}
  public static class Part { public void spin() {} }
}
";

    #[test]
    fn declaration_names_are_not_usages() {
        let (_, all) = usages(&[(
            "T.java",
            "package p; class T<X> { int count; void go(int n) { int k = n; } }",
        )]);
        assert_eq!(names(&all[0]), vec!["id:n"]);
    }

    #[test]
    fn import_segments_are_member_selects_in_import() {
        let (program, all) = usages(&[
            ("com/lib/Widget.java", LIB),
            ("app/Main.java", "package app;\nimport com.lib.Widget;\nclass Main {}"),
        ]);
        let main = &all[1];
        assert_eq!(names(main), vec!["id:com", "sel:lib", "sel:Widget"]);
        assert!(main[1].in_import && main[2].in_import);
        assert_eq!(target_name(&program, &main[2]), Some("com.lib.Widget"));
        assert_eq!(target_name(&program, &main[1]), Some("com.lib"));
    }

    #[test]
    fn receiver_type_flows_through_locals_and_calls() {
        let (program, all) = usages(&[
            ("com/lib/Widget.java", LIB),
            (
                "app/Main.java",
                "package app;
import com.lib.Widget;
class Main {
  void go() {
    Widget w = Widget.create();
    w.part().spin();
  }
}",
            ),
        ]);
        let main = &all[1];
        let spin = main
            .iter()
            .find(|u| u.name() == "spin")
            .expect("spin usage");
        assert!(matches!(spin.shape, UsageShape::MemberSelect { .. }));
        assert_eq!(target_name(&program, spin), Some("spin"));
        let owner = spin
            .target
            .and_then(|t| program.table().get(t))
            .and_then(|s| s.owner)
            .and_then(|o| program.table().get(o))
            .map(|s| s.qualified_name.clone());
        assert_eq!(owner.as_deref(), Some("com.lib.Widget.Part"));
    }

    #[test]
    fn qualified_type_reports_each_segment() {
        let (program, all) = usages(&[
            ("com/lib/Widget.java", LIB),
            ("app/Main.java", "package app; class Main { com.lib.Widget.Part p; }"),
        ]);
        let main = &all[1];
        assert_eq!(names(main), vec!["id:com", "sel:lib", "sel:Widget", "sel:Part"]);
        assert_eq!(target_name(&program, &main[3]), Some("com.lib.Widget.Part"));
        assert_eq!(main[3].location.line, 1);
    }

    #[test]
    fn method_reference_reports_member_only() {
        let (program, all) = usages(&[
            ("com/lib/Widget.java", LIB),
            (
                "app/Main.java",
                "package app;
import com.lib.Widget;
import java.util.function.Supplier;
class Main {
  Supplier<Widget> a = Widget::create;
  Supplier<Widget> b = Widget::new;
}",
            ),
        ]);
        let refs: Vec<&Usage> = all[1].iter().filter(|u| u.location.line >= 5).collect();
        let shapes: Vec<String> = refs
            .iter()
            .map(|u| names(std::slice::from_ref(*u)).remove(0))
            .collect();
        assert_eq!(
            shapes,
            vec!["id:Supplier", "id:Widget", "sel:create", "id:Supplier", "id:Widget", "sel:new"]
        );
        assert_eq!(target_name(&program, refs[5]), Some("<init>"));
    }

    #[test]
    fn explicit_super_call_is_a_super_identifier() {
        let (_, all) = usages(&[
            ("com/lib/Widget.java", LIB),
            (
                "app/Sub.java",
                "package app; class Sub extends com.lib.Widget { Sub() { super(); } }",
            ),
        ]);
        let sup = all[1].iter().find(|u| u.name() == "super").expect("super");
        assert!(sup.target.is_some());
    }

    #[test]
    fn suppressions_flow_from_enclosing_declarations() {
        let (_, all) = usages(&[(
            "T.java",
            r#"package p;
@SuppressWarnings("BetaApi")
class T {
  @SuppressWarnings("beta-api") void go(int n) { n++; }
  void other(int m) { m++; }
}"#,
        )]);
        let n = all[0].iter().find(|u| u.name() == "n").expect("n");
        assert_eq!(&*n.suppressions, &["BetaApi".to_string(), "beta-api".to_string()]);
        let m = all[0].iter().find(|u| u.name() == "m").expect("m");
        assert_eq!(&*m.suppressions, &["BetaApi".to_string()]);
    }
    #[test]
    fn long_operator_and_call_chains_stay_flat() {
        let terms = vec!["Widget.SIZE"; 5000].join(" + ");
        let calls = ".part()".repeat(2000);
        let main = format!(
            "package app;\nimport com.lib.Widget;\nclass Main {{\n  int total = {terms};\n  Object p = new Widget(){calls};\n}}"
        );
        let (_, all) = usages(&[("com/lib/Widget.java", LIB), ("app/Main.java", &main)]);
        let sizes = all[1].iter().filter(|u| u.name() == "SIZE").count();
        let parts = all[1].iter().filter(|u| u.name() == "part").count();
        assert_eq!(sizes, 5000);
        assert_eq!(parts, 2000);
    }

    #[test]
    fn excessive_nesting_is_an_error() {
        let depth = MAX_NESTING * 2;
        let main = format!(
            "package app;\nclass Main {{\n  int x = {}1{};\n}}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let mut program =
            Program::parse(vec![(std::path::PathBuf::from("app/Main.java"), main)]).expect("parses");
        let err = program.usages(0).unwrap_err();
        assert!(matches!(err, AnalyzerError::NestingTooDeep { line: 3, .. }), "{err}");
    }

    #[test]
    fn case_labels_resolve_against_the_selector_enum() {
        let (program, all) = usages(&[(
            "p/Main.java",
            "package p;
enum Mode { A, B }
class Main {
  int B = 0;
  int go(Mode m) {
    switch (m) {
      case A: return 1;
      case B: return B;
      default: return 0;
    }
  }
}",
        )]);
        let labels: Vec<(usize, Option<&str>)> = all[0]
            .iter()
            .filter(|u| u.location.line >= 7)
            .map(|u| (u.location.line, target_name(&program, u)))
            .collect();
        let kinds: Vec<SymbolKind> = all[0]
            .iter()
            .filter(|u| u.location.line == 8)
            .filter_map(|u| u.target.and_then(|t| program.table().get(t)))
            .map(|s| s.kind)
            .collect();
        assert_eq!(labels, vec![(7, Some("A")), (8, Some("B")), (8, Some("B"))]);
        assert_eq!(kinds, vec![SymbolKind::EnumConstant, SymbolKind::Field]);
    }
}
