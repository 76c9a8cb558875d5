//! Tree-sitter plumbing shared by the three passes.

use std::path::PathBuf;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::AnalyzerError;

/// Dotted name split into segments (`["java", "util", "List"]`).
pub(crate) type TypeName = Vec<String>;

/// A parsed compilation unit.
pub(crate) struct SourceUnit {
    pub path: PathBuf,
    pub source: String,
    pub tree: Tree,
}

impl SourceUnit {
    pub fn src(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

pub(crate) fn language() -> Language {
    tree_sitter_java::LANGUAGE.into()
}

pub(crate) fn new_parser() -> Result<Parser, AnalyzerError> {
    let mut parser = Parser::new();
    parser.set_language(&language())?;
    Ok(parser)
}

pub(crate) fn parse(
    parser: &mut Parser,
    path: PathBuf,
    source: String,
) -> Result<SourceUnit, AnalyzerError> {
    let tree = parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| AnalyzerError::Parse {
            path: path.clone(),
            message: "parser produced no tree".to_string(),
        })?;
    Ok(SourceUnit { path, source, tree })
}

pub(crate) fn text<'a>(node: Node<'_>, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

pub(crate) fn is_comment(node: Node<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

pub(crate) fn is_annotation(node: Node<'_>) -> bool {
    matches!(node.kind(), "marker_annotation" | "annotation")
}

/// Named children, comments excluded.
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|c| !is_comment(*c))
        .collect();
    children
}

pub(crate) fn children_by_field<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children = node.children_by_field_name(field, &mut cursor).collect();
    children
}

pub(crate) fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    named_children(node).into_iter().find(|c| c.kind() == kind)
}

pub(crate) fn same_node(a: Option<Node<'_>>, b: Node<'_>) -> bool {
    a.is_some_and(|a| a.id() == b.id())
}

/// Splits `a.b.C` (possibly spread over lines) into segments.
pub(crate) fn dotted(node: Node<'_>, src: &[u8]) -> TypeName {
    text(node, src)
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Syntactic name of a reference type, generic arguments and annotations
/// dropped. Primitives, `void` and arrays yield `None`.
pub(crate) fn type_name(node: Node<'_>, src: &[u8]) -> Option<TypeName> {
    match node.kind() {
        "type_identifier" | "identifier" => Some(vec![text(node, src).to_owned()]),
        "scoped_type_identifier" | "scoped_identifier" => {
            let mut segments = Vec::new();
            for child in named_children(node) {
                match child.kind() {
                    "type_identifier" | "identifier" => segments.push(text(child, src).to_owned()),
                    "scoped_type_identifier" | "scoped_identifier" | "generic_type" => {
                        segments.extend(type_name(child, src)?);
                    }
                    _ => {}
                }
            }
            Some(segments)
        }
        "generic_type" => named_children(node)
            .into_iter()
            .find(|c| matches!(c.kind(), "type_identifier" | "scoped_type_identifier"))
            .and_then(|base| type_name(base, src)),
        "annotated_type" => named_children(node)
            .into_iter()
            .rev()
            .find(|c| !is_annotation(*c))
            .and_then(|inner| type_name(inner, src)),
        _ => None,
    }
}

/// Annotations applied through a declaration's `modifiers` child, or
/// directly (package declarations).
pub(crate) fn annotations(node: Node<'_>) -> Vec<Node<'_>> {
    let holder = if node.kind() == "package_declaration" {
        Some(node)
    } else {
        child_of_kind(node, "modifiers")
    };
    holder
        .map(|h| named_children(h).into_iter().filter(|c| is_annotation(*c)).collect())
        .unwrap_or_default()
}

pub(crate) fn annotation_name(annotation: Node<'_>, src: &[u8]) -> TypeName {
    annotation
        .child_by_field_name("name")
        .map(|n| dotted(n, src))
        .unwrap_or_default()
}

/// Values of `@SuppressWarnings` on a declaration.
pub(crate) fn suppressed_warnings(decl: Node<'_>, src: &[u8]) -> Vec<String> {
    let mut values = Vec::new();
    for annotation in annotations(decl) {
        let name = annotation_name(annotation, src);
        if name.last().map(String::as_str) != Some("SuppressWarnings") {
            continue;
        }
        if let Some(args) = annotation.child_by_field_name("arguments") {
            collect_strings(args, src, &mut values);
        }
    }
    values
}

fn collect_strings(node: Node<'_>, src: &[u8], out: &mut Vec<String>) {
    if node.kind() == "string_literal" {
        out.push(text(node, src).trim_matches('"').to_owned());
        return;
    }
    for child in named_children(node) {
        collect_strings(child, src, out);
    }
}

/// Parameter count and varargs flag of a `formal_parameters` node.
pub(crate) fn parameter_shape(params: Node<'_>) -> (usize, bool) {
    let mut arity = 0;
    let mut varargs = false;
    for param in named_children(params) {
        match param.kind() {
            "formal_parameter" => arity += 1,
            "spread_parameter" => {
                arity += 1;
                varargs = true;
            }
            _ => {}
        }
    }
    (arity, varargs)
}

pub(crate) fn argument_count(args: Node<'_>) -> usize {
    named_children(args).len()
}

pub(crate) fn position(node: Node<'_>) -> (usize, usize) {
    let point = node.start_position();
    (point.row + 1, point.column + 1)
}
