//! Resolved declarations and the arena that holds them.
//!
//! A [`Symbol`] is an immutable snapshot produced by a front end (e.g. the
//! Java indexer). The owner of a symbol is a [`SymbolId`] into the same
//! [`SymbolTable`]; it is a lookup relation, never an ownership pointer.

use crate::usage::Usage;

/// Index of a symbol inside a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(usize);

impl SymbolId {
    /// Returns the raw arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Kind of a resolved declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A package (namespace).
    Package,
    /// A class or record.
    Class,
    /// An interface.
    Interface,
    /// An enum type.
    Enum,
    /// An annotation type (`@interface`).
    AnnotationType,
    /// A field or interface constant.
    Field,
    /// A method or annotation element.
    Method,
    /// A constructor.
    Constructor,
    /// An enum constant.
    EnumConstant,
    /// A generic type parameter.
    TypeParameter,
    /// A local variable (including resources and pattern bindings).
    LocalVariable,
    /// A method, constructor, or lambda parameter.
    Parameter,
    /// A `catch` clause parameter.
    ExceptionParameter,
}

impl SymbolKind {
    /// Whether a symbol of this kind is a member or nested declaration that
    /// takes on the restricted status of its owner.
    ///
    /// Type parameters and locals never inherit, so a type parameter declared
    /// inside a restricted class is not itself restricted.
    #[must_use]
    pub fn inherits_from_owner(self) -> bool {
        matches!(
            self,
            Self::Field
                | Self::Method
                | Self::Constructor
                | Self::EnumConstant
                | Self::Class
                | Self::Interface
                | Self::Enum
                | Self::AnnotationType
        )
    }

    /// Whether this kind declares a type.
    #[must_use]
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Enum | Self::AnnotationType
        )
    }
}

/// A resolved declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Simple name (`AnnotatedClass`, `staticMethod`, `<init>` for constructors).
    pub name: String,
    /// Fully qualified name for types and packages, simple name for members.
    pub qualified_name: String,
    /// Dotted name of the declaring package (empty for the unnamed package).
    pub package: String,
    /// Enclosing declaration, if any.
    pub owner: Option<SymbolId>,
    /// Kind of declaration.
    pub kind: SymbolKind,
    /// Fully qualified names of the annotations applied directly to this symbol.
    pub annotations: Vec<String>,
}

impl Symbol {
    /// Creates a symbol with no owner and no annotations.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        qualified_name: impl Into<String>,
        package: impl Into<String>,
        kind: SymbolKind,
    ) -> Self {
        Self {
            name: name.into(),
            qualified_name: qualified_name.into(),
            package: package.into(),
            owner: None,
            kind,
            annotations: Vec::new(),
        }
    }

    /// Sets the owning declaration.
    #[must_use]
    pub fn with_owner(mut self, owner: SymbolId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Adds an annotation by fully qualified name.
    #[must_use]
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Returns true if this symbol carries the given annotation directly.
    #[must_use]
    pub fn has_annotation(&self, qualified_name: &str) -> bool {
        self.annotations.iter().any(|a| a == qualified_name)
    }
}

/// Arena of symbols addressed by [`SymbolId`].
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a symbol and returns its id.
    pub fn insert(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    /// Looks up a symbol.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    /// Mutable access, for front ends that fill in annotations after insertion.
    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0)
    }

    /// Number of symbols in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the table holds no symbols.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates over all symbols with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i), s))
    }
}

/// Resolves usage references to declared symbols.
///
/// This is the seam to the front end: the matcher only ever sees symbols
/// through this trait and borrows them for the duration of one evaluation.
pub trait SymbolResolver {
    /// Returns the declaration a usage refers to, or `None` if unresolved.
    fn resolve(&self, usage: &Usage) -> Option<&Symbol>;

    /// Looks up a symbol by id (used to walk owner chains).
    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;
}

impl SymbolResolver for SymbolTable {
    fn resolve(&self, usage: &Usage) -> Option<&Symbol> {
        usage.target.and_then(|id| self.get(id))
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut table = SymbolTable::new();
        let pkg = table.insert(Symbol::new(
            "foo",
            "com.google.common.foo",
            "com.google.common.foo",
            SymbolKind::Package,
        ));
        let class = table.insert(
            Symbol::new(
                "AnnotatedClass",
                "com.google.common.foo.AnnotatedClass",
                "com.google.common.foo",
                SymbolKind::Class,
            )
            .with_owner(pkg)
            .with_annotation("com.google.common.annotations.Beta"),
        );

        assert_eq!(table.len(), 2);
        let sym = table.get(class).expect("class symbol");
        assert_eq!(sym.owner, Some(pkg));
        assert!(sym.has_annotation("com.google.common.annotations.Beta"));
        assert!(!sym.has_annotation("Beta"));
    }

    #[test]
    fn inheriting_kinds() {
        assert!(SymbolKind::Method.inherits_from_owner());
        assert!(SymbolKind::AnnotationType.inherits_from_owner());
        assert!(!SymbolKind::TypeParameter.inherits_from_owner());
        assert!(!SymbolKind::LocalVariable.inherits_from_owner());
        assert!(!SymbolKind::Package.inherits_from_owner());
    }
}
