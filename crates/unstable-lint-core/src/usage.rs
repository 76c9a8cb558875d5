//! Usage references: the syntax nodes a rule is asked to judge.

use std::sync::Arc;

use crate::symbol::SymbolId;
use crate::types::Location;

/// The two matchable syntax shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageShape {
    /// A bare name (`AnnotatedClass`, `staticMethod`, `super`).
    Identifier {
        /// Textual value of the identifier.
        name: String,
    },
    /// A `receiver.member` selection (including qualified type names and
    /// method/constructor references).
    MemberSelect {
        /// Name of the selected member.
        member: String,
    },
}

/// A reference to a declaration found while walking a compilation unit.
#[derive(Debug, Clone)]
pub struct Usage {
    /// Syntactic shape.
    pub shape: UsageShape,
    /// Whether the node lies inside an import declaration.
    pub in_import: bool,
    /// Where the reference appears.
    pub location: Location,
    /// Declaration the front end resolved this reference to.
    pub target: Option<SymbolId>,
    /// Rule names suppressed for this reference by enclosing declarations.
    pub suppressions: Arc<[String]>,
}

impl Usage {
    /// Creates an identifier reference.
    #[must_use]
    pub fn identifier(name: impl Into<String>, location: Location) -> Self {
        Self::with_shape(UsageShape::Identifier { name: name.into() }, location)
    }

    /// Creates a member-select reference.
    #[must_use]
    pub fn member_select(member: impl Into<String>, location: Location) -> Self {
        Self::with_shape(
            UsageShape::MemberSelect {
                member: member.into(),
            },
            location,
        )
    }

    fn with_shape(shape: UsageShape, location: Location) -> Self {
        Self {
            shape,
            in_import: false,
            location,
            target: None,
            suppressions: Arc::from(Vec::new()),
        }
    }

    /// Marks whether the reference sits inside an import declaration.
    #[must_use]
    pub fn in_import(mut self, in_import: bool) -> Self {
        self.in_import = in_import;
        self
    }

    /// Sets the resolved declaration.
    #[must_use]
    pub fn resolved_to(mut self, target: Option<SymbolId>) -> Self {
        self.target = target;
        self
    }

    /// Sets the suppressed rule names.
    #[must_use]
    pub fn suppressed(mut self, suppressions: Arc<[String]>) -> Self {
        self.suppressions = suppressions;
        self
    }

    /// Returns true if any of `keys` is suppressed at this reference.
    #[must_use]
    pub fn is_suppressed_for(&self, keys: &[&str]) -> bool {
        self.suppressions
            .iter()
            .any(|s| s == "all" || keys.iter().any(|k| s == k))
    }

    /// The textual name this reference uses.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.shape {
            UsageShape::Identifier { name } => name,
            UsageShape::MemberSelect { member } => member,
        }
    }
}
