//! Immutable per-rule configuration for restricted-API checks.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Predicate over a dotted name, injected to extend the ignore sets.
pub type NamePredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// What a restricted-API rule instance looks for and what it exempts.
///
/// Built once when a rule is registered and never mutated afterwards.
/// Several instances with different exemptions can coexist.
#[derive(Clone)]
pub struct ApiRuleConfig {
    base_namespace: String,
    base_namespace_dot: String,
    restricted_annotation: String,
    ignored_namespaces: BTreeSet<String>,
    ignored_types: BTreeSet<String>,
    namespace_filter: Option<NamePredicate>,
    type_filter: Option<NamePredicate>,
}

impl ApiRuleConfig {
    /// Creates a configuration scoped to `base_namespace` that flags
    /// declarations annotated with `restricted_annotation` (fully qualified).
    #[must_use]
    pub fn new(base_namespace: impl Into<String>, restricted_annotation: impl Into<String>) -> Self {
        let base_namespace = base_namespace.into();
        let base_namespace_dot = format!("{base_namespace}.");
        Self {
            base_namespace,
            base_namespace_dot,
            restricted_annotation: restricted_annotation.into(),
            ignored_namespaces: BTreeSet::new(),
            ignored_types: BTreeSet::new(),
            namespace_filter: None,
            type_filter: None,
        }
    }

    /// Exempts a sub-namespace (exact package name).
    #[must_use]
    pub fn ignore_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.ignored_namespaces.insert(namespace.into());
        self
    }

    /// Exempts several sub-namespaces.
    #[must_use]
    pub fn ignore_namespaces<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_namespaces
            .extend(namespaces.into_iter().map(Into::into));
        self
    }

    /// Exempts a type (and, through the owner chain, its members).
    #[must_use]
    pub fn ignore_type(mut self, qualified_name: impl Into<String>) -> Self {
        self.ignored_types.insert(qualified_name.into());
        self
    }

    /// Exempts several types.
    #[must_use]
    pub fn ignore_types<I, S>(mut self, qualified_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_types
            .extend(qualified_names.into_iter().map(Into::into));
        self
    }

    /// Adds a predicate consulted after the ignored-namespace set.
    #[must_use]
    pub fn with_namespace_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.namespace_filter = Some(Arc::new(filter));
        self
    }

    /// Adds a predicate consulted after the ignored-type set.
    #[must_use]
    pub fn with_type_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.type_filter = Some(Arc::new(filter));
        self
    }

    /// Root namespace this rule is scoped to.
    #[must_use]
    pub fn base_namespace(&self) -> &str {
        &self.base_namespace
    }

    /// Fully qualified name of the restricted annotation.
    #[must_use]
    pub fn restricted_annotation(&self) -> &str {
        &self.restricted_annotation
    }

    /// Explicitly ignored sub-namespaces.
    #[must_use]
    pub fn ignored_namespaces(&self) -> &BTreeSet<String> {
        &self.ignored_namespaces
    }

    /// Explicitly ignored types.
    #[must_use]
    pub fn ignored_types(&self) -> &BTreeSet<String> {
        &self.ignored_types
    }

    /// Returns true if declarations in `namespace` are exempt.
    #[must_use]
    pub fn is_ignored_namespace(&self, namespace: &str) -> bool {
        self.ignored_namespaces.contains(namespace)
            || self.namespace_filter.as_ref().is_some_and(|f| f(namespace))
    }

    /// Returns true if the type named `qualified_name` is exempt.
    #[must_use]
    pub fn is_ignored_type(&self, qualified_name: &str) -> bool {
        self.ignored_types.contains(qualified_name)
            || self.type_filter.as_ref().is_some_and(|f| f(qualified_name))
    }

    /// Returns true if `namespace` is the base namespace or a dotted
    /// descendant of it.
    ///
    /// `com.google.common2` is not inside `com.google.common`.
    #[must_use]
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        namespace == self.base_namespace || namespace.starts_with(&self.base_namespace_dot)
    }
}

impl fmt::Debug for ApiRuleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRuleConfig")
            .field("base_namespace", &self.base_namespace)
            .field("restricted_annotation", &self.restricted_annotation)
            .field("ignored_namespaces", &self.ignored_namespaces)
            .field("ignored_types", &self.ignored_types)
            .field("namespace_filter", &self.namespace_filter.is_some())
            .field("type_filter", &self.type_filter.is_some())
            .finish()
    }
}
