//! Rule traits and the generic restricted-API rule.

use crate::matcher::{evaluate, Verdict};
use crate::restriction::ApiRuleConfig;
use crate::symbol::SymbolResolver;
use crate::types::{Severity, Suggestion, Violation};
use crate::usage::Usage;

/// A rule that judges usage references one at a time.
///
/// The host walks a compilation unit, resolves every identifier and
/// member-select node into a [`Usage`], and asks each rule for a verdict.
/// Rules hold only immutable configuration, so one instance can be shared
/// across threads and files.
///
/// # Example
///
/// ```ignore
/// use unstable_lint_core::{UsageRule, Usage, SymbolResolver, Verdict};
///
/// struct NoDeprecated;
///
/// impl UsageRule for NoDeprecated {
///     fn name(&self) -> &str { "no-deprecated" }
///     fn code(&self) -> &str { "UA900" }
///
///     fn evaluate(&self, usage: &Usage, resolver: &dyn SymbolResolver) -> Verdict {
///         resolver
///             .resolve(usage)
///             .is_some_and(|s| s.has_annotation("java.lang.Deprecated"))
///             .into()
///     }
/// }
/// ```
pub trait UsageRule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "beta-api").
    fn name(&self) -> &str;

    /// Returns the rule code (e.g., "UA001").
    fn code(&self) -> &str;

    /// Returns the checker name used in messages and `@SuppressWarnings`
    /// (e.g., "BetaApi"). Defaults to [`UsageRule::name`].
    fn display_name(&self) -> &str {
        self.name()
    }

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &str {
        ""
    }

    /// Returns a longer explanation, shown as help text.
    fn explanation(&self) -> Option<&str> {
        None
    }

    /// Returns a documentation link.
    fn link(&self) -> Option<&str> {
        None
    }

    /// Returns the category tag (e.g., "guava").
    fn category(&self) -> &str {
        "general"
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Decides whether a single usage is reported.
    fn evaluate(&self, usage: &Usage, resolver: &dyn SymbolResolver) -> Verdict;

    /// Evaluates every usage of a compilation unit and returns violations
    /// for the matches, skipping suppressed references.
    fn check(&self, usages: &[Usage], resolver: &dyn SymbolResolver) -> Vec<Violation> {
        let keys = [self.name(), self.code(), self.display_name()];
        usages
            .iter()
            .filter(|u| !u.is_suppressed_for(&keys))
            .filter(|u| self.evaluate(u, resolver).is_match())
            .map(|u| self.report(u))
            .collect()
    }

    /// Builds the violation for a matched usage.
    fn report(&self, usage: &Usage) -> Violation {
        let mut violation = Violation::new(
            self.code(),
            self.name(),
            self.default_severity(),
            usage.location.clone(),
            format!("[{}] {}", self.display_name(), self.description()),
        );
        if let Some(explanation) = self.explanation() {
            violation = violation.with_suggestion(Suggestion::new(explanation));
        }
        if let Some(link) = self.link() {
            violation = violation.with_link(link);
        }
        violation
    }
}

/// Type alias for boxed `UsageRule` trait objects.
pub type RuleBox = Box<dyn UsageRule>;

/// Descriptive registration data for a rule. Purely informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMetadata {
    /// Kebab-case name (e.g., "beta-api").
    pub name: String,
    /// Rule code (e.g., "UA001").
    pub code: String,
    /// Checker name (e.g., "BetaApi").
    pub display_name: String,
    /// One-line summary.
    pub summary: String,
    /// Longer explanation.
    pub explanation: Option<String>,
    /// Documentation link.
    pub link: Option<String>,
    /// Default severity.
    pub severity: Severity,
    /// Category tag.
    pub category: String,
}

impl RuleMetadata {
    /// Creates metadata with error severity and the "general" category.
    #[must_use]
    pub fn new(name: impl Into<String>, code: impl Into<String>, summary: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            code: code.into(),
            summary: summary.into(),
            explanation: None,
            link: None,
            severity: Severity::Error,
            category: "general".to_string(),
        }
    }

    /// Sets the checker name.
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the explanation.
    #[must_use]
    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Sets the documentation link.
    #[must_use]
    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Sets the severity.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// Flags usages of APIs carrying a restricted annotation.
///
/// Every restricted-annotation check is an instance of this one type; the
/// variants differ only in [`RuleMetadata`] and [`ApiRuleConfig`].
#[derive(Debug, Clone)]
pub struct AnnotatedApiRule {
    metadata: RuleMetadata,
    config: ApiRuleConfig,
}

impl AnnotatedApiRule {
    /// Creates a rule from metadata and configuration.
    #[must_use]
    pub fn new(metadata: RuleMetadata, config: ApiRuleConfig) -> Self {
        Self { metadata, config }
    }

    /// Returns the rule's metadata.
    #[must_use]
    pub fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    /// Returns the rule's configuration.
    #[must_use]
    pub fn config(&self) -> &ApiRuleConfig {
        &self.config
    }

    /// Overrides the default severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.metadata.severity = severity;
        self
    }
}

impl UsageRule for AnnotatedApiRule {
    fn name(&self) -> &str {
        &self.metadata.name
    }

    fn code(&self) -> &str {
        &self.metadata.code
    }

    fn display_name(&self) -> &str {
        &self.metadata.display_name
    }

    fn description(&self) -> &str {
        &self.metadata.summary
    }

    fn explanation(&self) -> Option<&str> {
        self.metadata.explanation.as_deref()
    }

    fn link(&self) -> Option<&str> {
        self.metadata.link.as_deref()
    }

    fn category(&self) -> &str {
        &self.metadata.category
    }

    fn default_severity(&self) -> Severity {
        self.metadata.severity
    }

    fn evaluate(&self, usage: &Usage, resolver: &dyn SymbolResolver) -> Verdict {
        evaluate(usage, resolver, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{Symbol, SymbolKind, SymbolTable};
    use crate::types::Location;
    use std::path::PathBuf;
    use std::sync::Arc;

    const UNSTABLE: &str = "com.example.annotations.Unstable";

    fn rule() -> AnnotatedApiRule {
        AnnotatedApiRule::new(
            RuleMetadata::new("unstable-api", "UA100", "Unstable APIs may change")
                .display_name("UnstableApi")
                .explanation("Avoid unstable APIs in library code.")
                .link("https://example.com/unstable")
                .severity(Severity::Warning),
            ApiRuleConfig::new("com.example", UNSTABLE),
        )
    }

    fn fixture() -> (SymbolTable, Vec<Usage>) {
        let mut table = SymbolTable::new();
        let restricted = table.insert(
            Symbol::new("Fresh", "com.example.Fresh", "com.example", SymbolKind::Class)
                .with_annotation(UNSTABLE),
        );
        let plain = table.insert(Symbol::new(
            "Stable",
            "com.example.Stable",
            "com.example",
            SymbolKind::Class,
        ));
        let file = PathBuf::from("app/Main.java");
        let usages = vec![
            Usage::identifier("Fresh", Location::new(file.clone(), 4, 3)).resolved_to(Some(restricted)),
            Usage::identifier("Stable", Location::new(file.clone(), 5, 3)).resolved_to(Some(plain)),
            Usage::identifier("Fresh", Location::new(file, 9, 3))
                .resolved_to(Some(restricted))
                .suppressed(Arc::from(vec!["UnstableApi".to_string()])),
        ];
        (table, usages)
    }

    #[test]
    fn metadata_is_exposed_through_trait() {
        let rule = rule();
        assert_eq!(rule.name(), "unstable-api");
        assert_eq!(rule.code(), "UA100");
        assert_eq!(rule.display_name(), "UnstableApi");
        assert_eq!(rule.default_severity(), Severity::Warning);
        assert_eq!(rule.link(), Some("https://example.com/unstable"));
        assert_eq!(rule.category(), "general");
    }

    #[test]
    fn check_reports_matches_and_honors_suppression() {
        let (table, usages) = fixture();
        let violations = rule().check(&usages, &table);

        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.location.line, 4);
        assert_eq!(v.code, "UA100");
        assert_eq!(v.severity, Severity::Warning);
        assert!(v.message.starts_with("[UnstableApi] "));
        assert_eq!(v.link.as_deref(), Some("https://example.com/unstable"));
        assert!(v.suggestion.is_some());
    }

    #[test]
    fn severity_override() {
        let rule = rule().with_severity(Severity::Error);
        assert_eq!(rule.default_severity(), Severity::Error);
    }
}
