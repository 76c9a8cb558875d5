//! Restricted-annotation rules declared in TOML.
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! dto types
//!   ↓ validate + convert
//! Vec<AnnotatedApiRule>
//! ```

pub mod dto;
pub mod loader;

pub use loader::DeclarativeError;

use unstable_lint_core::{AnnotatedApiRule, RuleBox};

/// Errors from parsing TOML and loading declarative rules.
#[derive(Debug, thiserror::Error)]
pub enum LoadRulesError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A declaration is invalid.
    #[error("{0}")]
    Invalid(#[from] DeclarativeError),

    /// `preset` names no known preset.
    #[error("unknown preset `{0}` (expected `recommended` or `strict`)")]
    UnknownPreset(String),
}

/// Parses TOML content and returns the declared rule variants.
///
/// Returns `Ok(vec![])` when the document has no `[[restricted]]` tables.
///
/// # Errors
///
/// Returns an error if TOML parsing or validation fails.
pub fn load_restricted(content: &str) -> Result<Vec<AnnotatedApiRule>, LoadRulesError> {
    let dto: dto::DeclarativeConfigDto = toml::from_str(content)?;
    Ok(loader::load(dto)?)
}

/// Like [`load_restricted`], boxed for the analyzer.
///
/// # Errors
///
/// Returns an error if TOML parsing or validation fails.
pub fn load_rules_from_toml(content: &str) -> Result<Vec<RuleBox>, LoadRulesError> {
    let rules = load_restricted(content)?;
    tracing::debug!(count = rules.len(), "Loaded declarative rules");
    Ok(rules
        .into_iter()
        .map(|rule| Box::new(rule) as RuleBox)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use unstable_lint_core::{Severity, UsageRule};

    #[test]
    fn empty_document_yields_no_rules() {
        let rules = load_rules_from_toml("").expect("empty is valid");
        assert!(rules.is_empty());
    }

    #[test]
    fn loads_alongside_other_sections() {
        let content = r#"
[analyzer]
root = "src"

[rules.beta-api]
enabled = true

[[restricted]]
name = "internal-api"
code = "UA200"
display_name = "InternalApi"
base_namespace = "com.example"
annotation = "com.example.annotations.Internal"
ignored_packages = ["com.example.testing"]
ignored_types = ["com.example.LegacyCache"]
severity = "warning"
summary = "Internal APIs are not for public use"
link = "https://example.com/internal"
"#;
        let rules = load_restricted(content).expect("valid");
        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.name(), "internal-api");
        assert_eq!(rule.code(), "UA200");
        assert_eq!(rule.display_name(), "InternalApi");
        assert_eq!(rule.default_severity(), Severity::Warning);
        assert_eq!(rule.description(), "Internal APIs are not for public use");
        assert!(rule.config().is_ignored_namespace("com.example.testing"));
        assert!(rule.config().is_ignored_type("com.example.LegacyCache"));
        assert_eq!(
            rule.config().restricted_annotation(),
            "com.example.annotations.Internal"
        );
    }

    #[test]
    fn missing_required_field_is_a_toml_error() {
        let content = r#"
[[restricted]]
name = "internal-api"
annotation = "com.example.Internal"
"#;
        assert!(matches!(
            load_rules_from_toml(content),
            Err(LoadRulesError::Toml(_))
        ));
    }

    #[test]
    fn unknown_severity_is_a_toml_error() {
        let content = r#"
[[restricted]]
name = "internal-api"
base_namespace = "com.example"
annotation = "com.example.Internal"
severity = "fatal"
"#;
        assert!(matches!(
            load_rules_from_toml(content),
            Err(LoadRulesError::Toml(_))
        ));
    }
}
