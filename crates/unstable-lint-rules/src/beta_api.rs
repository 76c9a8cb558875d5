//! Rule to flag usages of Guava `@Beta` APIs.
//!
//! # Rationale
//!
//! `@Beta` APIs are subject to incompatible change or removal. Library code
//! that uses them breaks its own users whenever Guava is upgraded.
//!
//! # Exemptions
//!
//! `Cache` and `LoadingCache` are frozen for users but not for implementers,
//! so usages of them (and their members) are not reported.
//!
//! # Configuration
//!
//! - `extra_ignored_types`: additional fully qualified types to exempt
//! - `extra_ignored_packages`: packages under `com.google.common` to exempt
//!
//! # Suppression
//!
//! - `@SuppressWarnings("BetaApi")` on an enclosing declaration

use unstable_lint_core::{AnnotatedApiRule, ApiRuleConfig, RuleMetadata, RuleSettings, Severity};

/// Rule code for beta-api.
pub const CODE: &str = "UA001";

/// Rule name for beta-api.
pub const NAME: &str = "beta-api";

/// Checker name used in messages and `@SuppressWarnings`.
pub const DISPLAY_NAME: &str = "BetaApi";

/// Root package of the APIs this rule covers.
pub const BASE_PACKAGE: &str = "com.google.common";

/// Fully qualified name of the `@Beta` annotation.
pub const BETA_ANNOTATION: &str = "com.google.common.annotations.Beta";

/// `@Beta` types exempted by default.
pub const IGNORED_TYPES: &[&str] = &[
    "com.google.common.cache.Cache",
    "com.google.common.cache.LoadingCache",
];

const SUMMARY: &str = "@Beta APIs should not be used in library code as they are subject to change";

const EXPLANATION: &str =
    "@Beta APIs should not be used in library code as they are subject to change.";

const LINK: &str = "https://github.com/google/guava/wiki/PhilosophyExplained#beta-apis";

/// Creates the `beta-api` rule with its default exemptions.
#[must_use]
pub fn beta_api() -> AnnotatedApiRule {
    AnnotatedApiRule::new(metadata(), base_config())
}

/// Creates the `beta-api` rule, applying `[rules.beta-api]` options.
#[must_use]
pub fn beta_api_with(settings: &RuleSettings) -> AnnotatedApiRule {
    configured(base_config(), settings)
}

/// Creates `beta-api` without the `Cache`/`LoadingCache` exemption.
#[must_use]
pub fn beta_api_strict(settings: Option<&RuleSettings>) -> AnnotatedApiRule {
    let config = ApiRuleConfig::new(BASE_PACKAGE, BETA_ANNOTATION);
    match settings {
        Some(settings) => configured(config, settings),
        None => AnnotatedApiRule::new(metadata(), config),
    }
}

fn configured(config: ApiRuleConfig, settings: &RuleSettings) -> AnnotatedApiRule {
    let config = config
        .ignore_types(settings.get_str_array("extra_ignored_types"))
        .ignore_namespaces(settings.get_str_array("extra_ignored_packages"));
    let mut rule = AnnotatedApiRule::new(metadata(), config);
    if let Some(severity) = settings.severity {
        rule = rule.with_severity(severity);
    }
    rule
}

fn metadata() -> RuleMetadata {
    RuleMetadata::new(NAME, CODE, SUMMARY)
        .display_name(DISPLAY_NAME)
        .explanation(EXPLANATION)
        .link(LINK)
        .severity(Severity::Error)
        .category("guava")
}

fn base_config() -> ApiRuleConfig {
    ApiRuleConfig::new(BASE_PACKAGE, BETA_ANNOTATION).ignore_types(IGNORED_TYPES.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use unstable_lint_core::{Config, UsageRule};

    #[test]
    fn metadata_matches_guava_checker() {
        let rule = beta_api();
        assert_eq!(rule.name(), "beta-api");
        assert_eq!(rule.code(), "UA001");
        assert_eq!(rule.display_name(), "BetaApi");
        assert_eq!(rule.category(), "guava");
        assert_eq!(rule.default_severity(), Severity::Error);
        assert!(rule.link().is_some_and(|l| l.contains("#beta-apis")));
    }

    #[test]
    fn cache_types_are_ignored() {
        let rule = beta_api();
        assert!(rule.config().is_ignored_type("com.google.common.cache.Cache"));
        assert!(rule
            .config()
            .is_ignored_type("com.google.common.cache.LoadingCache"));
        assert!(!rule
            .config()
            .is_ignored_type("com.google.common.cache.CacheBuilder"));
        assert!(!rule.config().is_ignored_namespace("com.google.common.cache"));
    }

    #[test]
    fn settings_extend_exemptions() {
        let config = Config::parse(
            r#"
[rules.beta-api]
severity = "warning"
extra_ignored_types = ["com.google.common.graph.Graph"]
extra_ignored_packages = ["com.google.common.testing"]
"#,
        )
        .expect("config parses");
        let settings = config.rules.get(NAME).expect("beta-api settings");
        let rule = beta_api_with(settings);

        assert_eq!(rule.default_severity(), Severity::Warning);
        assert!(rule.config().is_ignored_type("com.google.common.graph.Graph"));
        assert!(rule.config().is_ignored_type("com.google.common.cache.Cache"));
        assert!(rule
            .config()
            .is_ignored_namespace("com.google.common.testing"));
    }

    #[test]
    fn strict_variant_keeps_only_configured_exemptions() {
        let rule = beta_api_strict(None);
        assert_eq!(rule.name(), NAME);
        assert!(rule.config().ignored_types().is_empty());

        let config = Config::parse("[rules.beta-api]\nextra_ignored_types = [\"com.google.common.graph.Graph\"]\n")
            .expect("config parses");
        let rule = beta_api_strict(config.rules.get(NAME));
        assert!(rule.config().is_ignored_type("com.google.common.graph.Graph"));
        assert!(!rule.config().is_ignored_type("com.google.common.cache.Cache"));
    }
}
