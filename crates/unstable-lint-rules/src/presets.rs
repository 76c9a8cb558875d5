//! Rule presets and config-driven rule assembly.

use crate::beta_api::{self, beta_api, beta_api_strict, beta_api_with};
use crate::declarative::{load_rules_from_toml, LoadRulesError};
use unstable_lint_core::{Config, RuleBox, RuleSettings};

/// Preset configurations for unstable-lint.
///
/// Selected with `preset = "..."` in the config file or `--preset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preset {
    /// `beta-api` with Guava's own exemptions.
    #[default]
    Recommended,
    /// `beta-api` without the `Cache`/`LoadingCache` exemption.
    Strict,
}

impl Preset {
    /// All presets, in display order.
    pub const ALL: [Self; 2] = [Self::Recommended, Self::Strict];

    /// Looks a preset up by its config name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Config name of this preset.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
        }
    }

    /// One-line description for `list-rules`.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Recommended => "UA001 with the Cache/LoadingCache exemption",
            Self::Strict => "UA001 with no exempt types",
        }
    }

    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        self.rules_with(None)
    }

    /// Returns the rules for this preset with `[rules.beta-api]` applied.
    #[must_use]
    pub fn rules_with(self, settings: Option<&RuleSettings>) -> Vec<RuleBox> {
        let beta = match (self, settings) {
            (Self::Recommended, Some(settings)) => beta_api_with(settings),
            (Self::Recommended, None) => beta_api(),
            (Self::Strict, settings) => beta_api_strict(settings),
        };
        vec![Box::new(beta)]
    }
}

/// Resolves the preset named in `config`, defaulting to recommended.
///
/// # Errors
///
/// Returns an error if the name is not a known preset.
pub fn preset_for_config(config: &Config) -> Result<Preset, LoadRulesError> {
    match config.preset.as_deref() {
        None => Ok(Preset::default()),
        Some(name) => {
            Preset::from_name(name).ok_or_else(|| LoadRulesError::UnknownPreset(name.to_string()))
        }
    }
}

/// Assembles the rules for a parsed config file.
///
/// The preset's built-in rules pick up their `[rules.<name>]` options;
/// `[[restricted]]` tables in `content` are appended. Disabled rules are
/// still returned; the analyzer skips them.
///
/// # Errors
///
/// Returns an error if the preset is unknown or a `[[restricted]]` table is
/// invalid.
pub fn rules_for_config(config: &Config, content: &str) -> Result<Vec<RuleBox>, LoadRulesError> {
    let preset = preset_for_config(config)?;
    let mut rules = preset.rules_with(config.rules.get(beta_api::NAME));
    rules.extend(load_rules_from_toml(content)?);
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unstable_lint_core::{Location, Symbol, SymbolKind, SymbolTable, Usage, Verdict};

    /// A `@Beta` `Cache` type and a usage of it.
    fn cache_usage() -> (SymbolTable, Usage) {
        let mut table = SymbolTable::new();
        let package = "com.google.common.cache";
        let pkg = table.insert(Symbol::new("cache", package, package, SymbolKind::Package));
        let cache = table.insert(
            Symbol::new("Cache", "com.google.common.cache.Cache", package, SymbolKind::Interface)
                .with_owner(pkg)
                .with_annotation(beta_api::BETA_ANNOTATION),
        );
        let usage = Usage::identifier("Cache", Location::new("A.java".into(), 1, 1))
            .resolved_to(Some(cache));
        (table, usage)
    }

    fn verdict(rules: &[RuleBox]) -> Verdict {
        let (table, usage) = cache_usage();
        rules[0].evaluate(&usage, &table)
    }

    #[test]
    fn preset_names_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(Preset::from_name("minimal"), None);
    }

    #[test]
    fn config_selects_the_preset() {
        let config = Config::parse("").expect("config");
        let rules = rules_for_config(&config, "").expect("rules");
        assert_eq!(verdict(&rules), Verdict::NoMatch);

        let content = "preset = \"strict\"\n";
        let config = Config::parse(content).expect("config");
        let rules = rules_for_config(&config, content).expect("rules");
        assert_eq!(rules[0].name(), beta_api::NAME);
        assert_eq!(verdict(&rules), Verdict::Match);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let content = "preset = \"minimal\"\n";
        let config = Config::parse(content).expect("config");
        assert!(matches!(
            rules_for_config(&config, content),
            Err(LoadRulesError::UnknownPreset(name)) if name == "minimal"
        ));
    }

    #[test]
    fn config_rules_include_declared_variants() {
        let content = r#"
[rules.beta-api]
extra_ignored_types = ["com.google.common.graph.Graph"]

[[restricted]]
name = "internal-api"
base_namespace = "com.example"
annotation = "com.example.Internal"
"#;
        let config = Config::parse(content).expect("config");
        let rules = rules_for_config(&config, content).expect("rules");
        let names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["beta-api", "internal-api"]);
    }

    #[test]
    fn invalid_declaration_fails_assembly() {
        let content = r#"
[[restricted]]
name = "beta-api"
base_namespace = "com.example"
annotation = "com.example.Internal"
"#;
        let config = Config::parse(content).expect("config");
        assert!(rules_for_config(&config, content).is_err());
    }
}
