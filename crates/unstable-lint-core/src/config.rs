//! Configuration types for unstable-lint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for unstable-lint.
///
/// Declarative rule variants (`[[restricted]]` tables) live in the same file
/// but are loaded by `unstable-lint-rules`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rule preset (`recommended` or `strict`; default: recommended).
    #[serde(default)]
    pub preset: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleSettings>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a value is out of range.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.preset.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation("preset must not be empty".to_string()));
        }
        if self.analyzer.exclude.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "analyzer.exclude contains an empty pattern".to_string(),
            ));
        }
        for (name, settings) in &self.rules {
            for (key, value) in &settings.options {
                let is_str_array = value
                    .as_array()
                    .is_some_and(|items| items.iter().all(toml::Value::is_str));
                if key.starts_with("extra_ignored_") && !is_str_array {
                    return Err(ConfigError::Validation(format!(
                        "rules.{name}.{key} must be an array of strings"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<crate::Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Fail the run when a source file contains syntax errors.
    #[serde(default)]
    pub fail_on_parse_error: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_exclude(),
            respect_gitignore: true,
            fail_on_parse_error: false,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_exclude() -> Vec<String> {
    vec!["**/build/**".to_string(), "**/target/**".to_string()]
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSettings {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<crate::Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleSettings {
    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Config is structurally invalid.
    #[error("Invalid config: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(!config.analyzer.fail_on_parse_error);
        assert!(config.rules.is_empty());
        assert!(config.preset.is_none());
        assert!(config.is_rule_enabled("beta-api"));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "strict"

[analyzer]
root = "./src/main/java"
exclude = ["**/generated/**"]

[rules.beta-api]
enabled = true
severity = "warning"
extra_ignored_types = ["com.google.common.collect.Foo"]

[rules.internal-api]
enabled = false

[[restricted]]
name = "internal-api"
base_namespace = "com.example"
annotation = "com.example.Internal"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.preset.as_deref(), Some("strict"));
        assert_eq!(config.analyzer.root, PathBuf::from("./src/main/java"));
        assert_eq!(config.analyzer.exclude, vec!["**/generated/**"]);
        assert!(config.is_rule_enabled("beta-api"));
        assert!(!config.is_rule_enabled("internal-api"));
        assert_eq!(config.rule_severity("beta-api"), Some(Severity::Warning));
        assert_eq!(config.rule_severity("internal-api"), None);

        let beta = config.rules.get("beta-api").expect("beta-api settings");
        assert_eq!(
            beta.get_str_array("extra_ignored_types"),
            vec!["com.google.common.collect.Foo"]
        );
    }

    #[test]
    fn test_validation_errors() {
        let err = Config::parse("preset = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = Config::parse("[analyzer]\nexclude = [\"\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = Config::parse("[rules.beta-api]\nextra_ignored_types = \"a.B\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = Config::parse("[analyzer\nroot = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
