//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const CONFIG_NAME: &str = "unstable-lint.toml";

const DEFAULT_CONFIG: &str = r#"# unstable-lint configuration

# Rule preset: "recommended" or "strict" (no Cache/LoadingCache exemption)
preset = "recommended"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src/main/java"

# Glob patterns to exclude from analysis
exclude = [
    "**/build/**",
    "**/target/**",
    "**/generated/**",
]

# Respect .gitignore files
respect_gitignore = true

# Fail when a source file has syntax errors
fail_on_parse_error = false

# Guava @Beta APIs (UA001)
[rules.beta-api]
enabled = true
# severity = "warning"  # Override default severity
# extra_ignored_types = ["com.google.common.graph.Graph"]
# extra_ignored_packages = ["com.google.common.testing"]

# Additional restricted annotations, one table per variant
# [[restricted]]
# name = "internal-api"
# base_namespace = "com.example"
# annotation = "com.example.annotations.Internal"
# ignored_types = ["com.example.LegacyCache"]
# severity = "warning"
"#;

/// Runs the init command in `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {CONFIG_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure rules");
    println!("  2. Run: unstable-lint check");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use unstable_lint_core::Config;

    #[test]
    fn default_config_parses() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert!(config.is_rule_enabled("beta-api"));
        assert_eq!(config.preset.as_deref(), Some("recommended"));
        assert!(config.analyzer.exclude.contains(&"**/generated/**".to_string()));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        run(tmp.path(), false).unwrap();
        assert!(run(tmp.path(), false).is_err());
        run(tmp.path(), true).unwrap();
        let written = std::fs::read_to_string(tmp.path().join(CONFIG_NAME)).unwrap();
        assert_eq!(written, DEFAULT_CONFIG);
    }
}
