//! Check command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use unstable_lint_core::RuleBox;
use unstable_lint_java::Analyzer;
use unstable_lint_rules::rules_for_config;

use crate::config_resolver::LoadedConfig;
use crate::OutputFormat;

/// Runs the check command. Returns `true` when error-severity violations
/// were found.
pub fn run(
    path: &Path,
    format: OutputFormat,
    rules_filter: Option<String>,
    exclude: Vec<String>,
    loaded: LoadedConfig,
) -> Result<bool> {
    let rules = rules_for_config(&loaded.config, &loaded.content)
        .context("Invalid rule configuration")?;

    let rules = match rules_filter {
        Some(filter) => {
            let names: Vec<&str> = filter.split(',').map(str::trim).collect();
            filter_rules(rules, &names)
        }
        None => rules,
    };

    let mut builder = Analyzer::builder()
        .root(path)
        .config(loaded.config)
        .excludes(exclude);
    for rule in rules {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, format)?;

    Ok(result.has_errors())
}

/// Keeps the rules named in `names`, matching rule name or code.
fn filter_rules(rules: Vec<RuleBox>, names: &[&str]) -> Vec<RuleBox> {
    for name in names {
        if !rules.iter().any(|r| r.name() == *name || r.code() == *name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    rules
        .into_iter()
        .filter(|r| names.contains(&r.name()) || names.contains(&r.code()))
        .collect()
}
