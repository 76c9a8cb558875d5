//! List rules command implementation.

use anyhow::{Context, Result};
use unstable_lint_core::RuleBox;
use unstable_lint_rules::{preset_for_config, rules_for_config, Preset};

use crate::config_resolver::LoadedConfig;

/// Runs the list-rules command.
pub fn run(loaded: &LoadedConfig) -> Result<()> {
    let preset = preset_for_config(&loaded.config).context("Invalid rule configuration")?;
    let rules = rules_for_config(&loaded.config, &loaded.content)
        .context("Invalid rule configuration")?;

    if let Some(path) = loaded.source.path() {
        println!("Config: {}\n", path.display());
    }

    println!("Available rules:\n");
    print!("{}", table(&rules));

    println!("\nPresets:");
    print!("{}", presets(preset));

    println!("\nDeclare more variants with [[restricted]] tables in unstable-lint.toml.");
    println!("Use --rules to filter specific rules, e.g.:");
    println!("  unstable-lint check --rules beta-api");
    println!("  unstable-lint check --rules UA001,UA100");

    Ok(())
}

fn table(rules: &[RuleBox]) -> String {
    let mut out = format!("{:<10} {:<25} Description\n", "Code", "Name");
    out.push_str(&"-".repeat(80));
    out.push('\n');
    for rule in rules {
        out.push_str(&format!(
            "{:<10} {:<25} {}\n",
            rule.code(),
            rule.name(),
            rule.description()
        ));
    }
    out
}

fn presets(active: Preset) -> String {
    Preset::ALL
        .into_iter()
        .map(|preset| {
            let marker = if preset == active { " (active)" } else { "" };
            format!("  {:<12} - {}{marker}\n", preset.name(), preset.description())
        })
        .collect()
}
