//! Shared output formatting for lint results.

use anyhow::Result;
use miette::{NamedSource, Report};
use unstable_lint_core::{LintResult, Severity, ViolationDiagnostic};

use crate::OutputFormat;

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Fancy => print_fancy(result),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        println!("  {}: {}", severity_indicator, violation.message);
        if let Some(suggestion) = &violation.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        if let Some(link) = &violation.link {
            println!("  = see: {link}");
        }
        println!();
    }

    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let counts = result.counts();
    let summary_color = if counts.errors > 0 {
        "\x1b[31m"
    } else if counts.warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, counts.errors, counts.warnings, counts.infos, result.files_checked
    );
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

/// Renders each violation against its source file. Falls back to the
/// compact line when the file can no longer be read.
fn print_fancy(result: &LintResult) {
    for violation in &result.violations {
        let file = &violation.location.file;
        match std::fs::read_to_string(file) {
            Ok(source) => {
                let report = Report::new(ViolationDiagnostic::from(violation))
                    .with_source_code(NamedSource::new(file.display().to_string(), source));
                println!("{report:?}");
            }
            Err(e) => {
                tracing::debug!("Cannot read {} for rendering: {e}", file.display());
                println!("{violation}");
            }
        }
    }

    print_summary(result);
}
