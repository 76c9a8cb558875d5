//! Violations and the result of a run.

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How seriously a rule's findings are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Reported, never fails the run.
    Info,
    /// Reported, never fails the run.
    Warning,
    /// Fails the run.
    Error,
}

impl Severity {
    /// Lowercase name, as written in config files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a usage was found. Ordering is by file, then line, then column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Source file, as passed to the analyzer.
    pub file: PathBuf,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    /// Byte offset of the referencing identifier.
    pub offset: usize,
    /// Byte length of the referencing identifier.
    pub length: usize,
}

impl Location {
    /// A location without a byte span.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte span used when rendering against the source.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// Advice attached to a violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Text shown after `= help:`.
    pub message: String,
}

impl Suggestion {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One reference to a restricted API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code, e.g. `UA001`.
    pub code: String,
    /// Rule name, e.g. `beta-api`.
    pub rule: String,
    pub severity: Severity,
    pub location: Location,
    pub message: String,
    pub suggestion: Option<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Violation {
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
            suggestion: None,
            link: None,
        }
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

/// `file:line:column: severity [code] message`, one line.
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )
    }
}

/// A [`Violation`] as a miette diagnostic, labelled at the offending identifier.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{rule}")]
    span: SourceSpan,
    rule: String,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: v
                .suggestion
                .as_ref()
                .map(|s| s.message.clone())
                .or_else(|| v.link.as_ref().map(|l| format!("see {l}"))),
            span: SourceSpan::from((v.location.offset, v.location.length)),
            rule: v.rule.clone(),
        }
    }
}

/// Violation totals per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

/// Outcome of analyzing a set of sources.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    pub violations: Vec<Violation>,
    /// Sources parsed, including ones with no findings.
    pub files_checked: usize,
    /// Resolved references handed to the rules.
    #[serde(default)]
    pub usages_checked: usize,
}

impl LintResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if any violation is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == Severity::Error)
    }

    #[must_use]
    pub fn counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for v in &self.violations {
            match v.severity {
                Severity::Error => counts.errors += 1,
                Severity::Warning => counts.warnings += 1,
                Severity::Info => counts.infos += 1,
            }
        }
        counts
    }

    /// Sorted lines of the violations in `file`, repeated once per
    /// violation on the same line.
    #[must_use]
    pub fn lines_in(&self, file: &Path) -> Vec<usize> {
        let mut lines: Vec<usize> = self
            .violations
            .iter()
            .filter(|v| v.location.file == file)
            .map(|v| v.location.line)
            .collect();
        lines.sort_unstable();
        lines
    }

    /// Orders violations by location.
    pub fn sort(&mut self) {
        self.violations.sort_by(|a, b| a.location.cmp(&b.location));
    }
}
