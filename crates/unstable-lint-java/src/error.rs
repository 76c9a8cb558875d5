//! Analyzer errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading a source file.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A source file has syntax errors (only with `fail_on_parse_error`).
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// The Java grammar could not be loaded into the parser.
    #[error("Failed to load Java grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// A unit nests deeper than usage extraction follows.
    #[error("{path}:{line}: syntax nests deeper than {limit} levels")]
    NestingTooDeep {
        /// File containing the nesting.
        path: PathBuf,
        /// Line where the limit was reached.
        line: usize,
        /// The nesting limit.
        limit: usize,
    },

    /// Directory traversal error.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] unstable_lint_core::ConfigError),
}
