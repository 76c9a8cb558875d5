//! # unstable-lint-core
//!
//! Core framework for flagging usages of APIs that carry a designated
//! "unstable" annotation.
//!
//! This crate is front-end agnostic. It provides:
//!
//! - [`Symbol`] and [`SymbolTable`] for resolved declarations
//! - [`Usage`] for the identifier and member-select references a front end finds
//! - [`is_restricted`], the annotation classifier that walks owner chains
//! - [`evaluate`], the usage matcher
//! - [`UsageRule`] and [`AnnotatedApiRule`], the rule trait and its generic
//!   restricted-API implementation
//! - [`Violation`] and [`LintResult`] for reporting
//!
//! ## Example
//!
//! ```ignore
//! use unstable_lint_core::{AnnotatedApiRule, ApiRuleConfig, RuleMetadata, UsageRule};
//!
//! let rule = AnnotatedApiRule::new(
//!     RuleMetadata::new("internal-api", "UA100", "Internal APIs are not for public use"),
//!     ApiRuleConfig::new("com.example", "com.example.annotations.Internal"),
//! );
//!
//! let violations = rule.check(&usages, &symbols);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classifier;
mod config;
mod matcher;
mod restriction;
mod rule;
mod symbol;
mod types;
mod usage;

pub use classifier::{is_restricted, MAX_OWNER_DEPTH};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleSettings};
pub use matcher::{evaluate, is_in_matching_namespace, Verdict};
pub use restriction::{ApiRuleConfig, NamePredicate};
pub use rule::{AnnotatedApiRule, RuleBox, RuleMetadata, UsageRule};
pub use symbol::{Symbol, SymbolId, SymbolKind, SymbolResolver, SymbolTable};
pub use types::{
    LintResult, Location, Severity, SeverityCounts, Suggestion, Violation, ViolationDiagnostic,
};
pub use usage::{Usage, UsageShape};
