//! # unstable-lint-java
//!
//! Java front end for unstable-lint, built on `tree-sitter-java`.
//!
//! Sources are analyzed as one program in three passes:
//!
//! 1. declarations are indexed into a [`SymbolTable`](unstable_lint_core::SymbolTable)
//!    with their owner chain (member, type, outer type, package, parent package),
//! 2. supertypes, member value types and annotation names are resolved,
//! 3. every identifier and member select in a unit becomes a
//!    [`Usage`](unstable_lint_core::Usage) carrying its resolved target.
//!
//! ## Example
//!
//! ```ignore
//! use unstable_lint_java::Analyzer;
//! use unstable_lint_rules::beta_api;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src/main/java")
//!     .rule(beta_api())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for v in &result.violations {
//!     println!("{v}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod error;
mod index;
mod link;
mod program;
mod syntax;
mod usages;

pub use analyzer::{Analyzer, AnalyzerBuilder};
pub use error::AnalyzerError;
pub use program::Program;
