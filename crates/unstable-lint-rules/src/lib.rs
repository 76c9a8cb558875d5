//! # unstable-lint-rules
//!
//! Rules for unstable-lint.
//!
//! ## Available Rules
//!
//! | Code  | Name       | Description                                   |
//! |-------|------------|-----------------------------------------------|
//! | UA001 | beta-api   | Forbids Guava `@Beta` APIs in library code    |
//! | UA1xx | (declared) | `[[restricted]]` tables from the config file  |
//!
//! `preset = "strict"` drops the `Cache`/`LoadingCache` exemption from
//! `beta-api`.
//!
//! ## Usage
//!
//! ```ignore
//! use unstable_lint_rules::{beta_api, load_rules_from_toml};
//!
//! let mut rules = vec![Box::new(beta_api()) as unstable_lint_core::RuleBox];
//! rules.extend(load_rules_from_toml(&config_text)?);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod beta_api;
pub mod declarative;
pub mod presets;

pub use beta_api::{beta_api, beta_api_strict, beta_api_with};
pub use declarative::{load_restricted, load_rules_from_toml, DeclarativeError, LoadRulesError};
pub use presets::{preset_for_config, rules_for_config, Preset};
