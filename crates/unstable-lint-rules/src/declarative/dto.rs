//! TOML deserialization types for `[[restricted]]` tables.
//!
//! Converted to rules by the loader; nothing else reads these.

use serde::Deserialize;
use unstable_lint_core::Severity;

/// The declarative part of a config file.
///
/// Sits next to `[analyzer]` and `[rules.*]` in the same document; serde
/// ignores the sections it does not name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarativeConfigDto {
    /// Restricted-annotation rule variants.
    #[serde(rename = "restricted", default)]
    pub restricted: Vec<RestrictedDto>,
}

/// One `[[restricted]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RestrictedDto {
    /// Rule name (e.g., "internal-api").
    pub name: String,
    /// Rule code (default: assigned from `UA100` upwards).
    #[serde(default)]
    pub code: Option<String>,
    /// Root namespace of the covered APIs.
    pub base_namespace: String,
    /// Fully qualified restricted annotation.
    pub annotation: String,
    /// Namespaces exempt from the rule.
    #[serde(default)]
    pub ignored_packages: Vec<String>,
    /// Fully qualified types exempt from the rule.
    #[serde(default)]
    pub ignored_types: Vec<String>,
    /// Severity (default: error).
    #[serde(default)]
    pub severity: Option<Severity>,
    /// One-line message.
    #[serde(default)]
    pub summary: Option<String>,
    /// Longer help text.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Documentation link.
    #[serde(default)]
    pub link: Option<String>,
    /// Category tag (default: "custom").
    #[serde(default)]
    pub category: Option<String>,
    /// Checker name for messages and `@SuppressWarnings`.
    #[serde(default)]
    pub display_name: Option<String>,
}
