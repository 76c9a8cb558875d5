//! DTO → rule conversion with validation.

use std::collections::HashSet;

use unstable_lint_core::{AnnotatedApiRule, ApiRuleConfig, RuleMetadata, Severity};

use super::dto::{DeclarativeConfigDto, RestrictedDto};
use crate::beta_api;

/// First code handed out to variants that do not set one.
const FIRST_GENERATED_CODE: usize = 100;

/// Errors in `[[restricted]]` declarations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeclarativeError {
    /// A required field is empty.
    #[error("restricted[{index}].{field} must not be empty")]
    EmptyField {
        /// Position of the table in the file.
        index: usize,
        /// Name of the empty field.
        field: &'static str,
    },

    /// Two variants (or a variant and a built-in rule) share a name.
    #[error("restricted[{index}]: rule name `{name}` is already defined")]
    DuplicateName {
        /// Position of the table in the file.
        index: usize,
        /// The clashing name.
        name: String,
    },

    /// Two variants share a code.
    #[error("restricted[{index}]: rule code `{code}` is already used")]
    DuplicateCode {
        /// Position of the table in the file.
        index: usize,
        /// The clashing code.
        code: String,
    },

    /// The base namespace is not a dotted package name.
    #[error("restricted[{index}].base_namespace `{namespace}` is not a package name")]
    InvalidNamespace {
        /// Position of the table in the file.
        index: usize,
        /// The offending value.
        namespace: String,
    },

    /// The annotation is not a qualified name.
    #[error("restricted[{index}].annotation `{annotation}` must be a fully qualified name")]
    UnqualifiedAnnotation {
        /// Position of the table in the file.
        index: usize,
        /// The offending value.
        annotation: String,
    },
}

/// Converts the DTO into validated rules, in declaration order.
///
/// # Errors
///
/// Returns the first invalid declaration.
pub fn load(dto: DeclarativeConfigDto) -> Result<Vec<AnnotatedApiRule>, DeclarativeError> {
    let mut names: HashSet<String> = HashSet::from([beta_api::NAME.to_string()]);
    let mut codes: HashSet<String> = HashSet::from([beta_api::CODE.to_string()]);
    // Generated codes skip every explicit one, including those declared later.
    let explicit: HashSet<String> = dto
        .restricted
        .iter()
        .filter_map(|entry| entry.code.clone())
        .collect();
    let mut next_code = FIRST_GENERATED_CODE;

    dto.restricted
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            validate(&entry, index)?;

            if !names.insert(entry.name.clone()) {
                return Err(DeclarativeError::DuplicateName {
                    index,
                    name: entry.name,
                });
            }

            let code = match entry.code.clone() {
                Some(code) => code,
                None => loop {
                    let candidate = format!("UA{next_code}");
                    next_code += 1;
                    if !explicit.contains(&candidate) && !codes.contains(&candidate) {
                        break candidate;
                    }
                },
            };
            if !codes.insert(code.clone()) {
                return Err(DeclarativeError::DuplicateCode { index, code });
            }

            Ok(convert(entry, code))
        })
        .collect()
}

fn validate(entry: &RestrictedDto, index: usize) -> Result<(), DeclarativeError> {
    for (field, value) in [
        ("name", &entry.name),
        ("base_namespace", &entry.base_namespace),
        ("annotation", &entry.annotation),
    ] {
        if value.trim().is_empty() {
            return Err(DeclarativeError::EmptyField { index, field });
        }
    }

    if !entry.base_namespace.split('.').all(is_identifier) {
        return Err(DeclarativeError::InvalidNamespace {
            index,
            namespace: entry.base_namespace.clone(),
        });
    }

    let qualified = entry.annotation.contains('.')
        && entry.annotation.split('.').all(|segment| !segment.is_empty());
    if !qualified {
        return Err(DeclarativeError::UnqualifiedAnnotation {
            index,
            annotation: entry.annotation.clone(),
        });
    }

    Ok(())
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn convert(entry: RestrictedDto, code: String) -> AnnotatedApiRule {
    let summary = entry.summary.unwrap_or_else(|| {
        let simple = entry
            .annotation
            .rsplit('.')
            .next()
            .unwrap_or(&entry.annotation);
        format!("@{simple} APIs under {} are subject to change", entry.base_namespace)
    });

    let mut metadata = RuleMetadata::new(&entry.name, code, summary)
        .severity(entry.severity.unwrap_or(Severity::Error))
        .category(entry.category.unwrap_or_else(|| "custom".to_string()));
    if let Some(display_name) = entry.display_name {
        metadata = metadata.display_name(display_name);
    }
    if let Some(explanation) = entry.explanation {
        metadata = metadata.explanation(explanation);
    }
    if let Some(link) = entry.link {
        metadata = metadata.link(link);
    }

    let config = ApiRuleConfig::new(entry.base_namespace, entry.annotation)
        .ignore_namespaces(entry.ignored_packages)
        .ignore_types(entry.ignored_types);

    AnnotatedApiRule::new(metadata, config)
}
