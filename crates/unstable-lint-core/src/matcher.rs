//! Decides whether a single usage reference is reported.

use crate::classifier::is_restricted;
use crate::restriction::ApiRuleConfig;
use crate::symbol::{Symbol, SymbolResolver};
use crate::usage::{Usage, UsageShape};

/// Outcome of evaluating one usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The usage references a restricted API and should be reported.
    Match,
    /// The usage is fine (or deliberately exempt).
    NoMatch,
}

impl Verdict {
    /// Returns true for [`Verdict::Match`].
    #[must_use]
    pub fn is_match(self) -> bool {
        self == Self::Match
    }
}

impl From<bool> for Verdict {
    fn from(matched: bool) -> Self {
        if matched {
            Self::Match
        } else {
            Self::NoMatch
        }
    }
}

/// Evaluates a usage reference against a restricted-API configuration.
///
/// Member selects inside import declarations never match: an import names
/// the API without using it. Identifiers spelled `super` never match:
/// compiler-inserted super-constructor calls cannot be told apart from
/// written ones, and missing an explicit call is preferred over flagging an
/// implicit one.
///
/// Pure and order-independent: the verdict depends only on the usage, the
/// resolver's symbols, and `config`.
#[must_use]
pub fn evaluate<R>(usage: &Usage, resolver: &R, config: &ApiRuleConfig) -> Verdict
where
    R: SymbolResolver + ?Sized,
{
    match &usage.shape {
        UsageShape::MemberSelect { .. } if usage.in_import => Verdict::NoMatch,
        UsageShape::Identifier { name } if name == "super" => Verdict::NoMatch,
        _ => match resolver.resolve(usage) {
            Some(symbol) => matches_symbol(symbol, resolver, config).into(),
            None => Verdict::NoMatch,
        },
    }
}

fn matches_symbol<R>(symbol: &Symbol, resolver: &R, config: &ApiRuleConfig) -> bool
where
    R: SymbolResolver + ?Sized,
{
    is_in_matching_namespace(&symbol.package, config)
        && is_restricted(resolver, Some(symbol), config)
}

/// Returns true if `package` is covered by the rule and not exempt.
#[must_use]
pub fn is_in_matching_namespace(package: &str, config: &ApiRuleConfig) -> bool {
    !config.is_ignored_namespace(package) && config.contains_namespace(package)
}
