//! Decides whether a symbol counts as restricted.

use crate::restriction::ApiRuleConfig;
use crate::symbol::{Symbol, SymbolResolver};

/// Upper bound on owner-chain steps.
///
/// Real chains end at a package after a handful of steps; the bound only
/// stops a malformed table with an owner cycle.
pub const MAX_OWNER_DEPTH: usize = 256;

/// Returns true if `symbol` is annotated with the restricted annotation, or
/// is a member/nested declaration whose owner chain is.
///
/// At each step of the walk:
///
/// 1. an ignored type short-circuits to `false` before annotations are read,
/// 2. a direct match on the restricted annotation returns `true`,
/// 3. kinds that inherit from their owner continue with the owner; any other
///    kind (type parameter, local variable, package) returns `false`.
///
/// A missing owner or an exhausted depth bound also returns `false`.
#[must_use]
pub fn is_restricted<R>(resolver: &R, symbol: Option<&Symbol>, config: &ApiRuleConfig) -> bool
where
    R: SymbolResolver + ?Sized,
{
    let mut current = symbol;

    for _ in 0..MAX_OWNER_DEPTH {
        let Some(symbol) = current else {
            return false;
        };

        if !symbol.qualified_name.is_empty() && config.is_ignored_type(&symbol.qualified_name) {
            return false;
        }

        if symbol.has_annotation(config.restricted_annotation()) {
            return true;
        }

        if !symbol.kind.inherits_from_owner() {
            return false;
        }

        current = symbol.owner.and_then(|owner| resolver.symbol(owner));
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{Symbol, SymbolId, SymbolKind, SymbolTable};

    const BETA: &str = "com.google.common.annotations.Beta";

    fn config() -> ApiRuleConfig {
        ApiRuleConfig::new("com.google.common", BETA).ignore_type("com.google.common.cache.Cache")
    }

    struct Fixture {
        table: SymbolTable,
        package: SymbolId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut table = SymbolTable::new();
            let package = table.insert(Symbol::new(
                "foo",
                "com.google.common.foo",
                "com.google.common.foo",
                SymbolKind::Package,
            ));
            Self { table, package }
        }

        fn class(&mut self, name: &str, owner: SymbolId, annotated: bool) -> SymbolId {
            let mut sym = Symbol::new(
                name,
                format!("com.google.common.foo.{name}"),
                "com.google.common.foo",
                SymbolKind::Class,
            )
            .with_owner(owner);
            if annotated {
                sym = sym.with_annotation(BETA);
            }
            self.table.insert(sym)
        }

        fn member(&mut self, name: &str, kind: SymbolKind, owner: SymbolId) -> SymbolId {
            self.table.insert(
                Symbol::new(name, name, "com.google.common.foo", kind).with_owner(owner),
            )
        }

        fn check(&self, id: SymbolId) -> bool {
            is_restricted(&self.table, self.table.get(id), &config())
        }
    }

    #[test]
    fn none_is_not_restricted() {
        let table = SymbolTable::new();
        assert!(!is_restricted(&table, None, &config()));
    }

    #[test]
    fn unannotated_ownerless_symbol_is_not_restricted() {
        let mut table = SymbolTable::new();
        let id = table.insert(Symbol::new(
            "Plain",
            "com.google.common.foo.Plain",
            "com.google.common.foo",
            SymbolKind::Class,
        ));
        assert!(!is_restricted(&table, table.get(id), &config()));
    }

    #[test]
    fn directly_annotated_symbol_is_restricted_regardless_of_owner() {
        let mut fx = Fixture::new();
        let plain = fx.class("Plain", fx.package, false);
        let method = fx.table.insert(
            Symbol::new(
                "annotatedStaticMethod",
                "annotatedStaticMethod",
                "com.google.common.foo",
                SymbolKind::Method,
            )
            .with_owner(plain)
            .with_annotation(BETA),
        );
        assert!(fx.check(method));
        assert!(!fx.check(plain));
    }

    #[test]
    fn members_inherit_from_annotated_owner() {
        let mut fx = Fixture::new();
        let annotated = fx.class("AnnotatedClass", fx.package, true);
        for kind in [
            SymbolKind::Field,
            SymbolKind::Method,
            SymbolKind::Constructor,
            SymbolKind::EnumConstant,
        ] {
            let member = fx.member("m", kind, annotated);
            assert!(fx.check(member), "{kind:?} should inherit");
        }
    }

    #[test]
    fn inheritance_is_transitive_through_nested_types() {
        let mut fx = Fixture::new();
        let outer = fx.class("Outer", fx.package, true);
        let inner = fx.class("Inner", outer, false);
        let innermost = fx.class("Innermost", inner, false);
        let field = fx.member("value", SymbolKind::Field, innermost);
        assert!(fx.check(inner));
        assert!(fx.check(innermost));
        assert!(fx.check(field));
    }

    #[test]
    fn type_parameters_and_locals_do_not_inherit() {
        let mut fx = Fixture::new();
        let annotated = fx.class("AnnotatedClass", fx.package, true);
        let type_param = fx.member("T", SymbolKind::TypeParameter, annotated);
        let local = fx.member("x", SymbolKind::LocalVariable, annotated);
        let param = fx.member("p", SymbolKind::Parameter, annotated);
        assert!(!fx.check(type_param));
        assert!(!fx.check(local));
        assert!(!fx.check(param));
    }

    #[test]
    fn annotated_package_propagates_to_its_types() {
        let mut fx = Fixture::new();
        if let Some(pkg) = fx.table.get_mut(fx.package) {
            pkg.annotations.push(BETA.to_string());
        }
        let class = fx.class("InBetaPackage", fx.package, false);
        assert!(fx.check(class));
    }

    #[test]
    fn ignored_type_wins_over_annotation() {
        let mut fx = Fixture::new();
        let cache_pkg = fx.table.insert(Symbol::new(
            "cache",
            "com.google.common.cache",
            "com.google.common.cache",
            SymbolKind::Package,
        ));
        let cache = fx.table.insert(
            Symbol::new(
                "Cache",
                "com.google.common.cache.Cache",
                "com.google.common.cache",
                SymbolKind::Interface,
            )
            .with_owner(cache_pkg)
            .with_annotation(BETA),
        );
        let get = fx.member("get", SymbolKind::Method, cache);
        assert!(!fx.check(cache));
        assert!(!fx.check(get));
    }

    #[test]
    fn ignored_member_name_is_checked_too() {
        let mut fx = Fixture::new();
        let annotated = fx.class("AnnotatedClass", fx.package, true);
        let member = fx.member("skipMe", SymbolKind::Method, annotated);
        let config = config().ignore_type("skipMe");
        assert!(!is_restricted(&fx.table, fx.table.get(member), &config));
    }

    #[test]
    fn owner_cycle_terminates() {
        let mut table = SymbolTable::new();
        let a = table.insert(Symbol::new("A", "x.A", "x", SymbolKind::Class));
        let b = table.insert(Symbol::new("B", "x.B", "x", SymbolKind::Class).with_owner(a));
        if let Some(sym) = table.get_mut(a) {
            sym.owner = Some(b);
        }
        assert!(!is_restricted(&table, table.get(a), &config()));
    }
}
