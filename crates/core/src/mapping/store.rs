//! Scoped, precedence-ordered collection of mapping rules
//!
//! The store only ever appends or removes whole rules. Lookups walk the
//! scopes in precedence order and, inside one scope, put goal-specific
//! filters ahead of goal-wildcard filters.

use std::collections::BTreeMap;

use super::{ExecutionFilter, MappingAction, MappingRule, PackagingRule, Scope};
use crate::error::{Error, Result};
use crate::types::ExecutionKey;

/// A rule whose filter could not be evaluated against a key
#[derive(Debug, Clone)]
pub struct SkippedRule {
    pub rule: MappingRule,
    pub reason: String,
}

/// Every rule matching one key, best first
#[derive(Debug, Clone, Default)]
pub struct RuleMatches<'a> {
    pub rules: Vec<&'a MappingRule>,
    pub skipped: Vec<SkippedRule>,
}

#[derive(Debug, Clone, Default)]
pub struct MappingMetadataStore {
    rules: BTreeMap<Scope, Vec<MappingRule>>,
    packagings: BTreeMap<Scope, Vec<PackagingRule>>,
}

impl MappingMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to a scope
    ///
    /// Fails with [`Error::DuplicateRule`] when the scope already holds the
    /// same filter with the same action, so repeated runs stay idempotent.
    pub fn add_rule(&mut self, scope: Scope, mut rule: MappingRule) -> Result<()> {
        if scope == Scope::BuiltinHeuristic {
            return Err(Error::ScopeNotWritable(scope));
        }
        let rules = self.rules.entry(scope).or_default();
        if rules
            .iter()
            .any(|existing| existing.is_same_directive(&rule.filter, &rule.action))
        {
            return Err(Error::DuplicateRule {
                scope,
                filter: rule.filter.to_string(),
            });
        }
        rule.provenance = scope;
        tracing::debug!("Adding rule {} to {} scope", rule, scope);
        rules.push(rule);
        Ok(())
    }

    /// Shorthand for [`add_rule`](Self::add_rule) with a fresh rule
    pub fn add(&mut self, scope: Scope, filter: ExecutionFilter, action: MappingAction) -> Result<()> {
        self.add_rule(scope, MappingRule::new(filter, action, scope))
    }

    /// Remove every rule in `scope` matching the predicate, returning how many went
    pub fn remove_rule<F>(&mut self, scope: Scope, mut predicate: F) -> usize
    where
        F: FnMut(&MappingRule) -> bool,
    {
        let Some(rules) = self.rules.get_mut(&scope) else {
            return 0;
        };
        let before = rules.len();
        rules.retain(|rule| !predicate(rule));
        let removed = before - rules.len();
        if removed > 0 {
            tracing::debug!("Removed {} rule(s) from {} scope", removed, scope);
        }
        removed
    }

    pub fn rules(&self, scope: Scope) -> &[MappingRule] {
        self.rules.get(&scope).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every matching rule with the rules that could not be evaluated
    pub fn matching_rules(&self, key: &ExecutionKey) -> RuleMatches<'_> {
        let mut matches = RuleMatches::default();

        for scope in Scope::EXPLICIT {
            let mut scoped: Vec<&MappingRule> = Vec::new();
            for rule in self.rules(scope) {
                match rule.filter.try_matches(key) {
                    Ok(true) => scoped.push(rule),
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!("Skipping rule {}: {}", rule, e);
                        matches.skipped.push(SkippedRule {
                            rule: rule.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
            // Stable, so insertion order breaks ties
            scoped.sort_by_key(|rule| std::cmp::Reverse(rule.filter.specificity()));
            matches.rules.extend(scoped);
        }

        matches
    }

    /// Matching actions across all scopes, best first
    pub fn rules_for(&self, key: &ExecutionKey) -> Vec<(Scope, MappingAction)> {
        self.matching_rules(key)
            .rules
            .into_iter()
            .map(|rule| (rule.provenance, rule.action.clone()))
            .collect()
    }

    pub fn add_packaging_rule(&mut self, scope: Scope, mut rule: PackagingRule) -> Result<()> {
        if scope == Scope::BuiltinHeuristic {
            return Err(Error::ScopeNotWritable(scope));
        }
        let rules = self.packagings.entry(scope).or_default();
        if rules.iter().any(|existing| {
            existing.packaging == rule.packaging
                && existing.lifecycle_mapping_id == rule.lifecycle_mapping_id
        }) {
            return Err(Error::DuplicateRule {
                scope,
                filter: format!("packaging {}", rule.packaging),
            });
        }
        rule.provenance = scope;
        rules.push(rule);
        Ok(())
    }

    /// Highest-precedence lifecycle mapping for a packaging type
    pub fn lifecycle_for(&self, packaging: &str) -> Option<&PackagingRule> {
        Scope::EXPLICIT.iter().find_map(|scope| {
            self.packagings
                .get(scope)?
                .iter()
                .find(|rule| rule.packaging == packaging)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ExecutionKey {
        ExecutionKey::new("org.plugin", "compile-plugin", "1.0", "compile").with_phase("compile")
    }

    fn filter() -> ExecutionFilter {
        ExecutionFilter::new("org.plugin", "compile-plugin")
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let mut store = MappingMetadataStore::new();
        store
            .add(Scope::WorkspaceGlobal, filter(), MappingAction::Ignore)
            .unwrap();
        let err = store
            .add(Scope::WorkspaceGlobal, filter(), MappingAction::Ignore)
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.rules(Scope::WorkspaceGlobal).len(), 1);

        // Same directive in another scope is a separate rule
        store
            .add(Scope::ProjectLocal, filter(), MappingAction::Ignore)
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_same_filter_different_action_is_kept() {
        let mut store = MappingMetadataStore::new();
        store
            .add(Scope::ProjectLocal, filter(), MappingAction::Ignore)
            .unwrap();
        store
            .add(Scope::ProjectLocal, filter(), MappingAction::execute("jdt"))
            .unwrap();
        assert_eq!(store.rules(Scope::ProjectLocal).len(), 2);
    }

    #[test]
    fn test_builtin_scope_rejects_rules() {
        let mut store = MappingMetadataStore::new();
        let err = store
            .add(Scope::BuiltinHeuristic, filter(), MappingAction::Ignore)
            .unwrap_err();
        assert!(matches!(err, Error::ScopeNotWritable(Scope::BuiltinHeuristic)));
    }

    #[test]
    fn test_rules_for_orders_by_precedence_then_specificity() {
        let mut store = MappingMetadataStore::new();
        store
            .add(Scope::ExtensionDefault, filter(), MappingAction::execute("ext"))
            .unwrap();
        store
            .add(Scope::WorkspaceGlobal, filter(), MappingAction::warn())
            .unwrap();
        store
            .add(
                Scope::WorkspaceGlobal,
                filter().with_goal("compile"),
                MappingAction::Ignore,
            )
            .unwrap();
        store
            .add(Scope::ProjectLocal, filter(), MappingAction::execute("local"))
            .unwrap();

        let rules = store.rules_for(&key());
        assert_eq!(
            rules,
            vec![
                (Scope::ProjectLocal, MappingAction::execute("local")),
                (Scope::WorkspaceGlobal, MappingAction::Ignore),
                (Scope::WorkspaceGlobal, MappingAction::warn()),
                (Scope::ExtensionDefault, MappingAction::execute("ext")),
            ]
        );
    }

    #[test]
    fn test_malformed_rule_is_skipped() {
        let mut store = MappingMetadataStore::new();
        store
            .add(
                Scope::ProjectLocal,
                filter().with_version_range("[1.0"),
                MappingAction::Ignore,
            )
            .unwrap();
        store
            .add(Scope::WorkspaceGlobal, filter(), MappingAction::execute("jdt"))
            .unwrap();

        let key = key();
        let matches = store.matching_rules(&key);
        assert_eq!(matches.rules.len(), 1);
        assert_eq!(matches.rules[0].provenance, Scope::WorkspaceGlobal);
        assert_eq!(matches.skipped.len(), 1);
    }

    #[test]
    fn test_remove_rule() {
        let mut store = MappingMetadataStore::new();
        store
            .add(Scope::ProjectLocal, filter(), MappingAction::Ignore)
            .unwrap();
        store
            .add(Scope::ProjectLocal, filter().with_goal("compile"), MappingAction::Ignore)
            .unwrap();

        let removed = store.remove_rule(Scope::ProjectLocal, |rule| !rule.filter.goals.is_empty());
        assert_eq!(removed, 1);
        assert_eq!(store.rules(Scope::ProjectLocal).len(), 1);
        assert_eq!(store.remove_rule(Scope::WorkspaceGlobal, |_| true), 0);
    }

    #[test]
    fn test_lifecycle_for_packaging() {
        let mut store = MappingMetadataStore::new();
        store
            .add_packaging_rule(Scope::ExtensionDefault, PackagingRule::new("bundle", "osgi"))
            .unwrap();
        store
            .add_packaging_rule(Scope::ProjectLocal, PackagingRule::new("bundle", "custom"))
            .unwrap();

        let rule = store.lifecycle_for("bundle").unwrap();
        assert_eq!(rule.lifecycle_mapping_id, "custom");
        assert_eq!(rule.provenance, Scope::ProjectLocal);
        assert!(store.lifecycle_for("jar").is_none());
    }
}
