//! Serialized form of one scope's rules

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mapping::{ExecutionFilter, MappingAction, MappingRule, PackagingRule, Scope};

/// One persisted execution directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRuleEntry {
    pub filter: ExecutionFilter,
    pub action: MappingAction,
}

/// The rules persisted by a single source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugin_executions: Vec<ExecutionRuleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packagings: Vec<PackagingRule>,
}

impl RuleDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.plugin_executions.is_empty() && self.packagings.is_empty()
    }

    pub fn contains(&self, filter: &ExecutionFilter, action: &MappingAction) -> bool {
        self.plugin_executions
            .iter()
            .any(|entry| &entry.filter == filter && &entry.action == action)
    }

    /// Append a directive, rejecting an identical one already present
    pub fn add_rule(&mut self, scope: Scope, filter: ExecutionFilter, action: MappingAction) -> Result<()> {
        if self.contains(&filter, &action) {
            return Err(Error::DuplicateRule {
                scope,
                filter: filter.to_string(),
            });
        }
        self.plugin_executions.push(ExecutionRuleEntry { filter, action });
        Ok(())
    }

    /// Remove every directive matching the predicate
    pub fn remove_rules<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&ExecutionRuleEntry) -> bool,
    {
        let before = self.plugin_executions.len();
        self.plugin_executions.retain(|entry| !predicate(entry));
        before - self.plugin_executions.len()
    }

    /// Materialize the directives as rules of the given scope
    pub fn rules(&self, scope: Scope) -> Vec<MappingRule> {
        self.plugin_executions
            .iter()
            .map(|entry| MappingRule::new(entry.filter.clone(), entry.action.clone(), scope))
            .collect()
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
