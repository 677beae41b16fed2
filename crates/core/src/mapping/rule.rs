use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ExecutionFilter, MappingAction, Scope};

/// A filter → action directive from one configuration scope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingRule {
    pub filter: ExecutionFilter,
    pub action: MappingAction,
    pub provenance: Scope,
}

impl MappingRule {
    pub fn new(filter: ExecutionFilter, action: MappingAction, provenance: Scope) -> Self {
        Self {
            filter,
            action,
            provenance,
        }
    }

    /// Identical filter and action, regardless of provenance
    pub fn is_same_directive(&self, filter: &ExecutionFilter, action: &MappingAction) -> bool {
        &self.filter == filter && &self.action == action
    }
}

impl fmt::Display for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}]", self.filter, self.action, self.provenance)
    }
}

/// Maps a packaging type to the lifecycle mapping that builds it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingRule {
    pub packaging: String,
    pub lifecycle_mapping_id: String,
    #[serde(skip, default = "default_provenance")]
    pub provenance: Scope,
}

fn default_provenance() -> Scope {
    Scope::ExtensionDefault
}

impl PackagingRule {
    pub fn new(packaging: impl Into<String>, lifecycle_mapping_id: impl Into<String>) -> Self {
        Self {
            packaging: packaging.into(),
            lifecycle_mapping_id: lifecycle_mapping_id.into(),
            provenance: default_provenance(),
        }
    }
}
