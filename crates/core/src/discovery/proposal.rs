use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::LifecycleMappingRequirement;

/// An installable remedy offered by a discovery oracle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryProposal {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Requirements this remedy claims to satisfy
    #[serde(default)]
    pub satisfies: BTreeSet<LifecycleMappingRequirement>,
}

impl DiscoveryProposal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            license: None,
            satisfies: BTreeSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn satisfying(mut self, requirement: LifecycleMappingRequirement) -> Self {
        self.satisfies.insert(requirement);
        self
    }

    pub fn claims(&self, requirement: &LifecycleMappingRequirement) -> bool {
        self.satisfies.contains(requirement)
    }

    /// Whether two different remedies claim a common requirement
    pub fn overlaps(&self, other: &DiscoveryProposal) -> bool {
        self.id != other.id && !self.satisfies.is_disjoint(&other.satisfies)
    }
}

impl fmt::Display for DiscoveryProposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            f.write_str(&self.id)
        } else {
            write!(f, "{} ({})", self.id, self.description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExecutionKey;

    fn requirement(artifact: &str) -> LifecycleMappingRequirement {
        LifecycleMappingRequirement::execution(ExecutionKey::new("g", artifact, "1", "run"), "jar")
    }

    #[test]
    fn test_overlap_needs_a_shared_requirement_and_a_different_id() {
        let a = DiscoveryProposal::new("a").satisfying(requirement("x"));
        let b = DiscoveryProposal::new("b")
            .satisfying(requirement("x"))
            .satisfying(requirement("y"));
        let c = DiscoveryProposal::new("c").satisfying(requirement("y"));

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&a.clone()));
        assert!(b.claims(&requirement("y")));
        assert!(!a.claims(&requirement("y")));
    }
}
