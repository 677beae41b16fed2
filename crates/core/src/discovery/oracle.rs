//! Boundary to the external catalog of remedies

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

use super::{DiscoveryProposal, LifecycleMappingRequirement};
use crate::error::Result;

pub type ProposalMap = BTreeMap<LifecycleMappingRequirement, Vec<DiscoveryProposal>>;

/// Looks up proposals able to satisfy requirements
///
/// Implementations may be slow (network catalogs); callers race them
/// against cancellation and impose their own deadlines.
#[async_trait]
pub trait DiscoveryOracle: Send + Sync {
    /// Whether one call may carry every requirement at once
    fn supports_batch(&self) -> bool {
        false
    }

    async fn query(&self, requirements: &BTreeSet<LifecycleMappingRequirement>) -> Result<ProposalMap>;
}

/// Oracle backed by a fixed list of proposals
///
/// A proposal is offered for every requirement it claims.
#[derive(Debug, Clone, Default)]
pub struct CatalogOracle {
    proposals: Vec<DiscoveryProposal>,
}

impl CatalogOracle {
    pub fn new(proposals: Vec<DiscoveryProposal>) -> Self {
        Self { proposals }
    }

    /// Parse a JSON array of proposals
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(contents)?))
    }

    pub fn proposals(&self) -> &[DiscoveryProposal] {
        &self.proposals
    }
}

#[async_trait]
impl DiscoveryOracle for CatalogOracle {
    fn supports_batch(&self) -> bool {
        true
    }

    async fn query(&self, requirements: &BTreeSet<LifecycleMappingRequirement>) -> Result<ProposalMap> {
        Ok(requirements
            .iter()
            .map(|requirement| {
                let offered = self
                    .proposals
                    .iter()
                    .filter(|p| p.claims(requirement))
                    .cloned()
                    .collect();
                (requirement.clone(), offered)
            })
            .collect())
    }
}
