//! Discovery of remedies for unresolved executions and packagings

pub mod oracle;
pub mod proposal;
pub mod request;
pub mod requirement;

pub use oracle::{CatalogOracle, DiscoveryOracle, ProposalMap};
pub use proposal::DiscoveryProposal;
pub use request::{DiscoveryReport, DiscoveryRequest, DiscoveryState};
pub use requirement::LifecycleMappingRequirement;
