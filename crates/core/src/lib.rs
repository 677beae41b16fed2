//! lifemap - Lifecycle mapping resolution and discovery engine
//!
//! This crate provides functionality to:
//! - Match plugin executions against scoped filter→action rules
//! - Resolve one effective action per execution, with a phase heuristic fallback
//! - Collect unresolved requirements and drive discovery of remedies
//! - Write ignore decisions back into the right configuration scope
pub mod discovery;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod mapping;
pub mod persistence;
pub mod settings;
pub mod types;
pub mod version;
pub mod writer;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

pub use discovery::{
    CatalogOracle, DiscoveryOracle, DiscoveryProposal, DiscoveryReport, DiscoveryRequest,
    DiscoveryState, LifecycleMappingRequirement,
};
pub use evaluator::{Diagnostic, Evaluation, Evaluator, ProjectMappingConfiguration, Resolution};
pub use loader::{LoadedMetadata, MetadataLoader};
pub use mapping::{
    ExecutionFilter, HandlerRegistry, MappingAction, MappingMetadataStore, MappingRule, Scope,
};
pub use persistence::{
    InMemoryBackend, JsonFileBackend, MetadataBackend, RuleDocument, RuleSource,
    WorkspaceMetadata,
};
pub use settings::Settings;
pub use writer::{Installer, ResolutionWriter};

// Cancellation handle accepted by `DiscoveryRequest::discover`
pub use tokio_util::sync::CancellationToken;
