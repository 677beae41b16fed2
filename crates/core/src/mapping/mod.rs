//! Mapping rules and the scoped store that holds them

pub mod action;
pub mod filter;
pub mod registry;
pub mod rule;
pub mod scope;
pub mod store;

pub use action::MappingAction;
pub use filter::{ExecutionFilter, matches};
pub use registry::{ExecutionHandler, HandlerDescriptor, HandlerRegistry};
pub use rule::{MappingRule, PackagingRule};
pub use scope::Scope;
pub use store::{MappingMetadataStore, RuleMatches, SkippedRule};
