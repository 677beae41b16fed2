//! Persistence backends for mapping rules
//!
//! The engine never cares about the on-disk format. It reads and writes
//! whole [`RuleDocument`]s per [`RuleSource`] and builds list/add/remove on
//! top of that.

pub mod document;
pub mod json;
pub mod memory;
pub mod workspace;

use std::fmt;
use std::path::PathBuf;

pub use document::{ExecutionRuleEntry, RuleDocument};
pub use json::JsonFileBackend;
pub use memory::InMemoryBackend;
pub use workspace::WorkspaceMetadata;

use crate::error::Result;
use crate::mapping::{ExecutionFilter, MappingAction, MappingRule, Scope};

/// Where a set of rules is persisted
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleSource {
    /// A build description (the project's own or an ancestor's)
    Description(PathBuf),
    /// The shared workspace metadata file
    Workspace,
    /// Defaults shipped with an installed extension
    Extension(String),
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::Description(path) => write!(f, "{}", path.display()),
            RuleSource::Workspace => f.write_str("workspace metadata"),
            RuleSource::Extension(id) => write!(f, "extension {id}"),
        }
    }
}

/// Reads and writes rule documents
pub trait MetadataBackend: Send + Sync {
    /// Load the document for a source; `None` when the source holds no rules yet
    fn read(&self, source: &RuleSource) -> Result<Option<RuleDocument>>;

    /// Replace the document stored for a source
    fn write(&self, source: &RuleSource, document: &RuleDocument) -> Result<()>;

    /// Ids of every installed extension carrying default rules
    fn extensions(&self) -> Result<Vec<String>>;

    /// All rules held by a source, tagged with `scope`
    fn list(&self, source: &RuleSource, scope: Scope) -> Result<Vec<MappingRule>> {
        Ok(self
            .read(source)?
            .map(|document| document.rules(scope))
            .unwrap_or_default())
    }

    /// Append a directive to a source; duplicates fail with `DuplicateRule`
    ///
    /// Callers that share a source must serialize calls themselves.
    fn add(&self, source: &RuleSource, scope: Scope, filter: ExecutionFilter, action: MappingAction) -> Result<()> {
        let mut document = self.read(source)?.unwrap_or_default();
        document.add_rule(scope, filter, action)?;
        self.write(source, &document)
    }

    /// Remove matching directives from a source, returning how many went
    fn remove(&self, source: &RuleSource, predicate: &mut dyn FnMut(&ExecutionRuleEntry) -> bool) -> Result<usize> {
        let Some(mut document) = self.read(source)? else {
            return Ok(0);
        };
        let removed = document.remove_rules(predicate);
        if removed > 0 {
            self.write(source, &document)?;
        }
        Ok(removed)
    }
}
