//! The workspace-global rule file as a single shared resource
//!
//! Writers go through one lock around the whole load/modify/save cycle.
//! Readers get an immutable snapshot that is reloaded from the backend on
//! every read.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::{ExecutionRuleEntry, MetadataBackend, RuleDocument, RuleSource};
use crate::error::{Error, Result};
use crate::mapping::{ExecutionFilter, MappingAction, MappingRule, Scope};

pub struct WorkspaceMetadata {
    backend: Arc<dyn MetadataBackend>,
    write_lock: Mutex<()>,
    snapshot: RwLock<Arc<RuleDocument>>,
}

impl std::fmt::Debug for WorkspaceMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceMetadata")
            .field("snapshot", &self.current())
            .finish()
    }
}

impl WorkspaceMetadata {
    pub fn new(backend: Arc<dyn MetadataBackend>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
            snapshot: RwLock::new(Arc::new(RuleDocument::default())),
        }
    }

    /// Last loaded snapshot, without touching the backend
    pub fn current(&self) -> Arc<RuleDocument> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, document: RuleDocument) -> Arc<RuleDocument> {
        let document = Arc::new(document);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = document.clone();
        document
    }

    /// Reload the workspace rules, surfacing a failed read
    ///
    /// On error the previous snapshot stays in place.
    pub fn try_snapshot(&self) -> Result<Arc<RuleDocument>> {
        let document = self.backend.read(&RuleSource::Workspace)?;
        Ok(self.replace(document.unwrap_or_default()))
    }

    /// Reload the workspace rules and return them as an immutable snapshot
    ///
    /// A failed reload keeps serving the last good snapshot.
    pub fn snapshot(&self) -> Arc<RuleDocument> {
        match self.try_snapshot() {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Failed to reload workspace metadata, using last snapshot: {}", e);
                self.current()
            }
        }
    }

    /// Workspace rules tagged with the workspace scope
    pub fn rules(&self) -> Vec<MappingRule> {
        self.snapshot().rules(Scope::WorkspaceGlobal)
    }

    /// Append a directive to the workspace file
    pub fn add_rule(&self, filter: ExecutionFilter, action: MappingAction) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut document = self.backend.read(&RuleSource::Workspace)?.unwrap_or_default();
        document.add_rule(Scope::WorkspaceGlobal, filter, action)?;
        self.backend
            .write(&RuleSource::Workspace, &document)
            .map_err(|e| Error::write_failure(RuleSource::Workspace, e))?;

        self.replace(document);
        Ok(())
    }

    /// Remove matching directives from the workspace file
    pub fn remove_rule<F>(&self, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&ExecutionRuleEntry) -> bool,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(mut document) = self.backend.read(&RuleSource::Workspace)? else {
            return Ok(0);
        };
        let removed = document.remove_rules(&mut predicate);
        if removed > 0 {
            self.backend
                .write(&RuleSource::Workspace, &document)
                .map_err(|e| Error::write_failure(RuleSource::Workspace, e))?;
            self.replace(document);
        }
        Ok(removed)
    }
}
