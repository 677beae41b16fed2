use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{MetadataBackend, RuleDocument, RuleSource};
use crate::error::Result;

/// Backend that keeps every document in memory
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    documents: Mutex<HashMap<RuleSource, RuleDocument>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a source with a document
    pub fn with_document(self, source: RuleSource, document: RuleDocument) -> Self {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source, document);
        self
    }

    pub fn document(&self, source: &RuleSource) -> Option<RuleDocument> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(source)
            .cloned()
    }
}

impl MetadataBackend for InMemoryBackend {
    fn read(&self, source: &RuleSource) -> Result<Option<RuleDocument>> {
        Ok(self.document(source))
    }

    fn write(&self, source: &RuleSource, document: &RuleDocument) -> Result<()> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source.clone(), document.clone());
        Ok(())
    }

    fn extensions(&self) -> Result<Vec<String>> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = documents
            .keys()
            .filter_map(|source| match source {
                RuleSource::Extension(id) => Some(id.clone()),
                _ => None,
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ExecutionFilter, MappingAction, Scope};

    #[test]
    fn test_round_trip_through_sources() {
        let backend = InMemoryBackend::new()
            .with_document(RuleSource::Extension("b".into()), RuleDocument::new())
            .with_document(RuleSource::Extension("a".into()), RuleDocument::new());

        backend
            .add(
                &RuleSource::Workspace,
                Scope::WorkspaceGlobal,
                ExecutionFilter::new("g", "a"),
                MappingAction::Ignore,
            )
            .unwrap();

        assert_eq!(backend.extensions().unwrap(), vec!["a", "b"]);
        assert_eq!(
            backend
                .list(&RuleSource::Workspace, Scope::WorkspaceGlobal)
                .unwrap()
                .len(),
            1
        );
        assert!(backend.read(&RuleSource::Description("x".into())).unwrap().is_none());
    }
}
