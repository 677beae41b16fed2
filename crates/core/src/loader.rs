//! Builds the metadata store seen by one project
//!
//! Rules are gathered from the project's own description, its ancestors
//! (nearest first), the workspace file and every installed extension.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::evaluator::Diagnostic;
use crate::mapping::{MappingMetadataStore, Scope};
use crate::persistence::{MetadataBackend, RuleDocument, RuleSource, WorkspaceMetadata};
use crate::types::{BuildModelReader, ProjectModel};

/// Store for one project plus the problems met while reading it
#[derive(Debug, Default)]
pub struct LoadedMetadata {
    pub store: MappingMetadataStore,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct MetadataLoader {
    backend: Arc<dyn MetadataBackend>,
    workspace: Arc<WorkspaceMetadata>,
}

impl MetadataLoader {
    pub fn new(backend: Arc<dyn MetadataBackend>) -> Self {
        let workspace = Arc::new(WorkspaceMetadata::new(backend.clone()));
        Self { backend, workspace }
    }

    /// Share an existing workspace resource instead of creating one
    pub fn with_workspace(mut self, workspace: Arc<WorkspaceMetadata>) -> Self {
        self.workspace = workspace;
        self
    }

    pub fn workspace(&self) -> &Arc<WorkspaceMetadata> {
        &self.workspace
    }

    /// Load every scope visible from `model`
    ///
    /// Unreadable sources are reported as diagnostics and skipped.
    pub fn load_for(&self, model: &ProjectModel) -> LoadedMetadata {
        let mut loaded = LoadedMetadata::default();
        tracing::debug!("Loading lifecycle mappings for {}", model.project);

        let own = &model.project.description;
        self.load_source(&mut loaded, Scope::ProjectLocal, &RuleSource::Description(own.clone()));

        for parent in &model.parents {
            if parent.description == *own {
                tracing::debug!("Parent {} shares the project description, skipping", parent);
                continue;
            }
            self.load_source(
                &mut loaded,
                Scope::InheritedParent,
                &RuleSource::Description(parent.description.clone()),
            );
        }

        let workspace = match self.workspace.try_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Could not read workspace metadata, using last snapshot: {}", e);
                loaded.diagnostics.push(Diagnostic::UnreadableSource {
                    source: RuleSource::Workspace.to_string(),
                    reason: e.to_string(),
                });
                self.workspace.current()
            }
        };
        Self::merge(&mut loaded, Scope::WorkspaceGlobal, &workspace);

        match self.backend.extensions() {
            Ok(extensions) => {
                for id in extensions {
                    self.load_source(&mut loaded, Scope::ExtensionDefault, &RuleSource::Extension(id));
                }
            }
            Err(e) => {
                tracing::warn!("Failed to list extensions: {}", e);
                loaded.diagnostics.push(Diagnostic::UnreadableSource {
                    source: "extensions".to_string(),
                    reason: e.to_string(),
                });
            }
        }

        tracing::debug!(
            "Loaded {} rule(s) for {} ({} diagnostic(s))",
            loaded.store.len(),
            model.project,
            loaded.diagnostics.len()
        );
        loaded
    }

    fn load_source(&self, loaded: &mut LoadedMetadata, scope: Scope, source: &RuleSource) {
        match self.backend.read(source) {
            Ok(Some(document)) => Self::merge(loaded, scope, &document),
            Ok(None) => tracing::debug!("No rules in {}", source),
            Err(e) => {
                tracing::warn!("Could not read {}: {}", source, e);
                loaded.diagnostics.push(Diagnostic::UnreadableSource {
                    source: source.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    fn merge(loaded: &mut LoadedMetadata, scope: Scope, document: &RuleDocument) {
        for entry in &document.plugin_executions {
            if let Err(e) = loaded
                .store
                .add(scope, entry.filter.clone(), entry.action.clone())
            {
                tracing::debug!("Skipping {} rule: {}", scope, e);
            }
        }
        for packaging in &document.packagings {
            if let Err(e) = loaded.store.add_packaging_rule(scope, packaging.clone()) {
                tracing::debug!("Skipping {} packaging rule: {}", scope, e);
            }
        }
    }
}

impl std::fmt::Debug for MetadataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataLoader")
            .field("workspace", &self.workspace)
            .finish()
    }
}

/// Load a project model from disk and its visible rules in one go
pub fn load_project(
    reader: &dyn BuildModelReader,
    loader: &MetadataLoader,
    path: &Path,
) -> Result<(ProjectModel, LoadedMetadata)> {
    let model = reader.read(path)?;
    let loaded = loader.load_for(&model);
    Ok((model, loaded))
}
