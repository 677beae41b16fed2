use anyhow::{Context, Result};
use lifemap_core::mapping::HandlerDescriptor;
use lifemap_core::{
    BuildModelReader, HandlerRegistry, JsonModelReader, LoadedMetadata, MetadataBackend,
    MetadataLoader, ProjectMappingConfiguration, ProjectModel, ProjectRef, ResolutionWriter,
    Settings, WorkspaceMetadata,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs to work on one project
pub struct ProjectContext {
    pub settings: Settings,
    pub backend: Arc<dyn MetadataBackend>,
    pub workspace: Arc<WorkspaceMetadata>,
    pub model: ProjectModel,
    pub loaded: LoadedMetadata,
    pub registry: HandlerRegistry,
}

impl ProjectContext {
    pub fn open(model_path: &Path, handlers: &[String]) -> Result<Self> {
        let model_path = std::path::absolute(model_path)
            .with_context(|| format!("Invalid model path {}", model_path.display()))?;
        let model_dir = model_path.parent().unwrap_or(Path::new("/"));

        let settings = Settings::load(model_dir).context("Failed to load lifemap.json")?;
        debug!("Workspace metadata at {:?}", settings.workspace_metadata_path());

        let model = JsonModelReader
            .read(&model_path)
            .with_context(|| format!("Failed to read project model {}", model_path.display()))?;
        let model = rebase(model, model_dir);

        let backend: Arc<dyn MetadataBackend> = Arc::new(settings.backend());
        let workspace = Arc::new(WorkspaceMetadata::new(backend.clone()));
        let loaded = MetadataLoader::new(backend.clone())
            .with_workspace(workspace.clone())
            .load_for(&model);

        let registry = handlers
            .iter()
            .fold(HandlerRegistry::new(), |registry, id| {
                registry.with_handler(HandlerDescriptor::new(id.as_str()))
            });

        Ok(Self {
            settings,
            backend,
            workspace,
            model,
            loaded,
            registry,
        })
    }

    pub fn configuration(&self) -> ProjectMappingConfiguration {
        ProjectMappingConfiguration::build(
            &self.model,
            &self.loaded.store,
            &self.registry,
            &self.settings.evaluator(),
        )
    }

    pub fn writer(&self) -> ResolutionWriter {
        ResolutionWriter::new(self.backend.clone(), self.workspace.clone())
    }
}

/// Make build description paths relative to the model file absolute
fn rebase(mut model: ProjectModel, dir: &Path) -> ProjectModel {
    let fix = |project: &mut ProjectRef| {
        if project.description.is_relative() {
            project.description = dir.join(&project.description);
        }
    };
    fix(&mut model.project);
    model.parents.iter_mut().for_each(fix);
    for execution in &mut model.executions {
        execution.declared_in.iter_mut().for_each(fix);
    }
    model
}
