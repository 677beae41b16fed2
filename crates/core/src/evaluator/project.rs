//! Per-project view of the evaluation and the requirements it leaves open

use std::collections::BTreeSet;

use super::{Evaluation, Evaluator};
use crate::discovery::LifecycleMappingRequirement;
use crate::mapping::{HandlerRegistry, MappingAction, MappingMetadataStore, Scope};
use crate::types::{ExecutionKey, ProjectModel, ProjectRef};

/// Lifecycle mapping chosen for the project's packaging type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagingResolution {
    pub lifecycle_mapping_id: Option<String>,
    pub source: Scope,
}

/// Evaluation of one project plus the requirements derived from it
#[derive(Debug, Clone)]
pub struct ProjectMappingConfiguration {
    pub project: ProjectRef,
    pub packaging: String,
    pub packaging_resolution: PackagingResolution,
    pub evaluation: Evaluation,
    requirements: BTreeSet<LifecycleMappingRequirement>,
}

impl ProjectMappingConfiguration {
    /// Evaluate a project model and collect what could not be resolved
    pub fn build(
        model: &ProjectModel,
        store: &MappingMetadataStore,
        registry: &HandlerRegistry,
        evaluator: &Evaluator,
    ) -> Self {
        let evaluation = evaluator.evaluate(&model.execution_keys(), store);
        let mut requirements = BTreeSet::new();

        let packaging_resolution = match store.lifecycle_for(&model.packaging) {
            Some(rule) => {
                if !registry.provides_lifecycle(&rule.lifecycle_mapping_id) {
                    requirements.insert(LifecycleMappingRequirement::packaging(
                        &model.packaging,
                        Some(rule.lifecycle_mapping_id.clone()),
                    ));
                }
                PackagingResolution {
                    lifecycle_mapping_id: Some(rule.lifecycle_mapping_id.clone()),
                    source: rule.provenance,
                }
            }
            None => {
                if !evaluator.is_builtin_packaging(&model.packaging) {
                    requirements.insert(LifecycleMappingRequirement::packaging(&model.packaging, None));
                }
                PackagingResolution {
                    lifecycle_mapping_id: None,
                    source: Scope::BuiltinHeuristic,
                }
            }
        };

        for (key, resolution) in evaluation.iter() {
            match &resolution.action {
                MappingAction::Error { .. } if resolution.is_auto_default => {
                    requirements.insert(LifecycleMappingRequirement::execution(
                        key.clone(),
                        &model.packaging,
                    ));
                }
                MappingAction::Execute { handler_id } if !registry.contains(handler_id) => {
                    requirements.insert(LifecycleMappingRequirement::handler(
                        key.clone(),
                        handler_id,
                    ));
                }
                _ => {}
            }
        }

        tracing::debug!(
            "Project {} has {} open requirement(s)",
            model.project,
            requirements.len()
        );

        Self {
            project: model.project.clone(),
            packaging: model.packaging.clone(),
            packaging_resolution,
            evaluation,
            requirements,
        }
    }

    pub fn requirements(&self) -> &BTreeSet<LifecycleMappingRequirement> {
        &self.requirements
    }

    /// Whether this project still produces the requirement
    pub fn requires(&self, requirement: &LifecycleMappingRequirement) -> bool {
        self.requirements.contains(requirement)
    }

    pub fn is_error_mapping(&self, key: &ExecutionKey) -> bool {
        self.evaluation.is_error_mapping(key)
    }

    pub fn is_ignore_mapping(&self, key: &ExecutionKey) -> bool {
        self.evaluation.is_ignore_mapping(key)
    }

    /// Any explicit or heuristic error left in the project
    pub fn has_errors(&self) -> bool {
        !self.requirements.is_empty() || self.evaluation.errors().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ExecutionFilter, HandlerDescriptor, PackagingRule};
    use crate::types::PluginExecution;

    fn compile_key() -> ExecutionKey {
        ExecutionKey::new("org.plugin", "compile-plugin", "1.0", "compile").with_phase("compile")
    }

    fn model(packaging: &str) -> ProjectModel {
        ProjectModel::new(ProjectRef::new("g:app:1", "app/build.json"), packaging)
            .with_execution(PluginExecution::new(compile_key()))
    }

    #[test]
    fn test_unmapped_interesting_execution_is_required() {
        let config = ProjectMappingConfiguration::build(
            &model("jar"),
            &MappingMetadataStore::new(),
            &HandlerRegistry::new(),
            &Evaluator::new(),
        );

        assert!(config.is_error_mapping(&compile_key()));
        assert!(config.requires(&LifecycleMappingRequirement::execution(compile_key(), "jar")));
        assert_eq!(config.requirements().len(), 1);
        assert!(config.has_errors());
    }

    #[test]
    fn test_missing_handler_is_required() {
        let mut store = MappingMetadataStore::new();
        store
            .add(
                Scope::ExtensionDefault,
                ExecutionFilter::new("org.plugin", "compile-plugin"),
                MappingAction::execute("jdt"),
            )
            .unwrap();

        let without = ProjectMappingConfiguration::build(
            &model("jar"),
            &store,
            &HandlerRegistry::new(),
            &Evaluator::new(),
        );
        assert!(without.requires(&LifecycleMappingRequirement::handler(compile_key(), "jdt")));

        let registry = HandlerRegistry::new().with_handler(HandlerDescriptor::new("jdt"));
        let with = ProjectMappingConfiguration::build(&model("jar"), &store, &registry, &Evaluator::new());
        assert!(with.requirements().is_empty());
        assert!(!with.has_errors());
    }

    #[test]
    fn test_explicit_error_is_not_a_discovery_requirement() {
        let mut store = MappingMetadataStore::new();
        store
            .add(
                Scope::ProjectLocal,
                ExecutionFilter::new("org.plugin", "compile-plugin"),
                MappingAction::error(),
            )
            .unwrap();

        let config = ProjectMappingConfiguration::build(
            &model("jar"),
            &store,
            &HandlerRegistry::new(),
            &Evaluator::new(),
        );
        assert!(config.requirements().is_empty());
        assert!(config.has_errors());
    }

    #[test]
    fn test_packaging_requirements() {
        let store = MappingMetadataStore::new();
        let registry = HandlerRegistry::new();
        let evaluator = Evaluator::new();

        let unknown = ProjectMappingConfiguration::build(&model("bundle"), &store, &registry, &evaluator);
        assert!(unknown.requires(&LifecycleMappingRequirement::packaging("bundle", None)));

        let mut mapped = MappingMetadataStore::new();
        mapped
            .add_packaging_rule(Scope::WorkspaceGlobal, PackagingRule::new("bundle", "osgi"))
            .unwrap();
        let missing = ProjectMappingConfiguration::build(&model("bundle"), &mapped, &registry, &evaluator);
        assert!(missing.requires(&LifecycleMappingRequirement::packaging(
            "bundle",
            Some("osgi".into())
        )));
        assert_eq!(missing.packaging_resolution.source, Scope::WorkspaceGlobal);

        let registry = HandlerRegistry::new()
            .with_handler(HandlerDescriptor::new("osgi-handler").with_lifecycle_mapping("osgi"));
        let satisfied = ProjectMappingConfiguration::build(&model("bundle"), &mapped, &registry, &evaluator);
        assert!(
            !satisfied
                .requirements()
                .iter()
                .any(|r| matches!(r, LifecycleMappingRequirement::Packaging { .. }))
        );
    }
}
