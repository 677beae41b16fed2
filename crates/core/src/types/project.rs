use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::ExecutionKey;
use crate::error::{Error, Result};

/// Reference to a project and the build description that declares it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    /// `groupId:artifactId:version` of the project
    pub id: String,
    /// Path of the build description file
    pub description: PathBuf,
}

impl ProjectRef {
    pub fn new(id: impl Into<String>, description: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// One execution as supplied by the build model reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginExecution {
    pub key: ExecutionKey,
    /// Build descriptions that declare this execution, in any order
    #[serde(default)]
    pub declared_in: Vec<ProjectRef>,
}

impl PluginExecution {
    pub fn new(key: ExecutionKey) -> Self {
        Self {
            key,
            declared_in: Vec::new(),
        }
    }

    pub fn declared_in(mut self, project: ProjectRef) -> Self {
        self.declared_in.push(project);
        self
    }

    pub fn is_declared_in(&self, project: &ProjectRef) -> bool {
        self.declared_in.iter().any(|p| p == project)
    }
}

/// Build model of a single project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModel {
    pub project: ProjectRef,
    #[serde(default = "default_packaging")]
    pub packaging: String,
    /// Ancestor build descriptions, nearest first
    #[serde(default)]
    pub parents: Vec<ProjectRef>,
    #[serde(default)]
    pub executions: Vec<PluginExecution>,
}

fn default_packaging() -> String {
    "jar".to_string()
}

impl ProjectModel {
    pub fn new(project: ProjectRef, packaging: impl Into<String>) -> Self {
        Self {
            project,
            packaging: packaging.into(),
            parents: Vec::new(),
            executions: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: ProjectRef) -> Self {
        self.parents.push(parent);
        self
    }

    pub fn with_execution(mut self, execution: PluginExecution) -> Self {
        self.executions.push(execution);
        self
    }

    pub fn execution_keys(&self) -> Vec<ExecutionKey> {
        self.executions.iter().map(|e| e.key.clone()).collect()
    }

    pub fn execution(&self, key: &ExecutionKey) -> Option<&PluginExecution> {
        self.executions.iter().find(|e| &e.key == key)
    }

    /// Nearest ancestor whose build description declares the execution
    pub fn nearest_declaring_parent(&self, key: &ExecutionKey) -> Option<&ProjectRef> {
        let execution = self.execution(key)?;
        self.parents
            .iter()
            .find(|parent| execution.is_declared_in(parent))
    }
}

/// Supplies project build models to the engine
pub trait BuildModelReader {
    fn read(&self, project: &Path) -> Result<ProjectModel>;
}

/// Reads project models serialized as JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonModelReader;

impl BuildModelReader for JsonModelReader {
    fn read(&self, project: &Path) -> Result<ProjectModel> {
        let contents = std::fs::read_to_string(project)?;
        serde_json::from_str(&contents).map_err(|e| {
            tracing::error!("Failed to parse project model {:?}: {}", project, e);
            Error::ConfigError(format!("Failed to parse project model {}: {e}", project.display()))
        })
    }
}
