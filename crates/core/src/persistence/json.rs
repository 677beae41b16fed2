//! JSON file backend
//!
//! Build descriptions are JSON objects whose `lifecycleMappings` key holds
//! the rule document; every other key is left untouched on write. The
//! workspace file and extension files are bare rule documents.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use super::{MetadataBackend, RuleDocument, RuleSource};
use crate::error::{Error, Result};

/// Key inside a build description that holds its mapping rules
pub const DESCRIPTION_KEY: &str = "lifecycleMappings";

#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    workspace_file: PathBuf,
    extensions_dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(workspace_file: impl Into<PathBuf>, extensions_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_file: workspace_file.into(),
            extensions_dir: extensions_dir.into(),
        }
    }

    pub fn workspace_file(&self) -> &Path {
        &self.workspace_file
    }

    fn extension_file(&self, id: &str) -> PathBuf {
        self.extensions_dir.join(format!("{id}.json"))
    }

    fn read_document_file(path: &Path) -> Result<Option<RuleDocument>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        RuleDocument::from_json(&contents).map(Some).map_err(|e| {
            tracing::error!("Failed to parse rule document {:?}: {}", path, e);
            e
        })
    }

    fn write_document_file(path: &Path, document: &RuleDocument) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, document.to_json()?)?;
        Ok(())
    }

    fn read_description(path: &Path) -> Result<Option<RuleDocument>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let description: Map<String, Value> = serde_json::from_str(&contents)?;
        match description.get(DESCRIPTION_KEY) {
            Some(section) => Ok(Some(serde_json::from_value(section.clone())?)),
            None => Ok(None),
        }
    }

    fn write_description(path: &Path, document: &RuleDocument) -> Result<()> {
        let mut description: Map<String, Value> = if path.exists() {
            serde_json::from_str(&fs::read_to_string(path)?)?
        } else {
            return Err(Error::write_failure(
                path.display(),
                "build description does not exist",
            ));
        };

        description.insert(DESCRIPTION_KEY.to_string(), serde_json::to_value(document)?);
        fs::write(path, serde_json::to_string_pretty(&description)?)?;
        Ok(())
    }
}

impl MetadataBackend for JsonFileBackend {
    fn read(&self, source: &RuleSource) -> Result<Option<RuleDocument>> {
        match source {
            RuleSource::Description(path) => Self::read_description(path),
            RuleSource::Workspace => Self::read_document_file(&self.workspace_file),
            RuleSource::Extension(id) => Self::read_document_file(&self.extension_file(id)),
        }
    }

    fn write(&self, source: &RuleSource, document: &RuleDocument) -> Result<()> {
        tracing::debug!("Writing {} rule(s) to {}", document.plugin_executions.len(), source);
        match source {
            RuleSource::Description(path) => Self::write_description(path, document),
            RuleSource::Workspace => Self::write_document_file(&self.workspace_file, document),
            RuleSource::Extension(id) => {
                Self::write_document_file(&self.extension_file(id), document)
            }
        }
    }

    fn extensions(&self) -> Result<Vec<String>> {
        if !self.extensions_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.extensions_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem() {
                    ids.push(stem.to_string_lossy().to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}
