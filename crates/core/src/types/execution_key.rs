use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Identity of a single build-plugin execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionKey {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub goal: String,
    #[serde(default)]
    pub execution_id: String,
    /// Empty when the execution is not bound to a phase
    #[serde(default)]
    pub lifecycle_phase: String,
}

impl ExecutionKey {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            goal: goal.into(),
            execution_id: String::new(),
            lifecycle_phase: String::new(),
        }
    }

    /// Builder method for the lifecycle phase
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.lifecycle_phase = phase.into();
        self
    }

    /// Builder method for the execution id
    pub fn with_execution_id(mut self, id: impl Into<String>) -> Self {
        self.execution_id = id.into();
        self
    }

    pub fn is_phase_bound(&self) -> bool {
        !self.lifecycle_phase.is_empty()
    }

    /// `groupId:artifactId` of the plugin
    pub fn plugin_coordinates(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

impl fmt::Display for ExecutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.version, self.goal
        )?;
        if !self.lifecycle_phase.is_empty() {
            write!(f, "@{}", self.lifecycle_phase)?;
        }
        if !self.execution_id.is_empty() {
            write!(f, "#{}", self.execution_id)?;
        }
        Ok(())
    }
}

/// Parses `groupId:artifactId:version:goal[@phase][#executionId]`
impl FromStr for ExecutionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, execution_id) = match s.rsplit_once('#') {
            Some((rest, id)) => (rest, id),
            None => (s, ""),
        };
        let (coordinates, phase) = match rest.split_once('@') {
            Some((coordinates, phase)) => (coordinates, phase),
            None => (rest, ""),
        };

        let parts: Vec<&str> = coordinates.split(':').collect();
        if parts.len() != 4 || parts.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::Other(format!(
                "Invalid execution '{s}', expected groupId:artifactId:version:goal[@phase][#id]"
            )));
        }

        Ok(ExecutionKey::new(parts[0], parts[1], parts[2], parts[3])
            .with_phase(phase)
            .with_execution_id(execution_id))
    }
}
