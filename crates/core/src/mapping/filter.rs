//! Execution filters and the matcher that tests them against execution keys
//!
//! Identifiers are compared exactly and case-sensitively; there is no glob
//! matching on plugin coordinates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::ExecutionKey;
use crate::version::VersionRange;

/// Pattern over plugin executions
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionFilter {
    pub group_id: String,
    pub artifact_id: String,
    /// Absent means any version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_range: Option<String>,
    /// Empty means every goal
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub goals: BTreeSet<String>,
}

impl ExecutionFilter {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version_range: None,
            goals: BTreeSet::new(),
        }
    }

    /// Filter that matches exactly one plugin version and goal
    pub fn exact(key: &ExecutionKey) -> Self {
        Self::new(&key.group_id, &key.artifact_id)
            .with_version_range(format!("[{}]", key.version))
            .with_goal(&key.goal)
    }

    pub fn with_version_range(mut self, range: impl Into<String>) -> Self {
        self.version_range = Some(range.into());
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goals.insert(goal.into());
        self
    }

    /// Specificity within a scope (higher = more specific)
    pub fn specificity(&self) -> u32 {
        if self.goals.is_empty() { 0 } else { 1 }
    }

    /// Check the filter syntax without matching anything
    pub fn validate(&self) -> Result<()> {
        if self.group_id.is_empty() || self.artifact_id.is_empty() {
            return Err(Error::MalformedRule(format!(
                "Filter '{self}' is missing groupId or artifactId"
            )));
        }
        self.parsed_range().map(|_| ())
    }

    fn parsed_range(&self) -> Result<VersionRange> {
        match &self.version_range {
            Some(range) => VersionRange::parse(range),
            None => Ok(VersionRange::Any),
        }
    }

    /// Match against a key, reporting a malformed version range as an error
    ///
    /// The range is only parsed once coordinates and goal already match.
    pub fn try_matches(&self, key: &ExecutionKey) -> Result<bool> {
        if self.group_id != key.group_id || self.artifact_id != key.artifact_id {
            return Ok(false);
        }
        if !self.goals.is_empty() && !self.goals.contains(&key.goal) {
            return Ok(false);
        }
        Ok(self.parsed_range()?.contains(&key.version))
    }

    /// Total matcher: malformed filters never match
    pub fn matches(&self, key: &ExecutionKey) -> bool {
        self.try_matches(key).unwrap_or_else(|e| {
            tracing::debug!("Treating filter {} as non-matching: {}", self, e);
            false
        })
    }
}

/// Convenience free function mirroring [`ExecutionFilter::matches`]
pub fn matches(filter: &ExecutionFilter, key: &ExecutionKey) -> bool {
    filter.matches(key)
}

impl fmt::Display for ExecutionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)?;
        if self.version_range.is_some() || !self.goals.is_empty() {
            write!(f, ":{}", self.version_range.as_deref().unwrap_or("*"))?;
        }
        if !self.goals.is_empty() {
            let goals: Vec<&str> = self.goals.iter().map(String::as_str).collect();
            write!(f, ":{}", goals.join(","))?;
        }
        Ok(())
    }
}

/// Parses `groupId:artifactId[:versionRange[:goal,goal...]]`
impl FromStr for ExecutionFilter {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.splitn(4, ':');
        let group_id = parts.next().unwrap_or_default().trim();
        let artifact_id = parts.next().unwrap_or_default().trim();
        let range = parts.next().map(str::trim).unwrap_or_default();
        let goals = parts.next().map(str::trim).unwrap_or_default();

        let mut filter = ExecutionFilter::new(group_id, artifact_id);
        if !range.is_empty() && range != "*" {
            filter.version_range = Some(range.to_string());
        }
        filter.goals = goals
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(String::from)
            .collect();

        filter.validate()?;
        Ok(filter)
    }
}
