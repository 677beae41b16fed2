//! Commits remediation decisions
//!
//! Ignores are appended as exact-match rules into the scope the user
//! picked. Proposals are handed to the install collaborator; the remedy
//! brings its own extension rules, so nothing is written for it here.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::discovery::{DiscoveryProposal, LifecycleMappingRequirement};
use crate::error::{Error, Result};
use crate::mapping::{ExecutionFilter, MappingAction, Scope};
use crate::persistence::{ExecutionRuleEntry, MetadataBackend, RuleSource, WorkspaceMetadata};
use crate::types::{ExecutionKey, ProjectModel};

/// Installs a proposed remedy
#[async_trait]
pub trait Installer: Send + Sync {
    async fn install(&self, proposal: &DiscoveryProposal) -> Result<()>;
}

pub struct ResolutionWriter {
    backend: Arc<dyn MetadataBackend>,
    workspace: Arc<WorkspaceMetadata>,
    installer: Option<Arc<dyn Installer>>,
    /// Serializes load/modify/save of build descriptions
    description_lock: Mutex<()>,
}

impl std::fmt::Debug for ResolutionWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionWriter")
            .field("workspace", &self.workspace)
            .field("has_installer", &self.installer.is_some())
            .finish()
    }
}

impl ResolutionWriter {
    pub fn new(backend: Arc<dyn MetadataBackend>, workspace: Arc<WorkspaceMetadata>) -> Self {
        Self {
            backend,
            workspace,
            installer: None,
            description_lock: Mutex::new(()),
        }
    }

    pub fn with_installer(mut self, installer: Arc<dyn Installer>) -> Self {
        self.installer = Some(installer);
        self
    }

    /// Build descriptions a rule for `key` at `scope` goes into
    fn targets(scope: Scope, key: &ExecutionKey, projects: &[ProjectModel]) -> Result<BTreeSet<RuleSource>> {
        match scope {
            Scope::ProjectLocal => Ok(projects
                .iter()
                .map(|model| RuleSource::Description(model.project.description.clone()))
                .collect()),
            Scope::InheritedParent => projects
                .iter()
                .map(|model| {
                    model
                        .nearest_declaring_parent(key)
                        .map(|parent| RuleSource::Description(parent.description.clone()))
                        .ok_or_else(|| Error::NoDeclaringParent {
                            project: model.project.to_string(),
                            execution: key.to_string(),
                        })
                })
                .collect(),
            Scope::WorkspaceGlobal => Ok(BTreeSet::from([RuleSource::Workspace])),
            Scope::ExtensionDefault | Scope::BuiltinHeuristic => Err(Error::ScopeNotWritable(scope)),
        }
    }

    /// Ignore `key` at `scope` for the given projects
    ///
    /// Returns how many rules were actually written; a rule that is
    /// already present counts as done.
    pub fn apply_ignore(&self, scope: Scope, key: &ExecutionKey, projects: &[ProjectModel]) -> Result<usize> {
        let filter = ExecutionFilter::exact(key);
        let mut written = 0;

        for target in Self::targets(scope, key, projects)? {
            let result = match &target {
                RuleSource::Workspace => self.workspace.add_rule(filter.clone(), MappingAction::Ignore),
                source => {
                    let _guard = self
                        .description_lock
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    self.backend
                        .add(source, scope, filter.clone(), MappingAction::Ignore)
                }
            };

            match result {
                Ok(()) => {
                    tracing::info!("Ignored {} in {} ({})", key, target, scope);
                    written += 1;
                }
                Err(e) if e.is_duplicate() => {
                    tracing::debug!("{} already ignored in {}", key, target);
                }
                Err(e @ Error::WriteFailure { .. }) => return Err(e),
                Err(e) => return Err(Error::write_failure(&target, e)),
            }
        }
        Ok(written)
    }

    /// Drop exact-match rules for `key` at `scope`, undoing an earlier ignore or fixing a conflict
    pub fn remove_rules(&self, scope: Scope, key: &ExecutionKey, projects: &[ProjectModel]) -> Result<usize> {
        let filter = ExecutionFilter::exact(key);
        let mut removed = 0;

        for target in Self::targets(scope, key, projects)? {
            let result = match &target {
                RuleSource::Workspace => self.workspace.remove_rule(|entry| entry.filter == filter),
                source => {
                    let _guard = self
                        .description_lock
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    self.backend
                        .remove(source, &mut |entry: &ExecutionRuleEntry| entry.filter == filter)
                }
            };
            removed += result.map_err(|e| match e {
                e @ Error::WriteFailure { .. } => e,
                e => Error::write_failure(&target, e),
            })?;
        }
        if removed > 0 {
            tracing::info!("Removed {} {} rule(s) for {}", removed, scope, key);
        }
        Ok(removed)
    }

    /// Hand a chosen proposal to the install mechanism
    pub async fn apply_proposal(
        &self,
        requirement: &LifecycleMappingRequirement,
        proposal: &DiscoveryProposal,
    ) -> Result<()> {
        if !proposal.claims(requirement) {
            return Err(Error::ConflictingSelection(format!(
                "{} does not satisfy {requirement}",
                proposal.id
            )));
        }
        let Some(installer) = &self.installer else {
            return Err(Error::DiscoveryUnavailable(format!(
                "no install mechanism for {}",
                proposal.id
            )));
        };

        tracing::info!("Installing {} for {}", proposal, requirement);
        installer
            .install(proposal)
            .await
            .map_err(|e| Error::Install {
                proposal: proposal.id.clone(),
                reason: e.to_string(),
            })
    }
}
