//! Discovery workflow as an explicit state machine
//!
//! A request collects requirements from one or more projects, asks an
//! oracle for proposals once, then lets the host (or [`DiscoveryRequest::auto_complete`])
//! pick remedies. It is never persisted.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tokio_util::sync::CancellationToken;

use super::{DiscoveryOracle, DiscoveryProposal, LifecycleMappingRequirement};
use crate::error::{Error, Result};
use crate::evaluator::ProjectMappingConfiguration;
use crate::types::ProjectRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    Empty,
    Collecting,
    Querying,
    Completed,
    /// Cancelled while querying; partial results stay readable
    Cancelled,
}

impl fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiscoveryState::Empty => "empty",
            DiscoveryState::Collecting => "collecting",
            DiscoveryState::Querying => "querying",
            DiscoveryState::Completed => "completed",
            DiscoveryState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Outcome of one `discover` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Distinct requirements sent to the oracle
    pub queried: usize,
    /// Requirements with at least one proposal
    pub answered: usize,
    /// Requirements whose lookup failed, with the reason
    pub failed: Vec<(LifecycleMappingRequirement, String)>,
    /// No oracle was available
    pub unavailable: bool,
    pub cancelled: bool,
}

#[derive(Debug)]
pub struct DiscoveryRequest {
    state: DiscoveryState,
    projects: BTreeMap<ProjectRef, BTreeSet<LifecycleMappingRequirement>>,
    proposals: BTreeMap<LifecycleMappingRequirement, Vec<DiscoveryProposal>>,
    selected: BTreeMap<LifecycleMappingRequirement, DiscoveryProposal>,
}

impl Default for DiscoveryRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryRequest {
    pub fn new() -> Self {
        Self {
            state: DiscoveryState::Empty,
            projects: BTreeMap::new(),
            proposals: BTreeMap::new(),
            selected: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    fn expect_state(&self, allowed: &[DiscoveryState], operation: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "cannot {operation} while discovery is {}",
                self.state
            )))
        }
    }

    /// Record that a project needs a remedy for `requirement`
    pub fn add_requirement(&mut self, project: ProjectRef, requirement: LifecycleMappingRequirement) -> Result<()> {
        self.expect_state(
            &[DiscoveryState::Empty, DiscoveryState::Collecting],
            "add requirements",
        )?;
        self.projects.entry(project).or_default().insert(requirement);
        self.state = DiscoveryState::Collecting;
        Ok(())
    }

    /// Add every open requirement of a project configuration
    pub fn add_configuration(&mut self, configuration: &ProjectMappingConfiguration) -> Result<()> {
        for requirement in configuration.requirements() {
            self.add_requirement(configuration.project.clone(), requirement.clone())?;
        }
        Ok(())
    }

    pub fn projects(&self) -> &BTreeMap<ProjectRef, BTreeSet<LifecycleMappingRequirement>> {
        &self.projects
    }

    /// Distinct requirements across all projects
    pub fn requirements(&self) -> BTreeSet<&LifecycleMappingRequirement> {
        self.projects.values().flatten().collect()
    }

    /// Ask the oracle for proposals
    ///
    /// Lookup failures leave the affected requirements without proposals.
    /// Cancellation keeps whatever was already stored and moves the request
    /// to [`DiscoveryState::Cancelled`]. Dropping the future mid-query leaves
    /// it in [`DiscoveryState::Querying`]; either way it cannot be queried again.
    pub async fn discover(
        &mut self,
        oracle: Option<&dyn DiscoveryOracle>,
        cancel: CancellationToken,
    ) -> Result<DiscoveryReport> {
        self.expect_state(
            &[DiscoveryState::Empty, DiscoveryState::Collecting],
            "discover",
        )?;

        let requirements: BTreeSet<LifecycleMappingRequirement> =
            self.requirements().into_iter().cloned().collect();
        let mut report = DiscoveryReport {
            queried: requirements.len(),
            ..DiscoveryReport::default()
        };

        let Some(oracle) = oracle else {
            tracing::info!(
                "{}",
                Error::DiscoveryUnavailable(format!(
                    "no oracle, {} requirement(s) stay unresolved",
                    requirements.len()
                ))
            );
            for requirement in requirements {
                self.proposals.entry(requirement).or_default();
            }
            report.unavailable = true;
            self.state = DiscoveryState::Completed;
            return Ok(report);
        };

        self.state = DiscoveryState::Querying;
        tracing::debug!("Querying oracle for {} requirement(s)", requirements.len());

        let batches: Vec<BTreeSet<LifecycleMappingRequirement>> =
            if oracle.supports_batch() && !requirements.is_empty() {
                vec![requirements]
            } else {
                requirements
                    .into_iter()
                    .map(|requirement| BTreeSet::from([requirement]))
                    .collect()
            };

        for batch in batches {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = oracle.query(&batch) => Some(result),
            };

            let Some(result) = outcome else {
                tracing::info!("Discovery cancelled, keeping partial results");
                self.state = DiscoveryState::Cancelled;
                report.cancelled = true;
                return Ok(report);
            };

            match result {
                Ok(mut found) => {
                    for requirement in batch {
                        let offered = found.remove(&requirement).unwrap_or_default();
                        if !offered.is_empty() {
                            report.answered += 1;
                        }
                        self.proposals.insert(requirement, offered);
                    }
                }
                Err(e) => {
                    tracing::warn!("Discovery lookup failed: {}", e);
                    for requirement in batch {
                        report.failed.push((requirement.clone(), e.to_string()));
                        self.proposals.insert(requirement, Vec::new());
                    }
                }
            }
        }

        self.state = DiscoveryState::Completed;
        tracing::debug!(
            "Discovery completed: {} of {} requirement(s) have proposals",
            report.answered,
            report.queried
        );
        Ok(report)
    }

    /// Proposals offered for a requirement
    pub fn proposals(&self, requirement: &LifecycleMappingRequirement) -> &[DiscoveryProposal] {
        self.proposals
            .get(requirement)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The only offer for `requirement`, when it claims to fix it
    fn sole_claiming_offer(&self, requirement: &LifecycleMappingRequirement) -> Option<&DiscoveryProposal> {
        match self.proposals(requirement) {
            [proposal] if proposal.claims(requirement) => Some(proposal),
            _ => None,
        }
    }

    /// Sole proposal for `requirement`, if selecting it automatically is unambiguous
    fn unambiguous_choice(&self, requirement: &LifecycleMappingRequirement) -> Option<&DiscoveryProposal> {
        let proposal = self.sole_claiming_offer(requirement)?;
        // offered for a sibling it does not claim to fix
        let offered_elsewhere = self.proposals.iter().any(|(other, offered)| {
            offered.iter().any(|p| p.id == proposal.id) && !proposal.claims(other)
        });
        if offered_elsewhere {
            return None;
        }
        // only remedies that are or would be picked can conflict
        let mut rivals = self.selected.values().chain(
            self.unresolved()
                .into_iter()
                .filter(|other| *other != requirement)
                .filter_map(|other| self.sole_claiming_offer(other)),
        );
        if rivals.any(|other| proposal.overlaps(other)) {
            return None;
        }
        Some(proposal)
    }

    /// Select every proposal that is the only, unambiguous remedy for a requirement
    ///
    /// Returns the number of requirements newly selected.
    pub fn auto_complete(&mut self) -> Result<usize> {
        self.expect_state(&[DiscoveryState::Completed], "auto-complete")?;

        let mut selected = 0;
        loop {
            let choice = self
                .unresolved()
                .into_iter()
                .find_map(|requirement| self.unambiguous_choice(requirement))
                .cloned();
            let Some(proposal) = choice else {
                break;
            };
            tracing::debug!("Auto-selecting {}", proposal);
            selected += self.select_claimed(&proposal);
        }
        Ok(selected)
    }

    fn select_claimed(&mut self, proposal: &DiscoveryProposal) -> usize {
        let claimed: Vec<LifecycleMappingRequirement> = self
            .requirements()
            .into_iter()
            .filter(|requirement| proposal.claims(requirement))
            .cloned()
            .collect();
        let mut newly = 0;
        for requirement in claimed {
            if self.selected.insert(requirement, proposal.clone()).is_none() {
                newly += 1;
            }
        }
        newly
    }

    /// Manually select a proposal for every requirement it claims
    pub fn select(&mut self, proposal: &DiscoveryProposal) -> Result<()> {
        self.expect_state(&[DiscoveryState::Completed], "select proposals")?;

        let claimed: Vec<LifecycleMappingRequirement> = self
            .requirements()
            .into_iter()
            .filter(|requirement| proposal.claims(requirement))
            .cloned()
            .collect();
        if claimed.is_empty() {
            return Err(Error::ConflictingSelection(format!(
                "{} does not satisfy any requirement of this request",
                proposal.id
            )));
        }
        if let Some((requirement, existing)) = claimed.iter().find_map(|requirement| {
            self.selected
                .get(requirement)
                .filter(|existing| existing.id != proposal.id)
                .map(|existing| (requirement, existing))
        }) {
            return Err(Error::ConflictingSelection(format!(
                "{requirement} already has {} selected",
                existing.id
            )));
        }

        self.select_claimed(proposal);
        Ok(())
    }

    /// Drop a proposal from every requirement it was selected for
    pub fn deselect(&mut self, proposal_id: &str) -> usize {
        let before = self.selected.len();
        self.selected.retain(|_, p| p.id != proposal_id);
        before - self.selected.len()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self, requirement: &LifecycleMappingRequirement) -> Option<&DiscoveryProposal> {
        self.selected.get(requirement)
    }

    /// Distinct selected proposals, ordered by id
    pub fn selected_proposals(&self) -> Vec<&DiscoveryProposal> {
        let mut proposals: Vec<&DiscoveryProposal> = Vec::new();
        for proposal in self.selected.values() {
            if !proposals.iter().any(|p| p.id == proposal.id) {
                proposals.push(proposal);
            }
        }
        proposals.sort_by(|a, b| a.id.cmp(&b.id));
        proposals
    }

    /// Requirements that have no selected proposal yet
    pub fn unresolved(&self) -> Vec<&LifecycleMappingRequirement> {
        self.requirements()
            .into_iter()
            .filter(|requirement| !self.selected.contains_key(*requirement))
            .collect()
    }

    /// Every requirement has a selected proposal
    pub fn is_mapping_complete(&self) -> bool {
        self.unresolved().is_empty()
    }

    /// Whether the projects are fixed, judged against freshly built configurations
    ///
    /// A requirement is settled once no current configuration still produces
    /// it. That covers ignores written by the host, remedies installed and
    /// picked up on reload, and requirements that were stale to begin with.
    /// A selection on its own settles nothing until the store reflects it.
    pub fn is_complete(&self, current: &[ProjectMappingConfiguration]) -> bool {
        self.requirements()
            .into_iter()
            .all(|requirement| !current.iter().any(|c| c.requires(requirement)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{CatalogOracle, ProposalMap};
    use crate::evaluator::Evaluator;
    use crate::mapping::{ExecutionFilter, HandlerRegistry, MappingAction, MappingMetadataStore, Scope};
    use crate::types::{ExecutionKey, PluginExecution, ProjectModel};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn project() -> ProjectRef {
        ProjectRef::new("g:app:1", "app/build.json")
    }

    fn requirement(artifact: &str) -> LifecycleMappingRequirement {
        LifecycleMappingRequirement::execution(
            ExecutionKey::new("org.plugin", artifact, "1.0", "run").with_phase("compile"),
            "jar",
        )
    }

    fn collecting(artifacts: &[&str]) -> DiscoveryRequest {
        let mut request = DiscoveryRequest::new();
        for artifact in artifacts {
            request.add_requirement(project(), requirement(artifact)).unwrap();
        }
        request
    }

    /// Answers each requirement from a fixed map and counts calls
    struct ScriptedOracle {
        batch: bool,
        answers: ProposalMap,
        failing: BTreeSet<LifecycleMappingRequirement>,
        calls: AtomicUsize,
    }

    impl ScriptedOracle {
        fn new(batch: bool) -> Self {
            Self {
                batch,
                answers: ProposalMap::new(),
                failing: BTreeSet::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn answer(mut self, requirement: LifecycleMappingRequirement, proposals: Vec<DiscoveryProposal>) -> Self {
            self.answers.insert(requirement, proposals);
            self
        }

        fn fail(mut self, requirement: LifecycleMappingRequirement) -> Self {
            self.failing.insert(requirement);
            self
        }
    }

    #[async_trait]
    impl DiscoveryOracle for ScriptedOracle {
        fn supports_batch(&self) -> bool {
            self.batch
        }

        async fn query(&self, requirements: &BTreeSet<LifecycleMappingRequirement>) -> Result<ProposalMap> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if requirements.iter().any(|r| self.failing.contains(r)) {
                return Err(Error::Other("catalog offline".into()));
            }
            Ok(requirements
                .iter()
                .filter_map(|r| self.answers.get(r).map(|p| (r.clone(), p.clone())))
                .collect())
        }
    }

    /// Answers requirements one at a time and stalls on `stall_on`, cancelling `cancel` as it does
    struct StallingOracle {
        answers: ProposalMap,
        stall_on: LifecycleMappingRequirement,
        cancel: CancellationToken,
    }

    #[async_trait]
    impl DiscoveryOracle for StallingOracle {
        async fn query(&self, requirements: &BTreeSet<LifecycleMappingRequirement>) -> Result<ProposalMap> {
            if requirements.contains(&self.stall_on) {
                self.cancel.cancel();
                return std::future::pending().await;
            }
            Ok(requirements
                .iter()
                .filter_map(|r| self.answers.get(r).map(|p| (r.clone(), p.clone())))
                .collect())
        }
    }

    /// Never answers
    struct HangingOracle;

    #[async_trait]
    impl DiscoveryOracle for HangingOracle {
        async fn query(&self, _requirements: &BTreeSet<LifecycleMappingRequirement>) -> Result<ProposalMap> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_state_transitions_while_collecting() {
        let mut request = DiscoveryRequest::new();
        assert_eq!(request.state(), DiscoveryState::Empty);

        request.add_requirement(project(), requirement("a")).unwrap();
        request.add_requirement(project(), requirement("a")).unwrap();
        request
            .add_requirement(ProjectRef::new("g:other:1", "other/build.json"), requirement("a"))
            .unwrap();

        assert_eq!(request.state(), DiscoveryState::Collecting);
        assert_eq!(request.projects().len(), 2);
        assert_eq!(request.requirements().len(), 1);
    }

    #[tokio::test]
    async fn test_no_oracle_degrades_to_no_proposals() {
        let mut request = collecting(&["a"]);
        let report = request.discover(None, CancellationToken::new()).await.unwrap();

        assert!(report.unavailable);
        assert_eq!(request.state(), DiscoveryState::Completed);
        assert!(request.proposals(&requirement("a")).is_empty());
        assert_eq!(request.auto_complete().unwrap(), 0);
        assert_eq!(request.unresolved(), vec![&requirement("a")]);
    }

    #[tokio::test]
    async fn test_batch_oracle_is_called_once() {
        let oracle = ScriptedOracle::new(true)
            .answer(requirement("a"), vec![DiscoveryProposal::new("pa").satisfying(requirement("a"))]);
        let mut request = collecting(&["a", "b"]);

        let report = request.discover(Some(&oracle), CancellationToken::new()).await.unwrap();

        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.queried, 2);
        assert_eq!(report.answered, 1);
        assert!(request.proposals(&requirement("b")).is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_leaves_entries_empty() {
        let oracle = ScriptedOracle::new(false)
            .answer(requirement("a"), vec![DiscoveryProposal::new("pa").satisfying(requirement("a"))])
            .fail(requirement("b"));
        let mut request = collecting(&["a", "b"]);

        let report = request.discover(Some(&oracle), CancellationToken::new()).await.unwrap();

        assert_eq!(oracle.calls.load(Ordering::SeqCst), 2);
        assert_eq!(request.state(), DiscoveryState::Completed);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, requirement("b"));
        assert_eq!(request.proposals(&requirement("a")).len(), 1);
        assert!(request.proposals(&requirement("b")).is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_keeps_partial_results() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut request = collecting(&["a"]);

        let report = request.discover(Some(&HangingOracle), cancel).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(request.state(), DiscoveryState::Cancelled);
        assert_eq!(request.requirements().len(), 1);
        let err = request
            .discover(Some(&HangingOracle), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert!(request.add_requirement(project(), requirement("b")).is_err());
    }

    #[tokio::test]
    async fn test_cancel_from_another_task() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let mut request = collecting(&["a"]);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            trigger.cancel();
        });
        let report = request.discover(Some(&HangingOracle), cancel).await.unwrap();
        handle.await.unwrap();

        assert!(report.cancelled);
        assert!(request.proposals(&requirement("a")).is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_query_keeps_answered_requirements() {
        let pa = DiscoveryProposal::new("pa").satisfying(requirement("a"));
        let cancel = CancellationToken::new();
        let oracle = StallingOracle {
            answers: ProposalMap::from([(requirement("a"), vec![pa.clone()])]),
            stall_on: requirement("b"),
            cancel: cancel.clone(),
        };
        let mut request = collecting(&["a", "b"]);

        let report = request.discover(Some(&oracle), cancel).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.answered, 1);
        assert_eq!(request.state(), DiscoveryState::Cancelled);
        assert_eq!(request.proposals(&requirement("a")), &[pa][..]);
        assert!(request.proposals(&requirement("b")).is_empty());
        assert_eq!(request.unresolved().len(), 2);

        let err = request
            .discover(Some(&oracle), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert!(matches!(request.auto_complete(), Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_auto_complete_selects_distinct_non_overlapping() {
        let pa = DiscoveryProposal::new("pa").satisfying(requirement("a"));
        let pb = DiscoveryProposal::new("pb").satisfying(requirement("b"));
        let oracle = CatalogOracle::new(vec![pa.clone(), pb.clone()]);
        let mut request = collecting(&["a", "b"]);
        request.discover(Some(&oracle), CancellationToken::new()).await.unwrap();

        assert_eq!(request.auto_complete().unwrap(), 2);
        assert_eq!(request.selected(&requirement("a")), Some(&pa));
        assert_eq!(request.selected(&requirement("b")), Some(&pb));
        assert!(request.is_mapping_complete());
    }

    #[tokio::test]
    async fn test_auto_complete_refuses_shared_proposal_claiming_one() {
        let shared = DiscoveryProposal::new("shared").satisfying(requirement("a"));
        let oracle = ScriptedOracle::new(true)
            .answer(requirement("a"), vec![shared.clone()])
            .answer(requirement("b"), vec![shared]);
        let mut request = collecting(&["a", "b"]);
        request.discover(Some(&oracle), CancellationToken::new()).await.unwrap();

        assert_eq!(request.auto_complete().unwrap(), 0);
        assert_eq!(request.unresolved().len(), 2);
    }

    #[tokio::test]
    async fn test_auto_complete_ignores_unpicked_alternatives() {
        let pa = DiscoveryProposal::new("pa").satisfying(requirement("a"));
        let pb = DiscoveryProposal::new("pb")
            .satisfying(requirement("a"))
            .satisfying(requirement("b"));
        let pc = DiscoveryProposal::new("pc").satisfying(requirement("b"));
        let oracle = ScriptedOracle::new(true)
            .answer(requirement("a"), vec![pa.clone()])
            .answer(requirement("b"), vec![pb, pc]);
        let mut request = collecting(&["a", "b"]);
        request.discover(Some(&oracle), CancellationToken::new()).await.unwrap();

        // pb overlaps pa but is neither selected nor the only offer for b
        assert_eq!(request.auto_complete().unwrap(), 1);
        assert_eq!(request.selected(&requirement("a")), Some(&pa));
        assert_eq!(request.unresolved(), vec![&requirement("b")]);
    }

    #[tokio::test]
    async fn test_auto_complete_refuses_overlapping_sole_offers() {
        let x = DiscoveryProposal::new("x")
            .satisfying(requirement("a"))
            .satisfying(requirement("c"));
        let y = DiscoveryProposal::new("y")
            .satisfying(requirement("b"))
            .satisfying(requirement("c"));
        let oracle = ScriptedOracle::new(true)
            .answer(requirement("a"), vec![x.clone()])
            .answer(requirement("b"), vec![y]);
        let mut request = collecting(&["a", "b"]);
        request.discover(Some(&oracle), CancellationToken::new()).await.unwrap();

        assert_eq!(request.auto_complete().unwrap(), 0);

        request.select(&x).unwrap();
        assert_eq!(request.selected_proposals(), vec![&x]);
        assert_eq!(request.unresolved(), vec![&requirement("b")]);
    }

    #[tokio::test]
    async fn test_auto_complete_refuses_overlap_with_selected_remedy() {
        let wide = DiscoveryProposal::new("wide")
            .satisfying(requirement("b"))
            .satisfying(requirement("c"));
        let other = DiscoveryProposal::new("other").satisfying(requirement("b"));
        let narrow = DiscoveryProposal::new("narrow")
            .satisfying(requirement("a"))
            .satisfying(requirement("c"));
        let oracle = ScriptedOracle::new(true)
            .answer(requirement("a"), vec![narrow])
            .answer(requirement("b"), vec![wide.clone(), other]);
        let mut request = collecting(&["a", "b", "c"]);
        request.discover(Some(&oracle), CancellationToken::new()).await.unwrap();

        request.select(&wide).unwrap();
        assert_eq!(request.auto_complete().unwrap(), 0);
        assert_eq!(request.unresolved(), vec![&requirement("a")]);
    }

    #[tokio::test]
    async fn test_auto_complete_selects_multi_claim_proposal_everywhere() {
        let both = DiscoveryProposal::new("both")
            .satisfying(requirement("a"))
            .satisfying(requirement("b"));
        let oracle = CatalogOracle::new(vec![both.clone()]);
        let mut request = collecting(&["a", "b"]);
        request.discover(Some(&oracle), CancellationToken::new()).await.unwrap();

        assert_eq!(request.auto_complete().unwrap(), 2);
        assert_eq!(request.selected_proposals(), vec![&both]);
    }

    #[tokio::test]
    async fn test_auto_complete_is_order_independent() {
        let pa = DiscoveryProposal::new("pa").satisfying(requirement("a"));
        let pb = DiscoveryProposal::new("pb").satisfying(requirement("b"));
        let oracle = CatalogOracle::new(vec![pb, pa]);

        let mut forward = collecting(&["a", "b"]);
        let mut backward = collecting(&["b", "a"]);
        forward.discover(Some(&oracle), CancellationToken::new()).await.unwrap();
        backward.discover(Some(&oracle), CancellationToken::new()).await.unwrap();
        forward.auto_complete().unwrap();
        backward.auto_complete().unwrap();

        assert_eq!(forward.selected_proposals(), backward.selected_proposals());
    }

    #[tokio::test]
    async fn test_selection_never_targets_unclaimed_requirement() {
        let pa = DiscoveryProposal::new("pa").satisfying(requirement("a"));
        let other = DiscoveryProposal::new("other").satisfying(requirement("a"));
        let unrelated = DiscoveryProposal::new("unrelated").satisfying(requirement("z"));
        let mut request = collecting(&["a", "b"]);
        request.discover(None, CancellationToken::new()).await.unwrap();

        assert!(matches!(
            request.select(&unrelated),
            Err(Error::ConflictingSelection(_))
        ));

        request.select(&pa).unwrap();
        assert!(request.selected(&requirement("b")).is_none());
        assert!(matches!(
            request.select(&other),
            Err(Error::ConflictingSelection(_))
        ));

        assert_eq!(request.deselect("pa"), 1);
        request.select(&other).unwrap();
        request.clear_selection();
        assert!(request.selected_proposals().is_empty());
    }

    #[tokio::test]
    async fn test_selection_requires_completed_discovery() {
        let mut request = collecting(&["a"]);
        let pa = DiscoveryProposal::new("pa").satisfying(requirement("a"));
        assert!(matches!(request.select(&pa), Err(Error::InvalidState(_))));
        assert!(matches!(request.auto_complete(), Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_is_complete_follows_reevaluation() {
        let key = ExecutionKey::new("org.plugin", "compile-plugin", "1.0", "compile").with_phase("compile");
        let model = ProjectModel::new(project(), "jar").with_execution(PluginExecution::new(key.clone()));
        let registry = HandlerRegistry::new();
        let evaluator = Evaluator::new();

        let mut store = MappingMetadataStore::new();
        let before = ProjectMappingConfiguration::build(&model, &store, &registry, &evaluator);
        let mut request = DiscoveryRequest::new();
        request.add_configuration(&before).unwrap();
        request.discover(None, CancellationToken::new()).await.unwrap();

        assert!(!request.is_complete(std::slice::from_ref(&before)));

        store
            .add(Scope::ProjectLocal, ExecutionFilter::exact(&key), MappingAction::Ignore)
            .unwrap();
        let after = ProjectMappingConfiguration::build(&model, &store, &registry, &evaluator);
        assert!(request.is_complete(&[after]));
        assert!(!request.is_mapping_complete());
    }
}
