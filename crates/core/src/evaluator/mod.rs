//! Resolution evaluator
//!
//! Turns the rules of a [`MappingMetadataStore`] into one effective action
//! per execution. Evaluation is pure and never fails for per-execution
//! problems; those are returned as [`Diagnostic`]s next to the results.

pub mod project;

pub use project::ProjectMappingConfiguration;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::mapping::{MappingAction, MappingMetadataStore, Scope};
use crate::types::ExecutionKey;

/// Phases of the default build lifecycle where an unmapped execution is an error
pub const DEFAULT_INTERESTING_PHASES: &[&str] = &[
    "generate-sources",
    "process-sources",
    "generate-resources",
    "process-resources",
    "compile",
    "process-classes",
    "generate-test-sources",
    "process-test-sources",
    "generate-test-resources",
    "process-test-resources",
    "test-compile",
    "process-test-classes",
];

/// Packaging types that build without an explicit lifecycle mapping
pub const DEFAULT_BUILTIN_PACKAGINGS: &[&str] =
    &["pom", "jar", "war", "ejb", "ear", "rar", "maven-plugin"];

/// Effective decision for one execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: MappingAction,
    pub source: Scope,
    /// No explicit rule matched; the phase heuristic decided
    pub is_auto_default: bool,
    /// Number of explicit rules that matched
    pub matched: usize,
}

impl Resolution {
    pub fn is_error(&self) -> bool {
        self.action.is_error()
    }

    pub fn is_ignored(&self) -> bool {
        self.action.is_ignore()
    }
}

/// Non-fatal problem found while evaluating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A rule could not be evaluated and was treated as non-matching
    MalformedRule {
        scope: Scope,
        filter: String,
        reason: String,
    },
    /// Equally specific rules in one scope disagree; the first one won
    ConflictingRules {
        key: ExecutionKey,
        scope: Scope,
        actions: Vec<MappingAction>,
    },
    /// A persisted rule source could not be read
    UnreadableSource { source: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedRule {
                scope,
                filter,
                reason,
            } => write!(f, "Skipped malformed {scope} rule {filter}: {reason}"),
            Diagnostic::ConflictingRules {
                key,
                scope,
                actions,
            } => {
                let actions: Vec<String> = actions.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "Conflicting {scope} rules for {key}: {}",
                    actions.join(", ")
                )
            }
            Diagnostic::UnreadableSource { source, reason } => {
                write!(f, "Could not read {source}: {reason}")
            }
        }
    }
}

/// Results of evaluating a set of executions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub resolutions: BTreeMap<ExecutionKey, Resolution>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Evaluation {
    pub fn get(&self, key: &ExecutionKey) -> Option<&Resolution> {
        self.resolutions.get(key)
    }

    pub fn is_error_mapping(&self, key: &ExecutionKey) -> bool {
        self.get(key).is_some_and(Resolution::is_error)
    }

    pub fn is_ignore_mapping(&self, key: &ExecutionKey) -> bool {
        self.get(key).is_some_and(Resolution::is_ignored)
    }

    pub fn errors(&self) -> impl Iterator<Item = (&ExecutionKey, &Resolution)> {
        self.resolutions.iter().filter(|(_, r)| r.is_error())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExecutionKey, &Resolution)> {
        self.resolutions.iter()
    }

    fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }
}

/// Computes effective resolutions against a metadata store
#[derive(Debug, Clone)]
pub struct Evaluator {
    interesting_phases: BTreeSet<String>,
    builtin_packagings: BTreeSet<String>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            interesting_phases: DEFAULT_INTERESTING_PHASES.iter().map(|p| p.to_string()).collect(),
            builtin_packagings: DEFAULT_BUILTIN_PACKAGINGS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list of interesting phases
    pub fn with_interesting_phases<I, S>(mut self, phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interesting_phases = phases.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the list of packagings that need no lifecycle mapping
    pub fn with_builtin_packagings<I, S>(mut self, packagings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builtin_packagings = packagings.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_interesting_phase(&self, phase: &str) -> bool {
        self.interesting_phases.contains(phase)
    }

    pub fn is_builtin_packaging(&self, packaging: &str) -> bool {
        self.builtin_packagings.contains(packaging)
    }

    /// Resolution when no explicit rule matched
    pub fn heuristic(&self, key: &ExecutionKey) -> Resolution {
        let action = if self.is_interesting_phase(&key.lifecycle_phase) {
            MappingAction::error()
        } else {
            MappingAction::Ignore
        };
        Resolution {
            action,
            source: Scope::BuiltinHeuristic,
            is_auto_default: true,
            matched: 0,
        }
    }

    /// Evaluate every execution against the store
    pub fn evaluate(&self, executions: &[ExecutionKey], store: &MappingMetadataStore) -> Evaluation {
        let mut evaluation = Evaluation::default();

        for key in executions {
            if evaluation.resolutions.contains_key(key) {
                continue;
            }
            let resolution = self.resolve_into(key, store, &mut evaluation);
            evaluation.resolutions.insert(key.clone(), resolution);
        }

        tracing::debug!(
            "Evaluated {} execution(s), {} error(s), {} diagnostic(s)",
            evaluation.resolutions.len(),
            evaluation.errors().count(),
            evaluation.diagnostics.len()
        );
        evaluation
    }

    fn resolve_into(
        &self,
        key: &ExecutionKey,
        store: &MappingMetadataStore,
        evaluation: &mut Evaluation,
    ) -> Resolution {
        let matches = store.matching_rules(key);

        for skipped in &matches.skipped {
            evaluation.push_diagnostic(Diagnostic::MalformedRule {
                scope: skipped.rule.provenance,
                filter: skipped.rule.filter.to_string(),
                reason: skipped.reason.clone(),
            });
        }

        let Some(best) = matches.rules.first() else {
            let resolution = self.heuristic(key);
            tracing::debug!("No rule for {}, defaulting to {}", key, resolution.action);
            return resolution;
        };

        let rivals: Vec<MappingAction> = matches
            .rules
            .iter()
            .filter(|rule| {
                rule.provenance == best.provenance
                    && rule.filter.specificity() == best.filter.specificity()
            })
            .map(|rule| rule.action.clone())
            .collect();
        if rivals.iter().any(|action| action != &best.action) {
            tracing::warn!("Conflicting {} rules for {}", best.provenance, key);
            evaluation.push_diagnostic(Diagnostic::ConflictingRules {
                key: key.clone(),
                scope: best.provenance,
                actions: rivals,
            });
        }

        Resolution {
            action: best.action.clone(),
            source: best.provenance,
            is_auto_default: false,
            matched: matches.rules.len(),
        }
    }
}

/// Classify a resolution as an error
pub fn is_error(resolution: &Resolution) -> bool {
    resolution.is_error()
}

/// Classify a resolution as ignored
pub fn is_ignored(resolution: &Resolution) -> bool {
    resolution.is_ignored()
}
