//! Configuration layers a mapping rule can originate from
//!
//! Scopes are ordered by precedence: `ProjectLocal` wins over everything,
//! `BuiltinHeuristic` only applies when no explicit rule matched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The configuration layer a rule comes from, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// Declared in the project's own build description
    ProjectLocal,
    /// Declared in an ancestor build description
    InheritedParent,
    /// The single metadata file shared by every project in the workspace
    WorkspaceGlobal,
    /// Shipped with an installed handler/extension
    ExtensionDefault,
    /// No explicit rule; decided by the phase heuristic
    BuiltinHeuristic,
}

impl Scope {
    /// All scopes in precedence order
    pub const ALL: [Scope; 5] = [
        Scope::ProjectLocal,
        Scope::InheritedParent,
        Scope::WorkspaceGlobal,
        Scope::ExtensionDefault,
        Scope::BuiltinHeuristic,
    ];

    /// Scopes that hold explicit rules
    pub const EXPLICIT: [Scope; 4] = [
        Scope::ProjectLocal,
        Scope::InheritedParent,
        Scope::WorkspaceGlobal,
        Scope::ExtensionDefault,
    ];

    /// Scopes the user can commit ignore decisions into
    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            Scope::ProjectLocal | Scope::InheritedParent | Scope::WorkspaceGlobal
        )
    }

    /// Precedence rank (lower = wins)
    pub fn precedence(&self) -> u32 {
        match self {
            Scope::ProjectLocal => 0,
            Scope::InheritedParent => 1,
            Scope::WorkspaceGlobal => 2,
            Scope::ExtensionDefault => 3,
            Scope::BuiltinHeuristic => 4,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::ProjectLocal => "project",
            Scope::InheritedParent => "parent",
            Scope::WorkspaceGlobal => "workspace",
            Scope::ExtensionDefault => "extension",
            Scope::BuiltinHeuristic => "builtin",
        };
        f.write_str(name)
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "project" | "project-local" => Ok(Scope::ProjectLocal),
            "parent" | "inherited-parent" => Ok(Scope::InheritedParent),
            "workspace" | "workspace-global" => Ok(Scope::WorkspaceGlobal),
            "extension" | "extension-default" => Ok(Scope::ExtensionDefault),
            "builtin" | "builtin-heuristic" => Ok(Scope::BuiltinHeuristic),
            other => Err(Error::Other(format!("Unknown scope '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_precedence_matches_ordering() {
        for pair in Scope::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].precedence() < pair[1].precedence());
        }
    }

    #[test]
    fn test_writable_scopes() {
        assert!(Scope::ProjectLocal.is_writable());
        assert!(Scope::InheritedParent.is_writable());
        assert!(Scope::WorkspaceGlobal.is_writable());
        assert!(!Scope::ExtensionDefault.is_writable());
        assert!(!Scope::BuiltinHeuristic.is_writable());
    }

    #[test]
    fn test_scope_round_trips_through_display() {
        for scope in Scope::ALL {
            assert_eq!(scope.to_string().parse::<Scope>().unwrap(), scope);
        }
        assert_eq!("Workspace-Global".parse::<Scope>().unwrap(), Scope::WorkspaceGlobal);
        assert!("galaxy".parse::<Scope>().is_err());
    }
}
