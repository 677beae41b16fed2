use clap::{Parser, Subcommand, ValueEnum};
use lifemap_core::Scope;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lifemap")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug       Enable debug logging\n    LIFEMAP_ROOT=<dir>   Stop the lifemap.json search at <dir>")]
pub struct Lifemap {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the effective mapping of every execution in a project
    #[command(visible_alias = "e")]
    Evaluate {
        /// Path to the project model (JSON)
        model: PathBuf,

        /// Handler ids installed in the host
        #[arg(long = "handler", value_name = "ID")]
        handlers: Vec<String>,

        /// Print the evaluation as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Ignore an execution at a writable scope
    #[command(visible_alias = "i")]
    Ignore {
        /// Path to the project model (JSON)
        model: PathBuf,

        /// Execution as groupId:artifactId:version:goal[@phase][#id]
        execution: String,

        /// Where to record the decision
        #[arg(short, long, value_enum, default_value_t = ScopeArg::Workspace)]
        scope: ScopeArg,
    },
    /// List persisted rules
    Rules {
        /// Show the workspace metadata file (default)
        #[arg(short, long, conflicts_with = "description")]
        workspace: bool,

        /// Show the rules stored in a build description
        #[arg(short, long, value_name = "PATH")]
        description: Option<PathBuf>,
    },
    /// Look up remedies for a project's unresolved requirements
    #[command(visible_alias = "d")]
    Discover {
        /// Path to the project model (JSON)
        model: PathBuf,

        /// JSON catalog of proposals; without it no remedies are available
        #[arg(short, long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Handler ids installed in the host
        #[arg(long = "handler", value_name = "ID")]
        handlers: Vec<String>,
    },
}

/// Scopes a user may write to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// The project's own build description
    Project,
    /// The nearest ancestor declaring the execution
    Parent,
    /// The shared workspace metadata file
    Workspace,
}

impl From<ScopeArg> for Scope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Project => Scope::ProjectLocal,
            ScopeArg::Parent => Scope::InheritedParent,
            ScopeArg::Workspace => Scope::WorkspaceGlobal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Lifemap::command().debug_assert();
    }

    #[test]
    fn test_rules_flags_conflict() {
        let result = Lifemap::try_parse_from(["lifemap", "rules", "--workspace", "--description", "pom.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ignore_scope_parsing() {
        let cli = Lifemap::try_parse_from([
            "lifemap",
            "ignore",
            "model.json",
            "g:a:1:run@compile",
            "--scope",
            "parent",
        ])
        .unwrap();
        match cli.command {
            Commands::Ignore { scope, .. } => assert_eq!(Scope::from(scope), Scope::InheritedParent),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
