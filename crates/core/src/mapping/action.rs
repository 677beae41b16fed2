use serde::{Deserialize, Serialize};
use std::fmt;

/// What the tooling should do with a plugin execution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingAction {
    /// Run through an equivalent in-process handler
    #[serde(rename_all = "camelCase")]
    Execute { handler_id: String },
    /// Execute the goal itself, silently
    #[serde(rename_all = "camelCase")]
    ExecuteDirect {
        #[serde(default)]
        run_on_incremental: bool,
    },
    Ignore,
    /// Flag the execution as unresolved
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Warn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl MappingAction {
    pub fn execute(handler_id: impl Into<String>) -> Self {
        MappingAction::Execute {
            handler_id: handler_id.into(),
        }
    }

    pub fn error() -> Self {
        MappingAction::Error { message: None }
    }

    pub fn warn() -> Self {
        MappingAction::Warn { message: None }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MappingAction::Error { .. })
    }

    pub fn is_ignore(&self) -> bool {
        matches!(self, MappingAction::Ignore)
    }

    /// Handler this action delegates to, if any
    pub fn handler_id(&self) -> Option<&str> {
        match self {
            MappingAction::Execute { handler_id } => Some(handler_id),
            _ => None,
        }
    }

    /// User-facing message attached to an error or warning
    pub fn message(&self) -> Option<&str> {
        match self {
            MappingAction::Error { message } | MappingAction::Warn { message } => {
                message.as_deref()
            }
            _ => None,
        }
    }
}

impl fmt::Display for MappingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingAction::Execute { handler_id } => write!(f, "execute({handler_id})"),
            MappingAction::ExecuteDirect { run_on_incremental } => {
                if *run_on_incremental {
                    f.write_str("execute-direct(incremental)")
                } else {
                    f.write_str("execute-direct")
                }
            }
            MappingAction::Ignore => f.write_str("ignore"),
            MappingAction::Error { .. } => f.write_str("error"),
            MappingAction::Warn { .. } => f.write_str("warn"),
        }
    }
}
