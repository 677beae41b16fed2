use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ExecutionKey;

/// Why an execution or packaging type could not be resolved automatically
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LifecycleMappingRequirement {
    /// No rule maps an execution bound to an interesting phase
    #[serde(rename_all = "camelCase")]
    Execution { key: ExecutionKey, packaging: String },
    /// The execution maps to a handler that is not installed
    #[serde(rename_all = "camelCase")]
    Handler { key: ExecutionKey, handler_id: String },
    /// The packaging type has no usable lifecycle mapping
    #[serde(rename_all = "camelCase")]
    Packaging {
        packaging: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lifecycle_id: Option<String>,
    },
}

impl LifecycleMappingRequirement {
    pub fn execution(key: ExecutionKey, packaging: impl Into<String>) -> Self {
        Self::Execution {
            key,
            packaging: packaging.into(),
        }
    }

    pub fn handler(key: ExecutionKey, handler_id: impl Into<String>) -> Self {
        Self::Handler {
            key,
            handler_id: handler_id.into(),
        }
    }

    pub fn packaging(packaging: impl Into<String>, lifecycle_id: Option<String>) -> Self {
        Self::Packaging {
            packaging: packaging.into(),
            lifecycle_id,
        }
    }

    /// Execution this requirement is about, if any
    pub fn execution_key(&self) -> Option<&ExecutionKey> {
        match self {
            Self::Execution { key, .. } | Self::Handler { key, .. } => Some(key),
            Self::Packaging { .. } => None,
        }
    }
}

impl fmt::Display for LifecycleMappingRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Execution { key, packaging } => {
                write!(f, "execution {key} (packaging {packaging})")
            }
            Self::Handler { key, handler_id } => write!(f, "handler {handler_id} for {key}"),
            Self::Packaging {
                packaging,
                lifecycle_id: Some(id),
            } => write!(f, "packaging {packaging} (lifecycle {id})"),
            Self::Packaging {
                packaging,
                lifecycle_id: None,
            } => write!(f, "packaging {packaging}"),
        }
    }
}
