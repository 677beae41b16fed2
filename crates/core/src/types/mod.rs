pub mod execution_key;
pub mod project;

// Re-export commonly used types
pub use execution_key::ExecutionKey;
pub use project::{BuildModelReader, JsonModelReader, PluginExecution, ProjectModel, ProjectRef};
