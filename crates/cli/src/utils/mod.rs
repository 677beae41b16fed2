pub mod parser;
pub mod project;

pub use parser::find_execution;
pub use project::ProjectContext;
