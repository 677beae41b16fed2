pub mod formatter;

pub use formatter::{action_label, print_diagnostics, print_evaluation, print_requirements};
