pub mod discover;
pub mod evaluate;
pub mod ignore;
pub mod rules;

pub use discover::discover_command;
pub use evaluate::evaluate_command;
pub use ignore::ignore_command;
pub use rules::rules_command;
