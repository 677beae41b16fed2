use anyhow::Result;
use clap::Parser;

use lifemap_cli::commands::{discover_command, evaluate_command, ignore_command, rules_command};
use lifemap_cli::{Commands, Lifemap};

fn main() -> Result<()> {
    // Initialize tracing based on RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Lifemap::parse();
    match cli.command {
        Commands::Evaluate {
            model,
            handlers,
            json,
        } => evaluate_command(&model, &handlers, json),
        Commands::Ignore {
            model,
            execution,
            scope,
        } => ignore_command(&model, &execution, scope),
        Commands::Rules {
            workspace,
            description,
        } => rules_command(workspace, description),
        Commands::Discover {
            model,
            catalog,
            handlers,
        } => discover_command(&model, catalog, &handlers),
    }
}
