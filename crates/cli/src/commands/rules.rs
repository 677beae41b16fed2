use anyhow::{Context, Result};
use lifemap_core::{MetadataBackend, RuleSource, Scope, Settings};
use std::path::PathBuf;
use tracing::debug;

pub fn rules_command(workspace: bool, description: Option<PathBuf>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd).context("Failed to load lifemap.json")?;
    let backend = settings.backend();

    let (source, scope) = match (workspace, description) {
        (false, Some(path)) => (RuleSource::Description(path), Scope::ProjectLocal),
        // --workspace, or no flag at all
        (true, _) | (false, None) => (RuleSource::Workspace, Scope::WorkspaceGlobal),
    };
    debug!("Listing rules from {}", source);

    let Some(document) = backend
        .read(&source)
        .with_context(|| format!("Failed to read {source}"))?
    else {
        println!("ℹ️  No rules in {}", source);
        return Ok(());
    };

    println!("📋 Rules in {}", source);
    println!("{}", "=".repeat(80));
    for rule in document.rules(scope) {
        println!("   • {} → {}", rule.filter, rule.action);
    }
    for packaging in &document.packagings {
        println!(
            "   📦 {} → lifecycle {}",
            packaging.packaging, packaging.lifecycle_mapping_id
        );
    }
    if document.is_empty() {
        println!("   (empty)");
    }
    Ok(())
}
