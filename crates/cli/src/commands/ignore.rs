use anyhow::{Context, Result};
use lifemap_core::Scope;
use std::path::Path;
use tracing::debug;

use crate::cli::ScopeArg;
use crate::utils::{ProjectContext, find_execution};

pub fn ignore_command(model: &Path, execution: &str, scope: ScopeArg) -> Result<()> {
    let scope = Scope::from(scope);
    debug!("Ignoring {} at {} scope", execution, scope);

    let context = ProjectContext::open(model, &[])?;
    let key = find_execution(&context.model, execution)?;

    let written = context
        .writer()
        .apply_ignore(scope, &key, std::slice::from_ref(&context.model))
        .with_context(|| format!("Failed to ignore {key}"))?;

    if written == 0 {
        println!("ℹ️  {} is already ignored at {} scope", key, scope);
    } else {
        println!("✅ Ignored {} at {} scope", key, scope);
    }
    Ok(())
}
