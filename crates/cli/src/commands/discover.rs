use anyhow::{Context, Result};
use lifemap_core::{
    CancellationToken, CatalogOracle, DiscoveryOracle, DiscoveryRequest, DiscoveryState,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::display::print_requirements;
use crate::utils::ProjectContext;

pub fn discover_command(model: &Path, catalog: Option<PathBuf>, handlers: &[String]) -> Result<()> {
    let context = ProjectContext::open(model, handlers)?;
    let configuration = context.configuration();

    if configuration.requirements().is_empty() {
        print_requirements(configuration.requirements());
        return Ok(());
    }

    let oracle = catalog
        .map(|path| {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read catalog {}", path.display()))?;
            CatalogOracle::from_json(&contents)
                .with_context(|| format!("Failed to parse catalog {}", path.display()))
        })
        .transpose()?;

    let mut request = DiscoveryRequest::new();
    request.add_configuration(&configuration)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let cancel = CancellationToken::new();
    let report = runtime.block_on(async {
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, cancelling discovery");
                on_interrupt.cancel();
            }
        });
        request
            .discover(oracle.as_ref().map(|o| o as &dyn DiscoveryOracle), cancel)
            .await
    })?;
    debug!("Discovery report: {:?}", report);

    if report.unavailable {
        println!("ℹ️  No catalog given, no remedies available");
    }
    for (requirement, reason) in &report.failed {
        println!("⚠️  Lookup failed for {}: {}", requirement, reason);
    }

    if request.state() == DiscoveryState::Completed {
        let selected = request.auto_complete()?;
        debug!("Auto-selected {} requirement(s)", selected);
    } else {
        println!("⏹️  Discovery cancelled, showing partial results");
    }

    println!("🔎 Discovery for {}", configuration.project);
    println!("{}", "=".repeat(80));
    for requirement in request.requirements() {
        println!("   {}", requirement);
        let proposals = request.proposals(requirement);
        if proposals.is_empty() {
            println!("      no proposals");
        }
        for proposal in proposals {
            let marker = if request.selected(requirement) == Some(proposal) {
                "✅"
            } else {
                "  "
            };
            match &proposal.license {
                Some(license) => println!("      {} {} [{}]", marker, proposal, license),
                None => println!("      {} {}", marker, proposal),
            }
        }
    }

    let unresolved = request.unresolved();
    if unresolved.is_empty() {
        println!("\n✅ Every requirement has a selected remedy");
    } else {
        println!("\n🧩 {} requirement(s) need a manual choice", unresolved.len());
    }
    Ok(())
}
