use anyhow::Result;
use serde_json::json;
use std::path::Path;
use tracing::debug;

use crate::display::{print_diagnostics, print_evaluation, print_requirements};
use crate::utils::ProjectContext;

pub fn evaluate_command(model: &Path, handlers: &[String], as_json: bool) -> Result<()> {
    debug!("Evaluating project model: {:?}", model);

    let context = ProjectContext::open(model, handlers)?;
    let configuration = context.configuration();
    let diagnostics: Vec<_> = context
        .loaded
        .diagnostics
        .iter()
        .chain(&configuration.evaluation.diagnostics)
        .collect();

    if as_json {
        let executions: Vec<_> = configuration
            .evaluation
            .iter()
            .map(|(key, resolution)| {
                json!({
                    "execution": key.to_string(),
                    "action": resolution.action,
                    "source": resolution.source,
                    "autoDefault": resolution.is_auto_default,
                })
            })
            .collect();
        let output = json!({
            "project": configuration.project.id,
            "packaging": configuration.packaging,
            "executions": executions,
            "requirements": configuration.requirements(),
            "diagnostics": diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_evaluation(&configuration);
    print_diagnostics(diagnostics);
    print_requirements(configuration.requirements());
    Ok(())
}
