use anyhow::{Result, bail};
use lifemap_core::{ExecutionKey, ProjectModel};

/// Resolve an execution given on the command line against a project model
///
/// An exact key wins. Without `@phase`/`#id` the text may also name a
/// single execution by plugin coordinates and goal.
pub fn find_execution(model: &ProjectModel, text: &str) -> Result<ExecutionKey> {
    let wanted: ExecutionKey = text
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid execution '{text}': {e}"))?;

    if model.execution(&wanted).is_some() {
        return Ok(wanted);
    }

    let loose = wanted.lifecycle_phase.is_empty() && wanted.execution_id.is_empty();
    let candidates: Vec<&ExecutionKey> = model
        .executions
        .iter()
        .map(|execution| &execution.key)
        .filter(|key| {
            loose
                && key.plugin_coordinates() == wanted.plugin_coordinates()
                && key.version == wanted.version
                && key.goal == wanted.goal
        })
        .collect();

    match candidates.as_slice() {
        [key] => Ok((*key).clone()),
        [] => bail!("{} does not declare execution {}", model.project, text),
        _ => bail!(
            "{} matches {} executions of {}; add @phase or #id",
            text,
            candidates.len(),
            model.project
        ),
    }
}
