use lifemap_core::{
    Diagnostic, LifecycleMappingRequirement, MappingAction, ProjectMappingConfiguration, Resolution,
};

/// Short label for an action, with its icon
pub fn action_label(action: &MappingAction) -> String {
    let icon = match action {
        MappingAction::Execute { .. } | MappingAction::ExecuteDirect { .. } => "▶️ ",
        MappingAction::Ignore => "💤",
        MappingAction::Warn { .. } => "⚠️ ",
        MappingAction::Error { .. } => "❌",
    };
    match action.message() {
        Some(message) => format!("{icon} {action} ({message})"),
        None => format!("{icon} {action}"),
    }
}

fn source_label(resolution: &Resolution) -> String {
    if resolution.is_auto_default {
        format!("{} (default)", resolution.source)
    } else {
        resolution.source.to_string()
    }
}

pub fn print_evaluation(configuration: &ProjectMappingConfiguration) {
    println!("🔍 Project: {} ({})", configuration.project, configuration.packaging);
    println!("{}", "=".repeat(80));

    if configuration.evaluation.resolutions.is_empty() {
        println!("   No plugin executions");
    }
    for (key, resolution) in configuration.evaluation.iter() {
        println!("   {}", key);
        println!(
            "      {}  [{}]",
            action_label(&resolution.action),
            source_label(resolution)
        );
    }

    match &configuration.packaging_resolution.lifecycle_mapping_id {
        Some(id) => println!(
            "\n📦 Packaging {} → lifecycle {} [{}]",
            configuration.packaging, id, configuration.packaging_resolution.source
        ),
        None => println!("\n📦 Packaging {}", configuration.packaging),
    }
}

pub fn print_diagnostics<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) {
    let diagnostics: Vec<_> = diagnostics.into_iter().collect();
    if diagnostics.is_empty() {
        return;
    }
    println!("\n⚠️  Diagnostics:");
    for diagnostic in diagnostics {
        println!("   • {}", diagnostic);
    }
}

pub fn print_requirements<'a>(requirements: impl IntoIterator<Item = &'a LifecycleMappingRequirement>) {
    let requirements: Vec<_> = requirements.into_iter().collect();
    if requirements.is_empty() {
        println!("\n✅ No unresolved requirements");
        return;
    }
    println!("\n🧩 Unresolved requirements:");
    for requirement in requirements {
        println!("   • {}", requirement);
    }
}
