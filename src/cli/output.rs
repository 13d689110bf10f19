use crate::enhancer::{LayoutReport, RunStatus};
use crate::library::LibraryDecision;

use super::options::OutputFormat;

/// Renders the outcome of a run in the requested format
pub fn render_status(status: &RunStatus, format: OutputFormat) -> Result<String, serde_json::Error> {
    match (status, format) {
        (RunStatus::Completed(report), OutputFormat::Json) => serde_json::to_string_pretty(report),
        (RunStatus::Skipped { reason }, OutputFormat::Json) => {
            serde_json::to_string_pretty(&serde_json::json!({ "skipped": reason }))
        }
        (RunStatus::Completed(report), OutputFormat::Text) => Ok(render_text(report)),
        (RunStatus::Skipped { reason }, OutputFormat::Text) => {
            Ok(format!("⚠️  Layout skipped: {reason}\n"))
        }
    }
}

/// Human-readable summary of a layout report
pub fn render_text(report: &LayoutReport) -> String {
    let mut out = String::new();
    let title = if report.dry_run {
        format!("📦 {} (dry run)", report.ear)
    } else {
        format!("📦 {}", report.ear)
    };
    out.push_str(&title);
    out.push('\n');
    out.push_str(&"=".repeat(title.chars().count()));
    out.push('\n');

    match report.shared_module() {
        Some(module) => out.push_str(&format!("Layout: communal ({module})\n")),
        None => out.push_str("Layout: standard\n"),
    }

    out.push_str(&format!("\nModules ({}):\n", report.modules.len()));
    for module in &report.modules {
        out.push_str(&format!("  • {} [{}]\n", module.name, module.kind));
    }

    out.push_str(&format!(
        "\nLibraries: {} shared, {} ear, {} pinned, {} individual\n",
        report.shared(),
        report.forced(),
        report.pinned(),
        report.individual()
    ));
    for action in &report.libraries {
        match &action.decision {
            LibraryDecision::Shared {
                target,
                remove_from,
                ..
            } if !remove_from.is_empty() => {
                out.push_str(&format!(
                    "  ↦ {} -> {} (from {})\n",
                    action.library,
                    target,
                    remove_from.join(", ")
                ));
            }
            LibraryDecision::Forced { remove_from, .. } if !remove_from.is_empty() => {
                out.push_str(&format!(
                    "  ↦ {} -> ear library (from {})\n",
                    action.library,
                    remove_from.join(", ")
                ));
            }
            _ => {}
        }
    }
    for action in report.divergent() {
        out.push_str(&format!("  ⚠️  copies of {} differ in content\n", action.library));
    }

    let verb = if report.dry_run { "planned" } else { "applied" };
    out.push_str(&format!("\n{} file operations {verb}\n", report.operations));

    if !report.manifests.is_empty() {
        let persisted = report.manifests.iter().filter(|m| m.persisted).count();
        out.push_str(&format!(
            "Manifests: {persisted} of {} updated\n",
            report.manifests.len()
        ));
        for failed in report.manifests.iter().filter(|m| m.error.is_some()) {
            out.push_str(&format!(
                "  ❌ {}: {}\n",
                failed.module,
                failed.error.as_deref().unwrap_or_default()
            ));
        }
    }

    if let Some(summary) = &report.classloader_structure {
        out.push_str(&format!(
            "Classloader structure: {} parent, {} dependent added, {} standard added\n",
            summary.shared_module,
            summary.dependent_added.len(),
            summary.standard_added.len()
        ));
    }

    if !report.dry_run {
        out.push_str(&format!("Archives repacked: {}\n", report.repacked));
    }
    out
}
