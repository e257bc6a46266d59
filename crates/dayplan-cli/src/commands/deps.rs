use std::path::PathBuf;

use clap::Subcommand;
use dayplan_core::storage::read_json;
use dayplan_core::{DependencyInfo, DependencyResolver, TaskTemplate};
use serde::Serialize;

#[derive(Subcommand)]
pub enum DepsAction {
    /// Report the dependency status of every template that has one
    Check {
        /// JSON file with an array of task templates
        #[arg(long)]
        templates: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DependencyRow<'a> {
    template_id: &'a str,
    #[serde(flatten)]
    info: &'a DependencyInfo,
}

pub fn run(action: DepsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DepsAction::Check { templates, json } => {
            let templates: Vec<TaskTemplate> = read_json(&templates)?;
            let resolver = DependencyResolver::new(&templates);
            let resolved = resolver.resolve_all();

            if json {
                let rows: Vec<DependencyRow> = resolved
                    .iter()
                    .map(|(template, info)| DependencyRow {
                        template_id: &template.id,
                        info,
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if resolved.is_empty() {
                println!("no dependencies");
            } else {
                for (template, info) in &resolved {
                    println!("{} -> {}: {}", template.id, info.depends_on_id, info.status);
                }
            }
        }
    }
    Ok(())
}
