//! Structures command - manage saved user structures

use crate::cli::args::{OutputFormat, StructuresAction, StructuresArgs};
use crate::cli::AppContext;
use crate::error::{ChemError, ChemResult};
use crate::service::SavedStructure;
use crate::ui::{self, UiContext};
use console::style;
use serde_json::Value;
use tokio::fs;

/// Execute the structures command
pub async fn execute(args: StructuresArgs, app: &AppContext) -> ChemResult<()> {
    let ctx = UiContext::detect();
    let service = app.open_service().await?;

    match args.action {
        StructuresAction::List { format } => {
            let structures = service.list_structures().await?;
            if structures.is_empty() {
                match format {
                    OutputFormat::Json => println!("[]"),
                    OutputFormat::Plain => {}
                    OutputFormat::Table => ui::step_info(&ctx, "No saved structures"),
                }
                return Ok(());
            }

            match format {
                OutputFormat::Table => print_table(&structures),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&structures)?),
                OutputFormat::Plain => {
                    for structure in &structures {
                        println!("{}", structure.key);
                    }
                }
            }
        }

        StructuresAction::Show { name } => {
            let structure = service.load_structure(&name).await?;
            println!("{}", serde_json::to_string_pretty(&structure.value)?);
        }

        StructuresAction::Save { name, json, file } => {
            let raw = match (json, file) {
                (Some(json), _) => json,
                (None, Some(path)) => fs::read_to_string(&path)
                    .await
                    .map_err(|e| ChemError::io(format!("reading {}", path.display()), e))?,
                (None, None) => {
                    return Err(ChemError::User("Pass --json or --file".to_string()));
                }
            };
            let data: Value = serde_json::from_str(&raw)
                .map_err(|e| ChemError::User(format!("Structure data is not valid JSON: {}", e)))?;

            service.save_structure(&name, data).await?;
            ui::step_ok(&ctx, &format!("Saved structure {}", name.trim()));
        }

        StructuresAction::Delete { name, yes } => {
            let ctx = ctx.with_auto_yes(yes);
            let prompt = format!("Delete structure {}?", name.trim());
            if !ui::confirm(&ctx, &prompt, false).await? {
                ui::step_info(&ctx, "Nothing deleted (pass --yes to skip the prompt)");
                return Ok(());
            }
            service.delete_structure(&name).await?;
            ui::step_ok(&ctx, &format!("Deleted structure {}", name.trim()));
        }
    }

    Ok(())
}

fn print_table(structures: &[SavedStructure]) {
    println!("{:<30} {:<20}", style("NAME").bold(), style("SAVED").bold());
    println!("{}", "-".repeat(51));

    for structure in structures {
        let saved = structure.stored_at.format("%Y-%m-%d %H:%M").to_string();
        println!("{:<30} {:<20}", structure.key, saved);
    }

    println!();
    println!("{} structure(s)", structures.len());
}
