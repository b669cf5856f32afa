//! Lookup command - resolve a single compound

use crate::cli::args::{LookupArgs, OutputFormat};
use crate::cli::AppContext;
use crate::compound::CompoundRecord;
use crate::error::{ChemError, ChemResult};
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the lookup command
pub async fn execute(args: LookupArgs, app: &AppContext) -> ChemResult<()> {
    let ctx = UiContext::detect();
    let service = app.open_service().await?;

    let record = if args.format.is_machine_readable() {
        service.lookup(&args.identifier).await?
    } else {
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start(&format!("Looking up {}...", args.identifier));
        match service.lookup(&args.identifier).await {
            Ok(record) => {
                spinner.clear();
                record
            }
            Err(e) => {
                spinner.stop_error("Lookup failed");
                return Err(e);
            }
        }
    };

    let record = record.ok_or_else(|| {
        ChemError::User(format!("No compound found for '{}'", args.identifier.trim()))
    })?;

    match args.format {
        OutputFormat::Table => print_record(&ctx, &record),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Plain => println!("{}", record.id),
    }

    Ok(())
}

fn print_record(ctx: &UiContext, record: &CompoundRecord) {
    ui::section(ctx, &format!("CID {}", record.id));
    for (key, value) in &record.properties {
        let text = match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        };
        ui::key_value(ctx, key, &text);
    }
}
