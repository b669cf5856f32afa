//! Batch command - look up many compounds with progress

use crate::batch::{BatchOptions, BatchResult, CancellationToken};
use crate::cli::args::{BatchArgs, OutputFormat};
use crate::cli::AppContext;
use crate::error::{ChemError, ChemResult};
use crate::ui::{self, BatchProgressBar, UiContext};
use console::style;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Execute the batch command
pub async fn execute(args: BatchArgs, app: &AppContext) -> ChemResult<()> {
    let ctx = UiContext::detect();

    let mut identifiers = args.identifiers.clone();
    if let Some(ref path) = args.file {
        identifiers.extend(read_identifier_file(path).await?);
    }
    if identifiers.is_empty() {
        return Err(ChemError::User(
            "No identifiers given. Pass names/CIDs or --file".to_string(),
        ));
    }

    let defaults = BatchOptions::from_config(&app.config.batch);
    let options = BatchOptions {
        inter_item_delay: args
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.inter_item_delay),
        chunk_size: args.chunk_size.unwrap_or(defaults.chunk_size),
    };
    debug!("Batch options: {:?}", options);

    let service = app.open_service().await?.with_batch_options(options);

    // Ctrl-C stops the batch after the in-flight item
    let token = CancellationToken::new();
    let interrupt = tokio::spawn({
        let token = token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        }
    });

    let bar = BatchProgressBar::new(&ctx, identifiers.len(), args.format.is_machine_readable());
    let result = service
        .run_batch(&identifiers, &token, |progress| bar.update(progress))
        .await;
    bar.finish();
    interrupt.abort();

    match args.format {
        OutputFormat::Table => print_summary(&ctx, &result, identifiers.len()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Plain => print_plain(&result),
    }

    Ok(())
}

/// Read one identifier per line, skipping blank lines and `#` comments
async fn read_identifier_file(path: &Path) -> ChemResult<Vec<String>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ChemError::io(format!("reading identifiers from {}", path.display()), e))?;
    Ok(parse_identifier_lines(&content))
}

fn parse_identifier_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn print_summary(ctx: &UiContext, result: &BatchResult, total: usize) {
    ui::section(ctx, "Batch results");

    for item in &result.success {
        let formula = item.record.property_str("MolecularFormula").unwrap_or("-");
        println!(
            "  {} {:<30} CID {:<10} {}",
            style("✓").green(),
            item.identifier,
            item.record.id,
            formula
        );
    }
    for failure in &result.failed {
        println!(
            "  {} {:<30} {}",
            style("✗").red(),
            failure.identifier,
            style(&failure.error).dim()
        );
    }

    println!();
    let summary = format!(
        "{} succeeded, {} failed ({}/{} processed)",
        result.success.len(),
        result.failed.len(),
        result.total_processed,
        total
    );
    if result.cancelled {
        ui::step_warn_hint(ctx, &summary, "Batch cancelled");
    } else if result.failed.is_empty() {
        ui::step_ok(ctx, &summary);
    } else {
        ui::step_warn(ctx, &summary);
    }
}

fn print_plain(result: &BatchResult) {
    for item in &result.success {
        println!("{}\t{}", item.identifier, item.record.id);
    }
    for failure in &result.failed {
        println!("{}\t{}", failure.identifier, failure.error);
    }
}
