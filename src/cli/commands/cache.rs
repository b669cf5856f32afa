//! Cache command - inspect or clean the lookup cache

use crate::cache::CacheStats;
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::cli::AppContext;
use crate::error::ChemResult;
use crate::store::Namespace;
use crate::ui::{self, UiContext};
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, app: &AppContext) -> ChemResult<()> {
    let ctx = UiContext::detect();
    let service = app.open_service().await?;

    match args.action {
        CacheAction::Stats { format } => {
            let stats = service.cache_stats().await?;
            match format {
                OutputFormat::Table => print_stats_table(&ctx, &stats, app),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Plain => print_stats_plain(&stats),
            }
        }

        CacheAction::Clear { yes } => {
            let ctx = ctx.with_auto_yes(yes);
            if !ui::confirm(&ctx, "Remove all cached lookup results?", false).await? {
                ui::step_info(&ctx, "Nothing removed (pass --yes to skip the prompt)");
                return Ok(());
            }
            service.clear_cache().await?;
            ui::step_ok(&ctx, "Cleared cached lookups");
        }

        CacheAction::Prune => {
            let removed = service.prune_cache().await?;
            ui::step_ok_detail(
                &ctx,
                &format!("Pruned {} expired entr{}", removed, if removed == 1 { "y" } else { "ies" }),
                &format!("TTL {} days", app.config.cache.ttl_days),
            );
        }
    }

    Ok(())
}

fn print_stats_table(ctx: &UiContext, stats: &CacheStats, app: &AppContext) {
    ui::intro(ctx, "Cache");
    ui::key_value(ctx, "Location", &app.state_dir.display().to_string());
    println!();

    println!("{:<20} {:>8}", style("NAMESPACE").bold(), style("ENTRIES").bold());
    println!("{}", "-".repeat(29));
    for namespace in Namespace::all() {
        let count = stats.count(*namespace);
        let bound = match *namespace {
            Namespace::CompoundById => format!(" / {}", app.config.cache.max_compounds),
            _ => String::new(),
        };
        println!("{:<20} {:>8}{}", namespace.as_str(), count, bound);
    }

    println!();
    println!("Total: {} entries", stats.total());
}

fn print_stats_plain(stats: &CacheStats) {
    for namespace in Namespace::all() {
        println!("{}\t{}", namespace, stats.count(*namespace));
    }
}
