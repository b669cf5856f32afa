//! chemcache - CLI entry point that dispatches to subcommands.

use chemcache::cli::args::{ConfigAction, ConfigArgs};
use chemcache::cli::{commands, AppContext, Cli, Commands};
use chemcache::config::{Config, ConfigManager};
use chemcache::error::ChemResult;
use chemcache::ui;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ChemResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    // A broken config file must not block the commands that repair it
    let config = match config_manager.load().await {
        Ok(config) => config,
        Err(e) if repairs_config(&cli.command) => {
            eprintln!("{} {}", style("Warning:").yellow(), e);
            Config::default()
        }
        Err(e) => return Err(e),
    };

    init_logging(cli.verbose, &config.general.log_format);
    ui::init_theme();

    let state_dir = cli
        .state_dir
        .clone()
        .unwrap_or_else(ConfigManager::default_state_dir);
    debug!("State directory: {}", state_dir.display());

    let app = AppContext {
        config,
        config_manager,
        state_dir,
        fixture: cli.fixture.clone(),
    };

    match cli.command {
        Commands::Lookup(args) => commands::lookup(args, &app).await,
        Commands::Batch(args) => commands::batch(args, &app).await,
        Commands::Offline(args) => commands::offline(args, &app).await,
        Commands::Cache(args) => commands::cache(args, &app).await,
        Commands::Structures(args) => commands::structures(args, &app).await,
        Commands::Config(args) => commands::config(args, &app).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug. `RUST_LOG` overrides.
fn init_logging(verbose: u8, log_format: &str) {
    let level = match verbose {
        0 => "chemcache=warn",
        1 => "chemcache=info",
        _ => "chemcache=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so JSON output on stdout stays parseable
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}

fn repairs_config(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Config(ConfigArgs {
            action: Some(ConfigAction::Init { .. } | ConfigAction::Path)
        })
    )
}
