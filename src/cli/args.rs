//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// chemcache - cached, rate-limited compound lookups
///
/// Looks up chemical compounds by name or CID, keeping results in a local
/// cache so repeated queries never hit the lookup service twice.
#[derive(Parser, Debug)]
#[command(name = "chemcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CHEMCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the persistent cache
    #[arg(long, global = true, env = "CHEMCACHE_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Serve lookups from a JSON fixture instead of PubChem
    #[arg(long, global = true, env = "CHEMCACHE_FIXTURE")]
    pub fixture: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up a single compound by name or CID
    Lookup(LookupArgs),

    /// Look up many compounds with progress reporting
    Batch(BatchArgs),

    /// Show or toggle offline mode
    Offline(OfflineArgs),

    /// Inspect or clean the lookup cache
    Cache(CacheArgs),

    /// Manage saved user structures
    Structures(StructuresArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the lookup command
#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// Compound name or numeric CID
    pub identifier: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the batch command
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// Compound names or CIDs
    pub identifiers: Vec<String>,

    /// Read identifiers from a file (one per line, `#` starts a comment)
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Process in chunks of N identifiers (default: from config)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Pause between items in milliseconds (default: from config)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the offline command
#[derive(Parser, Debug)]
pub struct OfflineArgs {
    /// Subcommand for offline mode
    #[command(subcommand)]
    pub action: Option<OfflineAction>,
}

/// Offline subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfflineAction {
    /// Serve lookups from the cache only
    On,
    /// Allow remote lookups again
    Off,
    /// Show whether offline mode is enabled
    Status,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show entry counts per namespace
    Stats {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove all cached lookup results (saved structures are kept)
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove expired lookup results
    Prune,
}

/// Arguments for the structures command
#[derive(Parser, Debug)]
pub struct StructuresArgs {
    /// Subcommand for structures
    #[command(subcommand)]
    pub action: StructuresAction,
}

/// Structures subcommands
#[derive(Subcommand, Debug)]
pub enum StructuresAction {
    /// List saved structures, newest first
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print a saved structure as JSON
    Show {
        /// Structure name
        name: String,
    },

    /// Save a structure from inline JSON or a file
    #[command(group(clap::ArgGroup::new("source").required(true).args(["json", "file"])))]
    Save {
        /// Structure name
        name: String,

        /// Structure data as a JSON document
        #[arg(long)]
        json: Option<String>,

        /// Read structure data from a JSON file
        #[arg(short = 'i', long)]
        file: Option<PathBuf>,
    },

    /// Delete a saved structure
    Delete {
        /// Structure name
        name: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.ttl_days)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

impl OutputFormat {
    /// Whether stdout must carry only the formatted result
    pub fn is_machine_readable(self) -> bool {
        !matches!(self, Self::Table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_lookup() {
        let cli = Cli::parse_from(["chemcache", "lookup", "aspirin", "--format", "json"]);
        match cli.command {
            Commands::Lookup(args) => {
                assert_eq!(args.identifier, "aspirin");
                assert_eq!(args.format, OutputFormat::Json);
            }
            _ => panic!("expected Lookup command"),
        }
    }

    #[test]
    fn cli_parses_batch() {
        let cli = Cli::parse_from([
            "chemcache",
            "batch",
            "aspirin",
            "2519",
            "--chunk-size",
            "10",
            "--delay-ms",
            "0",
        ]);
        match cli.command {
            Commands::Batch(args) => {
                assert_eq!(args.identifiers, vec!["aspirin", "2519"]);
                assert_eq!(args.chunk_size, Some(10));
                assert_eq!(args.delay_ms, Some(0));
                assert!(args.file.is_none());
            }
            _ => panic!("expected Batch command"),
        }
    }

    #[test]
    fn cli_parses_offline() {
        let cli = Cli::parse_from(["chemcache", "offline", "on"]);
        match cli.command {
            Commands::Offline(args) => assert_eq!(args.action, Some(OfflineAction::On)),
            _ => panic!("expected Offline command"),
        }

        let cli = Cli::parse_from(["chemcache", "offline"]);
        assert!(matches!(cli.command, Commands::Offline(OfflineArgs { action: None })));
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "chemcache",
            "cache",
            "stats",
            "-vv",
            "--state-dir",
            "/tmp/chem",
            "--fixture",
            "fx.json",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/chem")));
        assert_eq!(cli.fixture, Some(PathBuf::from("fx.json")));
    }

    #[test]
    fn structures_save_requires_source() {
        assert!(Cli::try_parse_from(["chemcache", "structures", "save", "ring"]).is_err());
        assert!(Cli::try_parse_from(["chemcache", "structures", "save", "ring", "--json", "{}"]).is_ok());
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["chemcache", "config", "set", "cache.ttl_days", "3"]);
        match cli.command {
            Commands::Config(args) => match args.action {
                Some(ConfigAction::Set { key, value }) => {
                    assert_eq!(key, "cache.ttl_days");
                    assert_eq!(value, "3");
                }
                _ => panic!("expected Set action"),
            },
            _ => panic!("expected Config command"),
        }
    }
}
