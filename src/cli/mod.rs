//! Command-line interface

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};

use crate::config::{Config, ConfigManager};
use crate::error::ChemResult;
use crate::remote::{FixtureRemote, PubChemClient, RemoteLookup};
use crate::service::CompoundService;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolved global options shared by every command
pub struct AppContext {
    pub config: Config,
    pub config_manager: ConfigManager,
    pub state_dir: PathBuf,
    pub fixture: Option<PathBuf>,
}

impl AppContext {
    /// Open the compound service over the persistent store
    pub async fn open_service(&self) -> ChemResult<CompoundService> {
        let remote: Arc<dyn RemoteLookup> = match self.fixture {
            Some(ref path) => {
                debug!("Using fixture remote {}", path.display());
                Arc::new(FixtureRemote::load(path).await?)
            }
            None => Arc::new(PubChemClient::from_config(&self.config.remote)),
        };

        CompoundService::open(&self.config, &self.state_dir, remote).await
    }
}
