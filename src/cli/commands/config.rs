//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::cli::AppContext;
use crate::config::{Config, ConfigManager};
use crate::error::{ChemError, ChemResult};
use crate::ui::{self, UiContext};
use std::str::FromStr;

/// Keys accepted by `config set`
const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "remote.base_url",
    "remote.timeout_secs",
    "remote.max_per_second",
    "cache.ttl_days",
    "cache.max_compounds",
    "batch.inter_item_delay_ms",
    "batch.chunk_size",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, app: &AppContext) -> ChemResult<()> {
    let manager = &app.config_manager;

    match args.action {
        None | Some(ConfigAction::Show) => show_config(&app.config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, &app.config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> ChemResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> ChemResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());

    Ok(())
}

async fn set_value(manager: &ConfigManager, config: &Config, key: &str, value: &str) -> ChemResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    if let Err(e) = apply_value(&mut config, key, value) {
        if let ChemError::User(ref message) = e {
            ui::step_error_detail(&ctx, message, key);
        }
        ui::remark(&ctx, &format!("Valid keys: {}", VALID_KEYS.join(", ")));
        return Err(e);
    }

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply a dot-separated key to a config value
fn apply_value(config: &mut Config, key: &str, value: &str) -> ChemResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => config.general.log_format = parse_log_format(value)?,

        ["remote", "base_url"] => config.remote.base_url = value.trim().to_string(),
        ["remote", "timeout_secs"] => config.remote.timeout_secs = parse_number(value)?,
        ["remote", "max_per_second"] => {
            let rate: u32 = parse_number(value)?;
            if rate == 0 {
                return Err(ChemError::User("max_per_second must be at least 1".to_string()));
            }
            config.remote.max_per_second = rate;
        }

        ["cache", "ttl_days"] => config.cache.ttl_days = parse_number(value)?,
        ["cache", "max_compounds"] => config.cache.max_compounds = parse_number(value)?,

        ["batch", "inter_item_delay_ms"] => config.batch.inter_item_delay_ms = parse_number(value)?,
        ["batch", "chunk_size"] => config.batch.chunk_size = parse_number(value)?,

        _ => return Err(ChemError::User("Unknown config key".to_string())),
    }

    Ok(())
}

fn parse_log_format(value: &str) -> ChemResult<String> {
    match value.to_lowercase().as_str() {
        format @ ("text" | "json") => Ok(format.to_string()),
        _ => Err(ChemError::User(format!(
            "Invalid log format: {}. Use text or json",
            value
        ))),
    }
}

fn parse_number<T: FromStr>(value: &str) -> ChemResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ChemError::User(format!("Invalid number: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_known_keys() {
        let mut config = Config::default();
        apply_value(&mut config, "cache.ttl_days", "3").unwrap();
        apply_value(&mut config, "remote.max_per_second", "2").unwrap();
        apply_value(&mut config, "batch.chunk_size", "50").unwrap();
        apply_value(&mut config, "general.log_format", "JSON").unwrap();

        assert_eq!(config.cache.ttl_days, 3);
        assert_eq!(config.remote.max_per_second, 2);
        assert_eq!(config.batch.chunk_size, 50);
        assert_eq!(config.general.log_format, "json");
    }

    #[test]
    fn reject_bad_values() {
        let mut config = Config::default();
        assert!(apply_value(&mut config, "cache.ttl_days", "soon").is_err());
        assert!(apply_value(&mut config, "remote.max_per_second", "0").is_err());
        assert!(apply_value(&mut config, "general.log_format", "xml").is_err());
        assert!(apply_value(&mut config, "cache.colour", "x").is_err());
    }

    #[test]
    fn valid_keys_are_all_settable() {
        let mut config = Config::default();
        for key in VALID_KEYS {
            let value = match *key {
                "general.log_format" => "text",
                "remote.base_url" => "https://example.org/pug",
                _ => "1",
            };
            apply_value(&mut config, key, value).unwrap();
        }
    }
}
