//! Config command implementation.

use anyhow::{Context, Result};

use crate::cli::ConfigAction;
use crate::config::Config;

pub fn cmd_config(action: ConfigAction, quiet: bool) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", Config::path().display());
        }
        ConfigAction::Show => {
            let config = Config::load();
            let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            if content.trim().is_empty() {
                if !quiet {
                    eprintln!("No configuration set ({})", Config::path().display());
                }
            } else {
                print!("{}", content);
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load();
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                eprintln!("Set {} = {}", key, value);
            }
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load();
            config.unset(&key)?;
            config.save()?;
            if !quiet {
                eprintln!("Unset {}", key);
            }
        }
    }
    Ok(())
}
