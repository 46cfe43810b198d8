//! Config command - View and manage configuration
//!
//! Provides commands for inspecting Bugforge configuration:
//! - Show the effective configuration
//! - Get a single value by dotted key
//! - Show configuration file paths
//! - Create default configuration files

use std::path::PathBuf;

use anyhow::{Context, Result};
use bugforge_config::{BugforgeConfig, ConfigLoader, ConfigOverrides};
use clap::Subcommand;
use serde::Serialize;

use super::load_config;
use crate::GlobalOptions;

/// Config management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show(ShowArgs),

    /// Get a specific configuration value
    Get(GetArgs),

    /// Show configuration file paths
    Path(PathArgs),

    /// Create a configuration file with default values
    Init(InitArgs),
}

/// Arguments for the show command
#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Output as JSON instead of TOML
    #[arg(long)]
    json: bool,
}

/// Arguments for the get command
#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Configuration key (e.g., "mutation.seed")
    key: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the path command
#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the init command
#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Create the global config (~/.bugforge/config.toml) instead of local
    #[arg(long)]
    global: bool,
}

/// Configuration paths
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPaths {
    /// Global config file path
    pub global: Option<PathBuf>,
    /// Local config file path
    pub local: PathBuf,
    /// Whether global config exists
    pub global_exists: bool,
    /// Whether local config exists
    pub local_exists: bool,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, global: GlobalOptions) -> Result<()> {
    let workspace = std::env::current_dir().context("Failed to get current directory")?;
    match cmd {
        ConfigCommand::Show(args) => {
            let config = load_config(&global, &workspace, &ConfigOverrides::default())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigCommand::Get(args) => {
            let config = load_config(&global, &workspace, &ConfigOverrides::default())?;
            let value = get_config_value(&config, &args.key)
                .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", args.key))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_value(&value)?;
            }
        }
        ConfigCommand::Path(args) => {
            let paths = config_paths(&ConfigLoader::new(), &workspace);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&paths)?);
            } else {
                let exists = |e: bool| if e { "exists" } else { "not found" };
                match paths.global {
                    Some(ref path) => {
                        println!("Global: {} ({})", path.display(), exists(paths.global_exists))
                    }
                    None => println!("Global: (no home directory)"),
                }
                println!("Local:  {} ({})", paths.local.display(), exists(paths.local_exists));
            }
        }
        ConfigCommand::Init(args) => {
            let loader = ConfigLoader::new();
            let path = if args.global {
                loader.init_global()?
            } else {
                loader.init_local(&workspace)?
            };
            println!("Configuration file: {}", path.display());
        }
    }
    Ok(())
}

fn config_paths(loader: &ConfigLoader, workspace: &std::path::Path) -> ConfigPaths {
    let global = loader.global_config_path();
    let local = loader.local_config_path(workspace);
    ConfigPaths {
        global_exists: global.as_ref().is_some_and(|p| p.exists()),
        local_exists: local.exists(),
        global,
        local,
    }
}

/// Look up a dotted key such as `mutation.seed` in the configuration.
fn get_config_value(config: &BugforgeConfig, key: &str) -> Option<serde_json::Value> {
    let root = serde_json::to_value(config).ok()?;
    key.split('.')
        .try_fold(&root, |value, part| value.get(part))
        .cloned()
}

fn print_value(value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::String(s) => println!("{}", s),
        serde_json::Value::Bool(b) => println!("{}", b),
        serde_json::Value::Number(n) => println!("{}", n),
        serde_json::Value::Null => println!("null"),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}
