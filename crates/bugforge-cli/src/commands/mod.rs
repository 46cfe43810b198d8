//! CLI command implementations
//!
//! This module contains all Bugforge CLI command implementations plus the
//! helpers they share: configuration loading and source file discovery.

pub mod config;
pub mod extract;
pub mod languages;
pub mod modifiers;
pub mod mutate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bugforge_config::{BugforgeConfig, ConfigLoader, ConfigOverrides};
use bugforge_core::Registry;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::debug;

use crate::progress;

use crate::GlobalOptions;

/// Directory whose `.bugforge/config.toml` applies to `path`.
pub fn workspace_root(path: &Path) -> PathBuf {
    if path.is_file() {
        path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    } else {
        path.to_path_buf()
    }
}

/// Load configuration: global → local (or `--config` file) → overrides.
pub fn load_config(
    global: &GlobalOptions,
    workspace: &Path,
    overrides: &ConfigOverrides,
) -> Result<BugforgeConfig> {
    let mut loader = ConfigLoader::new();

    if let Some(ref config_path) = global.config {
        return loader
            .load_with_file(config_path, Some(overrides))
            .with_context(|| format!("Failed to load config file {}", config_path.display()));
    }

    loader
        .load(workspace, Some(overrides))
        .context("Failed to load configuration")
}

/// Log level from configuration, falling back to `info` when it cannot be loaded.
pub fn configured_log_level(global: &GlobalOptions) -> String {
    let workspace = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    load_config(global, &workspace, &ConfigOverrides::default())
        .map(|config| config.logging.level)
        .unwrap_or_else(|_| "info".to_string())
}

/// Build the registry described by `config`.
pub fn build_registry(config: &BugforgeConfig) -> Result<Registry> {
    let registry_config = config
        .registry_config()
        .context("Invalid mutation configuration")?;
    Registry::new(registry_config).context("Failed to build modifier registry")
}

/// Source files under `root` that some enabled language handles.
///
/// Respects `.gitignore`, `.bugforgeignore` and the configured exclude
/// patterns. A file `root` is returned as-is when its language is known.
pub fn collect_files(
    root: &Path,
    config: &BugforgeConfig,
    registry: &Registry,
    quiet: bool,
) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        registry
            .language_for_path(root)
            .with_context(|| format!("Unsupported file {}", root.display()))?;
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.exists() {
        anyhow::bail!("Path does not exist: {}", root.display());
    }

    let glob_set = build_exclude_glob_set(&config.extraction.exclude_patterns)?;
    let spinner = progress::spinner("Collecting source files...", quiet);
    let walker = WalkBuilder::new(root)
        .follow_links(false)
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .add_custom_ignore_filename(".bugforgeignore")
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Error walking directory: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        if registry.language_for_path(path).is_err() {
            continue;
        }

        let rel_path = path.strip_prefix(root).unwrap_or(path).to_string_lossy();
        if glob_set.is_match(rel_path.as_ref()) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    // Sort for deterministic ordering
    files.sort();

    if files.is_empty() {
        progress::finish_spinner_warn(
            spinner,
            &format!("No source files found under {}", root.display()),
        );
    } else {
        progress::finish_spinner(spinner, &format!("Found {} source files", files.len()));
    }

    Ok(files)
}

/// Build a glob set from exclude patterns.
pub fn build_exclude_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("Invalid exclude pattern '{pattern}'"))?;
        builder.add(glob);
    }
    builder.build().context("Failed to build exclude patterns")
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
