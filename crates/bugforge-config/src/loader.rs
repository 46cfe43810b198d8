//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.bugforge/config.toml`
//! 2. Local config: `.bugforge/config.toml` (in workspace), or an explicit file
//! 3. CLI overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{
    BugforgeConfig, ConfigOverrides, ExtractionConfig, LanguagesConfig, LoggingConfig,
    ModifierSettings, MutationConfig,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".bugforge";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".bugforge";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.bugforge`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<BugforgeConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.bugforge`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a workspace.
    pub fn local_config_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for a workspace with optional CLI overrides.
    ///
    /// Merges config in order: global → local → overrides.
    pub fn load(
        &mut self,
        workspace_root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<BugforgeConfig, ConfigError> {
        let local = self.load_local(workspace_root)?;
        self.load_layered(local, overrides)
    }

    /// Load configuration using an explicit file in place of the local config.
    ///
    /// Merges config in order: global → `path` → overrides. Unlike the local
    /// config, a missing explicit file is an error.
    pub fn load_with_file(
        &mut self,
        path: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<BugforgeConfig, ConfigError> {
        debug!("Loading config from {:?}", path);
        let explicit = load_config_file(path)?;
        self.load_layered(Some(explicit), overrides)
    }

    fn load_layered(
        &mut self,
        local: Option<BugforgeConfig>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<BugforgeConfig, ConfigError> {
        let mut config = BugforgeConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(local_config) = local {
            config = merge_configs(config, local_config);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<BugforgeConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration for a workspace.
    pub fn load_local(&self, workspace_root: &Path) -> Result<Option<BugforgeConfig>, ConfigError> {
        let local_path = self.local_config_path(workspace_root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    /// Save configuration to the local config file for a workspace.
    pub fn save_local(
        &self,
        workspace_root: &Path,
        config: &BugforgeConfig,
    ) -> Result<(), ConfigError> {
        let local_path = self.local_config_path(workspace_root);
        save_config_file(&local_path, config)
    }

    /// Initialize global configuration directory.
    ///
    /// Creates `~/.bugforge/config.toml` with default configuration.
    pub fn init_global(&self) -> Result<PathBuf, ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };
        init_config_dir(global_dir)
    }

    /// Initialize local configuration for a workspace.
    ///
    /// Creates `.bugforge/config.toml` with default configuration.
    pub fn init_local(&self, workspace_root: &Path) -> Result<PathBuf, ConfigError> {
        init_config_dir(&workspace_root.join(LOCAL_CONFIG_DIR))
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_config = None;
    }
}

/// Create `dir/config.toml` with defaults unless it already exists.
fn init_config_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }

    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        save_config_file(&config_path, &BugforgeConfig::default())?;
    }

    Ok(config_path)
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<BugforgeConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &BugforgeConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// This performs a field-by-field merge, allowing partial configs.
fn merge_configs(base: BugforgeConfig, overlay: BugforgeConfig) -> BugforgeConfig {
    BugforgeConfig {
        extraction: merge_extraction(base.extraction, overlay.extraction),
        mutation: merge_mutation(base.mutation, overlay.mutation),
        languages: merge_languages(base.languages, overlay.languages),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

/// Merge extraction config; exclude patterns accumulate.
fn merge_extraction(base: ExtractionConfig, overlay: ExtractionConfig) -> ExtractionConfig {
    ExtractionConfig {
        max_entities: overlay.max_entities.or(base.max_entities),
        max_file_size_kb: if overlay.max_file_size_kb != 1024 {
            overlay.max_file_size_kb
        } else {
            base.max_file_size_kb
        },
        exclude_patterns: {
            let mut patterns = base.exclude_patterns;
            for pattern in overlay.exclude_patterns {
                if !patterns.contains(&pattern) {
                    patterns.push(pattern);
                }
            }
            patterns
        },
    }
}

/// Merge mutation config; per-modifier settings merge field by field.
fn merge_mutation(base: MutationConfig, overlay: MutationConfig) -> MutationConfig {
    MutationConfig {
        seed: if overlay.seed != 42 {
            overlay.seed
        } else {
            base.seed
        },
        likelihood: overlay.likelihood.or(base.likelihood),
        max_bugs_per_entity: if overlay.max_bugs_per_entity != 0 {
            overlay.max_bugs_per_entity
        } else {
            base.max_bugs_per_entity
        },
        modifiers: {
            let mut modifiers = base.modifiers;
            for (name, settings) in overlay.modifiers {
                let merged = match modifiers.remove(&name) {
                    Some(existing) => merge_modifier(existing, settings),
                    None => settings,
                };
                modifiers.insert(name, merged);
            }
            modifiers
        },
    }
}

fn merge_modifier(base: ModifierSettings, overlay: ModifierSettings) -> ModifierSettings {
    ModifierSettings {
        enabled: overlay.enabled.or(base.enabled),
        likelihood: overlay.likelihood.or(base.likelihood),
        min_complexity: overlay.min_complexity.or(base.min_complexity),
        max_complexity: overlay.max_complexity.or(base.max_complexity),
        max_attempts: overlay.max_attempts.or(base.max_attempts),
    }
}

/// Merge language config; disabled sets union, extension maps extend.
fn merge_languages(base: LanguagesConfig, overlay: LanguagesConfig) -> LanguagesConfig {
    LanguagesConfig {
        disabled: {
            let mut disabled = base.disabled;
            for name in overlay.disabled {
                if !disabled.contains(&name) {
                    disabled.push(name);
                }
            }
            disabled
        },
        extensions: {
            let mut extensions = base.extensions;
            extensions.extend(overlay.extensions);
            extensions
        },
    }
}

/// Merge logging config.
fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    LoggingConfig {
        level: if overlay.level != "info" {
            overlay.level
        } else {
            base.level
        },
    }
}
