//! Bugforge Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.bugforge/config.toml`
//! - Local config: `.bugforge/config.toml` (in workspace)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use bugforge_core::{find_entry, ModifierOverride, RegistryConfig, SupportedLanguage};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Root configuration for Bugforge.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BugforgeConfig {
    /// Entity extraction configuration
    pub extraction: ExtractionConfig,

    /// Mutation configuration
    pub mutation: MutationConfig,

    /// Language routing configuration
    pub languages: LanguagesConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Entity extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum entities per file (unset = unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entities: Option<usize>,

    /// Maximum file size to extract from (in KB)
    pub max_file_size_kb: u64,

    /// File patterns to exclude (glob patterns)
    pub exclude_patterns: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_entities: None,
            max_file_size_kb: 1024, // 1MB default
            exclude_patterns: vec![
                "**/node_modules/**".to_string(),
                "**/target/**".to_string(),
                "**/.git/**".to_string(),
                "**/vendor/**".to_string(),
                "**/__pycache__/**".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
            ],
        }
    }
}

/// Mutation configuration.
///
/// # Example TOML
///
/// ```toml
/// [mutation]
/// seed = 42
/// likelihood = 0.5
/// max_bugs_per_entity = 2
///
/// [mutation.modifiers.func_pm_op_swap]
/// enabled = false
///
/// [mutation.modifiers.func_pm_ctrl_invert_if]
/// likelihood = 1.0
/// min_complexity = 3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MutationConfig {
    /// Base seed for every modifier generator
    pub seed: u64,

    /// Likelihood applied to every modifier (unset = catalog defaults)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<f64>,

    /// Maximum rewrites kept per entity (0 = unlimited)
    pub max_bugs_per_entity: usize,

    /// Per-modifier overrides keyed by modifier name
    pub modifiers: BTreeMap<String, ModifierSettings>,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            likelihood: None,
            max_bugs_per_entity: 0,
            modifiers: BTreeMap::new(),
        }
    }
}

/// Overrides for a single modifier.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ModifierSettings {
    /// Enable or disable the modifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_complexity: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_complexity: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

impl From<&ModifierSettings> for ModifierOverride {
    fn from(settings: &ModifierSettings) -> Self {
        ModifierOverride {
            enabled: settings.enabled,
            likelihood: settings.likelihood,
            min_complexity: settings.min_complexity,
            max_complexity: settings.max_complexity,
            max_attempts: settings.max_attempts,
        }
    }
}

/// Language routing configuration.
///
/// # Example TOML
///
/// ```toml
/// [languages]
/// disabled = ["php"]
///
/// [languages.extensions]
/// pyi = "python"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LanguagesConfig {
    /// Languages excluded from extraction and mutation
    pub disabled: Vec<String>,

    /// Extra extension → language mappings (extension without the dot)
    pub extensions: BTreeMap<String, String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override base seed
    pub seed: Option<u64>,

    /// Override likelihood for every modifier
    pub likelihood: Option<f64>,

    /// Override maximum entities per file
    pub max_entities: Option<usize>,

    /// Override maximum rewrites per entity
    pub max_bugs_per_entity: Option<usize>,

    /// Additional exclude patterns
    pub exclude_patterns: Vec<String>,

    /// Override log level
    pub log_level: Option<String>,
}

impl BugforgeConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(seed) = overrides.seed {
            self.mutation.seed = seed;
        }

        if let Some(likelihood) = overrides.likelihood {
            self.mutation.likelihood = Some(likelihood);
        }

        if let Some(max) = overrides.max_entities {
            self.extraction.max_entities = Some(max);
        }

        if let Some(max) = overrides.max_bugs_per_entity {
            self.mutation.max_bugs_per_entity = max;
        }

        for pattern in &overrides.exclude_patterns {
            if !self.extraction.exclude_patterns.contains(pattern) {
                self.extraction.exclude_patterns.push(pattern.clone());
            }
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    ///
    /// Checks probabilities, complexity bounds, modifier names and language names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(p) = self.mutation.likelihood {
            check_probability("mutation.likelihood", p)?;
        }

        for (name, settings) in &self.mutation.modifiers {
            if find_entry(name).is_none() {
                return Err(ConfigError::invalid_value(
                    format!("mutation.modifiers.{name}"),
                    "unknown modifier",
                ));
            }
            if let Some(p) = settings.likelihood {
                check_probability(&format!("mutation.modifiers.{name}.likelihood"), p)?;
            }
            if let (Some(min), Some(max)) = (settings.min_complexity, settings.max_complexity) {
                if min > max {
                    return Err(ConfigError::invalid_value(
                        format!("mutation.modifiers.{name}"),
                        format!("min_complexity {min} exceeds max_complexity {max}"),
                    ));
                }
            }
        }

        for name in &self.languages.disabled {
            parse_language("languages.disabled", name)?;
        }
        for (ext, name) in &self.languages.extensions {
            parse_language(&format!("languages.extensions.{ext}"), name)?;
        }
        Ok(())
    }

    /// Maximum file size in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.extraction.max_file_size_kb.saturating_mul(1024)
    }

    /// Build the core registry configuration from this config.
    pub fn registry_config(&self) -> Result<RegistryConfig, ConfigError> {
        self.validate()?;

        let modifier_overrides = self
            .mutation
            .modifiers
            .iter()
            .map(|(name, settings)| (name.clone(), ModifierOverride::from(settings)))
            .collect();

        let mut extension_overrides = BTreeMap::new();
        for (ext, name) in &self.languages.extensions {
            let language = parse_language(&format!("languages.extensions.{ext}"), name)?;
            extension_overrides.insert(ext.trim_start_matches('.').to_lowercase(), language);
        }

        let mut disabled_languages = BTreeSet::new();
        for name in &self.languages.disabled {
            disabled_languages.insert(parse_language("languages.disabled", name)?);
        }

        Ok(RegistryConfig {
            seed: self.mutation.seed,
            likelihood: self.mutation.likelihood,
            modifier_overrides,
            extension_overrides,
            disabled_languages,
            max_file_size: Some(self.max_file_size_bytes()),
        })
    }
}

fn check_probability(key: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(
            key,
            format!("{value} is not within [0, 1]"),
        ))
    }
}

fn parse_language(key: &str, name: &str) -> Result<SupportedLanguage, ConfigError> {
    SupportedLanguage::from_name(name)
        .ok_or_else(|| ConfigError::invalid_value(key, format!("unknown language '{name}'")))
}
