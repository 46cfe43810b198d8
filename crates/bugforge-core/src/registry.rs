//! Explicit extension → adapter and extension → modifier registry.
//!
//! A [`Registry`] is built once from a [`RegistryConfig`] and passed to the
//! extraction and mutation entry points. Modifier instances handed out by the
//! registry are always fresh, each with its own generator, so callers can give
//! every worker its own set.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::adapters::{extract_file, ExtractError, LanguageAdapter};
use crate::entity::CodeEntity;
use crate::modifiers::{entries_for, find_entry, CatalogEntry, Modifier};
use crate::parser::SupportedLanguage;

/// Errors raised by registry lookups.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No adapter is registered for the extension
    #[error("No language registered for extension '{0}'")]
    UnknownExtension(String),

    /// A configured or requested modifier name is not in the catalog
    #[error("Unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Per-modifier parameter overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierOverride {
    pub enabled: Option<bool>,
    pub likelihood: Option<f64>,
    pub min_complexity: Option<u32>,
    pub max_complexity: Option<u32>,
    pub max_attempts: Option<u32>,
}

/// Configuration consumed by [`Registry::new`].
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Base seed for every modifier generator
    pub seed: u64,
    /// Likelihood applied to every modifier (per-modifier overrides win)
    pub likelihood: Option<f64>,
    /// Overrides keyed by modifier name
    pub modifier_overrides: BTreeMap<String, ModifierOverride>,
    /// Extra extension → language mappings (extension without the dot)
    pub extension_overrides: BTreeMap<String, SupportedLanguage>,
    pub disabled_languages: BTreeSet<SupportedLanguage>,
    /// Files above this many bytes are skipped
    pub max_file_size: Option<u64>,
}

/// Lookup table from file extensions to adapters and modifiers.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    config: RegistryConfig,
}

impl Registry {
    /// Validate `config` and build the registry.
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        if let Some(unknown) = config
            .modifier_overrides
            .keys()
            .find(|name| find_entry(name).is_none())
        {
            return Err(RegistryError::UnknownModifier(unknown.clone()));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Language handling files with extension `ext` (leading dot optional).
    pub fn language_for(&self, ext: &str) -> Result<SupportedLanguage, RegistryError> {
        let normalized = ext.trim_start_matches('.').to_lowercase();
        let language = self
            .config
            .extension_overrides
            .get(&normalized)
            .copied()
            .or_else(|| SupportedLanguage::from_extension(&normalized))
            .filter(|lang| !self.config.disabled_languages.contains(lang));
        language.ok_or(RegistryError::UnknownExtension(normalized))
    }

    /// Language handling `path`, by its extension.
    pub fn language_for_path(&self, path: &Path) -> Result<SupportedLanguage, RegistryError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.language_for(ext)
    }

    pub fn adapter_for(&self, ext: &str) -> Result<&'static dyn LanguageAdapter, RegistryError> {
        Ok(self.language_for(ext)?.adapter())
    }

    /// Read `path` and extract up to `max_entities` entities (`None` = unlimited).
    pub fn extract(
        &self,
        path: &Path,
        max_entities: Option<usize>,
    ) -> Result<Vec<CodeEntity>, RegistryError> {
        let language = self.language_for_path(path)?;
        let entities = extract_file(
            language.adapter(),
            path,
            max_entities,
            self.config.max_file_size,
        )?;
        Ok(entities)
    }

    /// Fresh instances of every enabled modifier for extension `ext`.
    pub fn modifiers_for(&self, ext: &str) -> Result<Vec<Box<dyn Modifier>>, RegistryError> {
        let language = self.language_for(ext)?;
        Ok(self.build_modifiers(language, &[]))
    }

    /// Fresh modifiers for `path`, seeded from the base seed and the path so
    /// that runs over the same files are reproducible regardless of order.
    pub fn modifiers_for_file(&self, path: &Path) -> Result<Vec<Box<dyn Modifier>>, RegistryError> {
        let language = self.language_for_path(path)?;
        let path_text = path.to_string_lossy();
        Ok(self.build_modifiers(language, path_text.as_bytes()))
    }

    /// Catalog entries enabled for `language`.
    pub fn specs_for(&self, language: SupportedLanguage) -> Vec<&'static CatalogEntry> {
        entries_for(language)
            .filter(|entry| self.is_enabled(entry.spec.name))
            .collect()
    }

    fn is_enabled(&self, name: &str) -> bool {
        self.config
            .modifier_overrides
            .get(name)
            .and_then(|o| o.enabled)
            .unwrap_or(true)
    }

    fn build_modifiers(&self, language: SupportedLanguage, salt: &[u8]) -> Vec<Box<dyn Modifier>> {
        let modifiers: Vec<Box<dyn Modifier>> = self
            .specs_for(language)
            .into_iter()
            .map(|entry| {
                let seed = derive_seed(self.config.seed, &[salt, entry.spec.name.as_bytes()]);
                let mut modifier = entry.build(language, seed);
                self.apply_overrides(modifier.as_mut());
                modifier
            })
            .collect();
        debug!(
            language = %language,
            modifiers = modifiers.len(),
            "Built modifier set"
        );
        modifiers
    }

    fn apply_overrides(&self, modifier: &mut dyn Modifier) {
        let name = modifier.name().to_string();
        let base = modifier.base_mut();
        if let Some(likelihood) = self.config.likelihood {
            base.set_likelihood(likelihood);
        }
        let Some(o) = self.config.modifier_overrides.get(&name) else {
            return;
        };
        if let Some(likelihood) = o.likelihood {
            base.set_likelihood(likelihood);
        }
        base.set_complexity_bounds(o.min_complexity, o.max_complexity);
        if let Some(attempts) = o.max_attempts {
            base.set_max_attempts(attempts);
        }
    }
}

/// Mix `seed` with byte strings (FNV-1a) into a per-instance seed.
pub fn derive_seed(seed: u64, parts: &[&[u8]]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for byte in seed.to_le_bytes().iter().chain(parts.iter().flat_map(|p| p.iter())) {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
