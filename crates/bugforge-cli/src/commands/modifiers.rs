//! Modifiers command - list the modifier catalog

use anyhow::{Context, Result};
use bugforge_config::ConfigOverrides;
use bugforge_core::{catalog, modifiers::UNBOUNDED, CatalogEntry, SupportedLanguage};
use clap::Args;
use serde::Serialize;

use super::{build_registry, load_config};
use crate::GlobalOptions;

/// Arguments for the modifiers command
#[derive(Args, Debug)]
pub struct ModifiersArgs {
    /// Only show modifiers enabled for this language (name or extension)
    #[arg(long, short = 'l')]
    pub language: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Catalog entry as shown to the user.
#[derive(Debug, Serialize)]
pub struct ModifierInfo {
    pub name: &'static str,
    pub family: String,
    pub likelihood: f64,
    pub min_complexity: u32,
    /// `None` when unbounded
    pub max_complexity: Option<u32>,
    pub max_attempts: u32,
    pub conditions: Vec<&'static str>,
    pub explanation: &'static str,
}

impl From<&CatalogEntry> for ModifierInfo {
    fn from(entry: &CatalogEntry) -> Self {
        let spec = &entry.spec;
        Self {
            name: spec.name,
            family: entry.family.to_string(),
            likelihood: spec.likelihood,
            min_complexity: spec.min_complexity,
            max_complexity: (spec.max_complexity != UNBOUNDED).then_some(spec.max_complexity),
            max_attempts: spec.max_attempts,
            conditions: spec.conditions.iter().map(|c| c.as_str()).collect(),
            explanation: spec.explanation,
        }
    }
}

/// Execute the modifiers command
pub fn execute(args: ModifiersArgs, global: GlobalOptions) -> Result<()> {
    let entries: Vec<&CatalogEntry> = match args.language {
        Some(ref language) => {
            let workspace = std::env::current_dir().context("Failed to get current directory")?;
            let config = load_config(&global, &workspace, &ConfigOverrides::default())?;
            let registry = build_registry(&config)?;
            let language = SupportedLanguage::from_name(language)
                .map(Ok)
                .unwrap_or_else(|| registry.language_for(language))
                .with_context(|| format!("Unknown or disabled language '{language}'"))?;
            registry.specs_for(language)
        }
        None => catalog().iter().collect(),
    };

    let infos: Vec<ModifierInfo> = entries.into_iter().map(ModifierInfo::from).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!(
        "{:<28} {:<13} {:>10} {:>11} {:>8}  CONDITIONS",
        "NAME", "FAMILY", "LIKELIHOOD", "COMPLEXITY", "ATTEMPTS"
    );
    for info in &infos {
        let max = info
            .max_complexity
            .map(|m| m.to_string())
            .unwrap_or_else(|| "∞".to_string());
        println!(
            "{:<28} {:<13} {:>10.2} {:>11} {:>8}  {}",
            info.name,
            info.family,
            info.likelihood,
            format!("{}..{}", info.min_complexity, max),
            info.max_attempts,
            info.conditions.join(", ")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugforge_core::find_entry;

    #[test]
    fn test_info_from_entry() {
        let entry = find_entry("func_pm_remove_loop").unwrap();
        let info = ModifierInfo::from(entry);
        assert_eq!(info.name, "func_pm_remove_loop");
        assert_eq!(info.family, entry.family.to_string());
        assert_eq!(info.max_complexity, None);
        assert_eq!(info.conditions, vec!["IS_FUNCTION", "HAS_LOOP"]);
    }

    #[test]
    fn test_info_serializes_unbounded_as_null() {
        let entry = find_entry("func_pm_remove_loop").unwrap();
        let value = serde_json::to_value(ModifierInfo::from(entry)).unwrap();
        assert!(value["max_complexity"].is_null());
        assert_eq!(value["likelihood"], 0.5);
    }
}
