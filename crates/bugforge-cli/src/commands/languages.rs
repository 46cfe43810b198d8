//! Languages command - list supported languages

use anyhow::{Context, Result};
use bugforge_config::ConfigOverrides;
use bugforge_core::{Registry, SupportedLanguage};
use clap::Args;
use serde::Serialize;

use super::{build_registry, load_config};
use crate::GlobalOptions;

/// Arguments for the languages command
#[derive(Args, Debug)]
pub struct LanguagesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct LanguageInfo {
    name: SupportedLanguage,
    extensions: Vec<String>,
    classes: bool,
    enabled: bool,
    modifiers: usize,
}

fn describe(registry: &Registry) -> Vec<LanguageInfo> {
    let config = registry.config();
    SupportedLanguage::ALL
        .into_iter()
        .map(|language| {
            let mut extensions: Vec<String> =
                language.extensions().iter().map(|e| e.to_string()).collect();
            for (ext, target) in &config.extension_overrides {
                if *target == language && !extensions.contains(ext) {
                    extensions.push(ext.clone());
                }
            }
            let enabled = !config.disabled_languages.contains(&language);
            LanguageInfo {
                name: language,
                extensions,
                classes: language.has_classes(),
                enabled,
                modifiers: if enabled { registry.specs_for(language).len() } else { 0 },
            }
        })
        .collect()
}

/// Execute the languages command
pub fn execute(args: LanguagesArgs, global: GlobalOptions) -> Result<()> {
    let workspace = std::env::current_dir().context("Failed to get current directory")?;
    let config = load_config(&global, &workspace, &ConfigOverrides::default())?;
    let registry = build_registry(&config)?;
    let infos = describe(&registry);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("{:<12} {:<8} {:<9} {:<9} EXTENSIONS", "LANGUAGE", "CLASSES", "MODIFIERS", "STATUS");
    for info in &infos {
        println!(
            "{:<12} {:<8} {:<9} {:<9} {}",
            info.name.as_str(),
            if info.classes { "yes" } else { "no" },
            info.modifiers,
            if info.enabled { "enabled" } else { "disabled" },
            info.extensions.join(", ")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugforge_core::RegistryConfig;

    #[test]
    fn test_describe_all_languages() {
        let infos = describe(&Registry::default());
        assert_eq!(infos.len(), SupportedLanguage::ALL.len());
        assert!(infos.iter().all(|i| i.enabled && i.modifiers > 0));

        let python = infos
            .iter()
            .find(|i| i.name == SupportedLanguage::Python)
            .unwrap();
        assert_eq!(python.extensions, vec!["py"]);
        assert!(python.classes);
    }

    #[test]
    fn test_describe_reflects_config() {
        let mut config = RegistryConfig::default();
        config.disabled_languages.insert(SupportedLanguage::Ruby);
        config
            .extension_overrides
            .insert("pyi".to_string(), SupportedLanguage::Python);
        let infos = describe(&Registry::new(config).unwrap());

        let ruby = infos.iter().find(|i| i.name == SupportedLanguage::Ruby).unwrap();
        assert!(!ruby.enabled);
        assert_eq!(ruby.modifiers, 0);

        let python = infos
            .iter()
            .find(|i| i.name == SupportedLanguage::Python)
            .unwrap();
        assert!(python.extensions.contains(&"pyi".to_string()));
    }
}
