//! Extract command - list functions, methods and classes

use std::path::PathBuf;

use anyhow::Result;
use bugforge_config::ConfigOverrides;
use bugforge_core::{CodeEntity, EntityKind};
use clap::Args;
use rayon::prelude::*;
use tracing::{info, warn};

use super::{build_registry, collect_files, load_config, print_info, workspace_root};
use crate::progress;
use crate::GlobalOptions;

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// File or directory to extract from
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Maximum number of entities per file
    #[arg(long, short = 'n')]
    pub max_entities: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Additional exclude patterns (glob, relative to the path)
    #[arg(long, short = 'e')]
    pub exclude: Vec<String>,
}

/// Execute the extract command
pub fn execute(args: ExtractArgs, global: GlobalOptions) -> Result<()> {
    let overrides = ConfigOverrides {
        max_entities: args.max_entities,
        exclude_patterns: args.exclude.clone(),
        ..Default::default()
    };
    let config = load_config(&global, &workspace_root(&args.path), &overrides)?;
    let registry = build_registry(&config)?;

    let files = collect_files(&args.path, &config, &registry, global.quiet || args.json)?;

    let pb = progress::progress_bar(files.len() as u64, "Extracting", global.quiet);
    let per_file: Vec<Vec<CodeEntity>> = files
        .par_iter()
        .map(|file| {
            let entities = registry
                .extract(file, config.extraction.max_entities)
                .unwrap_or_else(|e| {
                    warn!("Skipping {}: {}", file.display(), e);
                    Vec::new()
                });
            progress::tick(pb.as_ref());
            entities
        })
        .collect();
    progress::finish_progress(pb);

    let entities: Vec<CodeEntity> = per_file.into_iter().flatten().collect();
    info!(files = files.len(), entities = entities.len(), "Extraction complete");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entities)?);
        return Ok(());
    }

    for entity in &entities {
        println!("{}", format_entity(entity));
    }
    print_info(
        &format!("{} entities in {} files", entities.len(), files.len()),
        global.quiet,
    );

    Ok(())
}

fn format_entity(entity: &CodeEntity) -> String {
    let tags: Vec<&str> = entity.tags().iter().map(|t| t.as_str()).collect();
    format!(
        "{}:{}-{}  {:<8} {}  (complexity {})  [{}]",
        entity.file_path().display(),
        entity.line_start(),
        entity.line_end(),
        kind_label(entity.kind()),
        entity.name(),
        entity.complexity(),
        tags.join(", ")
    )
}

fn kind_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Function => "function",
        EntityKind::Class => "class",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugforge_core::Registry;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_entity_line() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("loop.py");
        fs::write(&file, "def total(xs):\n    s = 0\n    for x in xs:\n        s += x\n    return s\n")
            .unwrap();

        let registry = Registry::default();
        let entities = registry.extract(&file, None).unwrap();
        assert_eq!(entities.len(), 1);

        let line = format_entity(&entities[0]);
        assert!(line.contains("loop.py:1-5"));
        assert!(line.contains("function total"));
        assert!(line.contains("(complexity 2)"));
        assert!(line.contains("HAS_LOOP"));
    }
}
