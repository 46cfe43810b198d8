//! Mutate command - apply procedural modifiers and emit bug rewrites

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use bugforge_config::ConfigOverrides;
use bugforge_core::{find_entry, BugRewrite, CodeEntity, Registry, SupportedLanguage};
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{build_registry, collect_files, load_config, print_info, workspace_root};
use crate::progress;
use crate::GlobalOptions;

/// Arguments for the mutate command
#[derive(Args, Debug)]
pub struct MutateArgs {
    /// File or directory to mutate
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Only run these modifiers (repeatable)
    #[arg(long = "modifier", short = 'm')]
    pub modifiers: Vec<String>,

    /// Base random seed
    #[arg(long, short = 's')]
    pub seed: Option<u64>,

    /// Likelihood applied to every modifier (0.0 to 1.0)
    #[arg(long, short = 'l', value_parser = parse_probability)]
    pub likelihood: Option<f64>,

    /// Maximum rewrites kept per entity (0 = unlimited)
    #[arg(long)]
    pub max_bugs: Option<usize>,

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

/// One bug rewrite together with the entity it was produced from.
#[derive(Debug, Serialize)]
pub struct BugRecord {
    pub file_path: PathBuf,
    pub entity: String,
    pub language: SupportedLanguage,
    pub line_start: usize,
    pub line_end: usize,
    #[serde(flatten)]
    pub bug: BugRewrite,
}

impl BugRecord {
    fn new(entity: &CodeEntity, bug: BugRewrite) -> Self {
        Self {
            file_path: entity.file_path().to_path_buf(),
            entity: entity.name().to_string(),
            language: entity.language(),
            line_start: entity.line_start(),
            line_end: entity.line_end(),
            bug,
        }
    }
}

fn parse_probability(value: &str) -> Result<f64, String> {
    let p: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("{p} is not between 0.0 and 1.0"))
    }
}

/// Execute the mutate command
pub fn execute(args: MutateArgs, global: GlobalOptions) -> Result<()> {
    for name in &args.modifiers {
        if find_entry(name).is_none() {
            bail!("Unknown modifier '{}' (see `bugforge modifiers`)", name);
        }
    }

    let overrides = ConfigOverrides {
        seed: args.seed,
        likelihood: args.likelihood,
        max_entities: args.max_entities,
        max_bugs_per_entity: args.max_bugs,
        exclude_patterns: args.exclude.clone(),
        ..Default::default()
    };
    let config = load_config(&global, &workspace_root(&args.path), &overrides)?;
    let registry = build_registry(&config)?;

    let files = collect_files(&args.path, &config, &registry, global.quiet || args.json)?;
    info!(seed = config.mutation.seed, files = files.len(), "Starting mutation");

    let job = MutationJob {
        registry: &registry,
        only: &args.modifiers,
        max_entities: config.extraction.max_entities,
        max_bugs: config.mutation.max_bugs_per_entity,
    };

    let pb = progress::progress_bar(files.len() as u64, "Mutating", global.quiet);
    let per_file: Vec<Vec<BugRecord>> = files
        .par_iter()
        .map(|file| {
            let records = job.run(file);
            progress::tick(pb.as_ref());
            records
        })
        .collect();
    progress::finish_progress(pb);

    let records: Vec<BugRecord> = per_file.into_iter().flatten().collect();
    info!(bugs = records.len(), "Mutation complete");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    for record in &records {
        print_record(record);
    }
    print_info(
        &format!("{} bug rewrites from {} files", records.len(), files.len()),
        global.quiet,
    );

    Ok(())
}

/// Per-file mutation settings shared across worker threads.
struct MutationJob<'a> {
    registry: &'a Registry,
    only: &'a [String],
    max_entities: Option<usize>,
    max_bugs: usize,
}

impl MutationJob<'_> {
    fn run(&self, file: &Path) -> Vec<BugRecord> {
        let entities = match self.registry.extract(file, self.max_entities) {
            Ok(entities) => entities,
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                return Vec::new();
            }
        };
        let mut modifiers = match self.registry.modifiers_for_file(file) {
            Ok(modifiers) => modifiers,
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                return Vec::new();
            }
        };
        if !self.only.is_empty() {
            modifiers.retain(|m| self.only.iter().any(|name| name == m.name()));
        }

        let mut records = Vec::new();
        for entity in &entities {
            let mut kept = 0;
            for modifier in modifiers.iter_mut() {
                if self.max_bugs > 0 && kept >= self.max_bugs {
                    break;
                }
                if !modifier.can_change(entity) {
                    continue;
                }
                if let Some(bug) = modifier.modify(entity) {
                    debug!(entity = entity.name(), strategy = %bug.strategy, "Produced rewrite");
                    records.push(BugRecord::new(entity, bug));
                    kept += 1;
                }
            }
        }
        records
    }
}

fn print_record(record: &BugRecord) {
    println!(
        "=== {}:{}-{} {} [{}]",
        record.file_path.display(),
        record.line_start,
        record.line_end,
        record.entity,
        record.bug.strategy
    );
    println!("# {}", record.bug.explanation);
    println!("{}", record.bug.rewrite);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugforge_core::RegistryConfig;
    use std::fs;
    use tempfile::TempDir;

    const SOURCE: &str = "def total(xs):\n    s = 0\n    for x in xs:\n        if x > 0:\n            s += x\n    return s\n";

    fn registry(seed: u64) -> Registry {
        Registry::new(RegistryConfig {
            seed,
            likelihood: Some(1.0),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_parse_probability() {
        assert_eq!(parse_probability("0.25"), Ok(0.25));
        assert_eq!(parse_probability("1"), Ok(1.0));
        assert!(parse_probability("1.5").is_err());
        assert!(parse_probability("-0.1").is_err());
        assert!(parse_probability("abc").is_err());
    }

    #[test]
    fn test_job_is_reproducible() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("total.py");
        fs::write(&file, SOURCE).unwrap();

        let registry = registry(42);
        let job = MutationJob {
            registry: &registry,
            only: &[],
            max_entities: None,
            max_bugs: 0,
        };
        let first = job.run(&file);
        let second = job.run(&file);

        assert!(!first.is_empty());
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.bug, b.bug);
        }
        for record in &first {
            assert_eq!(record.entity, "total");
            assert_ne!(record.bug.rewrite, SOURCE.trim_end());
        }
    }

    #[test]
    fn test_job_filters_and_caps() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("total.py");
        fs::write(&file, SOURCE).unwrap();

        let registry = registry(7);
        let only = vec!["func_pm_remove_loop".to_string()];
        let job = MutationJob {
            registry: &registry,
            only: &only,
            max_entities: None,
            max_bugs: 0,
        };
        let records = job.run(&file);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bug.strategy, "func_pm_remove_loop");

        let capped = MutationJob {
            registry: &registry,
            only: &[],
            max_entities: None,
            max_bugs: 1,
        };
        assert!(capped.run(&file).len() <= 1);
    }

    #[test]
    fn test_record_json_is_flat() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("total.py");
        fs::write(&file, SOURCE).unwrap();

        let registry = registry(1);
        let entities = registry.extract(&file, None).unwrap();
        let record = BugRecord::new(&entities[0], BugRewrite::new("x", "why", "func_pm_op_flip"));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["entity"], "total");
        assert_eq!(value["language"], "python");
        assert_eq!(value["strategy"], "func_pm_op_flip");
        assert_eq!(value["rewrite"], "x");
        assert_eq!(value["line_start"], 1);
    }
}
