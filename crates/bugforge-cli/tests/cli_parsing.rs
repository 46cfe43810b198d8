//! CLI parsing tests for the bugforge command
//!
//! Tests that verify CLI argument parsing and command output work correctly.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PYTHON_SOURCE: &str = "\
def total(xs):
    s = 0
    for x in xs:
        if x > 0:
            s += x
    return s


class Counter(Base):
    def __init__(self):
        self.n = 0

    def bump(self, k):
        self.n = self.n + k
        return self.n
";

/// Get a Command for the bugforge binary, isolated from the user's config
#[allow(deprecated)]
fn bugforge(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bugforge").expect("Failed to find bugforge binary");
    cmd.env("HOME", home)
        .env_remove("BUGFORGE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn python_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("shapes.py"), PYTHON_SOURCE).unwrap();
    temp
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_shows_all_commands() {
    let home = TempDir::new().unwrap();
    bugforge(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("mutate"))
        .stdout(predicate::str::contains("modifiers"))
        .stdout(predicate::str::contains("languages"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    bugforge(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bugforge"));
}

#[test]
fn test_global_options_in_help() {
    let home = TempDir::new().unwrap();
    bugforge(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--quiet"));
}

#[test]
fn test_mutate_help_lists_options() {
    let home = TempDir::new().unwrap();
    bugforge(home.path())
        .args(["mutate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--seed"))
        .stdout(predicate::str::contains("--likelihood"))
        .stdout(predicate::str::contains("--modifier"))
        .stdout(predicate::str::contains("--max-bugs"));
}

// ============================================================================
// Argument Validation Tests
// ============================================================================

#[test]
fn test_unknown_subcommand_fails() {
    let home = TempDir::new().unwrap();
    bugforge(home.path()).arg("frobnicate").assert().failure();
}

#[test]
fn test_likelihood_out_of_range_fails() {
    let home = TempDir::new().unwrap();
    let project = python_project();
    bugforge(home.path())
        .args(["mutate", "--likelihood", "1.5"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0.0 and 1.0"));
}

#[test]
fn test_unknown_modifier_fails() {
    let home = TempDir::new().unwrap();
    let project = python_project();
    bugforge(home.path())
        .args(["mutate", "--modifier", "func_pm_nope"])
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown modifier"));
}

#[test]
fn test_missing_path_fails() {
    let home = TempDir::new().unwrap();
    let project = python_project();
    bugforge(home.path())
        .args(["extract", "-q"])
        .arg(project.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

// ============================================================================
// Command Output Tests
// ============================================================================

#[test]
fn test_extract_json() {
    let home = TempDir::new().unwrap();
    let project = python_project();
    let output = bugforge(home.path())
        .args(["extract", "--json", "-q"])
        .arg(project.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let entities: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = entities
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["total", "Counter", "__init__", "bump"]);
}

#[test]
fn test_mutate_json_is_reproducible() {
    let home = TempDir::new().unwrap();
    let project = python_project();
    let run = || {
        let output = bugforge(home.path())
            .args(["mutate", "--json", "-q", "--seed", "7", "--likelihood", "1.0"])
            .arg(project.path())
            .output()
            .unwrap();
        assert!(output.status.success());
        serde_json::from_slice::<serde_json::Value>(&output.stdout).unwrap()
    };

    let first = run();
    assert_eq!(first, run());

    let bugs = first.as_array().unwrap();
    assert!(!bugs.is_empty());
    for bug in bugs {
        assert!(bug["strategy"].as_str().unwrap().starts_with("func_pm_"));
        assert!(bug["rewrite"].is_string());
        assert_eq!(bug["language"], "python");
    }
}

#[test]
fn test_mutate_single_modifier() {
    let home = TempDir::new().unwrap();
    let project = python_project();
    let output = bugforge(home.path())
        .args(["mutate", "--json", "-q", "-m", "func_pm_remove_loop", "-l", "1"])
        .arg(project.path().join("shapes.py"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let bugs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let bugs = bugs.as_array().unwrap();
    assert_eq!(bugs.len(), 1);
    assert_eq!(bugs[0]["entity"], "total");
    assert!(!bugs[0]["rewrite"].as_str().unwrap().contains("for x in xs"));
}

#[test]
fn test_modifiers_lists_catalog() {
    let home = TempDir::new().unwrap();
    bugforge(home.path())
        .arg("modifiers")
        .assert()
        .success()
        .stdout(predicate::str::contains("func_pm_ctrl_invert_if"))
        .stdout(predicate::str::contains("func_pm_class_rm_base"));
}

#[test]
fn test_modifiers_for_language_without_classes() {
    let home = TempDir::new().unwrap();
    bugforge(home.path())
        .args(["modifiers", "--language", "go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("func_pm_remove_loop"))
        .stdout(predicate::str::contains("func_pm_class_rm_base").not());
}

#[test]
fn test_languages_lists_extensions() {
    let home = TempDir::new().unwrap();
    bugforge(home.path())
        .arg("languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("python"))
        .stdout(predicate::str::contains("rust"));
}

#[test]
fn test_config_file_sets_seed() {
    let home = TempDir::new().unwrap();
    let project = python_project();
    let config = project.path().join("custom.toml");
    fs::write(&config, "[mutation]\nseed = 9\n").unwrap();

    bugforge(home.path())
        .current_dir(project.path())
        .args(["config", "get", "mutation.seed", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("9"));
}

#[test]
fn test_config_init_creates_local_file() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    bugforge(home.path())
        .current_dir(project.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(project.path().join(".bugforge/config.toml").exists());
}
