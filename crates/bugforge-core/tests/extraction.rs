//! Extraction tests across every supported language.
//!
//! These tests validate the properties every extracted entity must satisfy:
//! - Signatures are a prefix of the entity source (modulo whitespace)
//! - Stubs of top-level entities re-parse without syntax errors
//! - Line bounds and complexity are sane
//! - File-level policies (size limit, undecodable content, entity bound)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package bugforge-core --test extraction
//! ```

mod common;

use std::fs;

use bugforge_core::{
    extract_file, CodeParser, CodeProperty, EntityKind, ExtractError, Registry, RegistryConfig,
    SupportedLanguage, TODO_CLASS, TODO_FUNCTION,
};
use common::{entities, entity_named, write_tree, FIXTURES};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

// ============================================================================
// Per-entity Properties
// ============================================================================

#[test]
fn test_every_fixture_yields_entities() {
    for (language, file, source) in FIXTURES {
        let found = entities(*language, file, source);
        assert!(!found.is_empty(), "{language}: no entities in {file}");
        for entity in &found {
            assert_eq!(entity.language(), *language);
            assert_eq!(entity.file_path().to_str(), Some(*file));
        }
    }
}

#[test]
fn test_signature_is_prefix_of_source() {
    for (language, file, source) in FIXTURES {
        for entity in entities(*language, file, source) {
            assert!(
                squash(entity.src_code()).starts_with(&squash(entity.signature())),
                "{language} {}: signature {:?} does not prefix source",
                entity.name(),
                entity.signature()
            );
        }
    }
}

#[test]
fn test_kind_tags_and_complexity() {
    for (language, file, source) in FIXTURES {
        for entity in entities(*language, file, source) {
            assert!(entity.complexity() >= 1);
            match entity.kind() {
                EntityKind::Function => {
                    assert!(entity.has_tag(CodeProperty::IsFunction));
                    assert!(!entity.has_tag(CodeProperty::IsClass));
                    assert!(entity.stub().contains(TODO_FUNCTION), "{language} {}", entity.name());
                }
                EntityKind::Class => {
                    assert!(entity.has_tag(CodeProperty::IsClass));
                    assert!(!entity.has_tag(CodeProperty::IsFunction));
                    assert!(entity.stub().contains(TODO_CLASS), "{language} {}", entity.name());
                }
            }
        }
    }
}

#[test]
fn test_line_bounds_match_source() {
    for (language, file, source) in FIXTURES {
        let total_lines = source.lines().count();
        for entity in entities(*language, file, source) {
            assert!(entity.line_start() >= 1);
            assert!(entity.line_start() <= entity.line_end());
            assert!(entity.line_end() <= total_lines);
            assert_eq!(
                entity.src_code().lines().count(),
                entity.line_end() - entity.line_start() + 1,
                "{language} {}",
                entity.name()
            );
        }
    }
}

#[test]
fn test_top_level_stubs_parse_cleanly() {
    for (language, file, source) in FIXTURES {
        let mut parser = CodeParser::new(*language).expect("parser");
        for entity in entities(*language, file, source) {
            if entity.indent_level() != 0 {
                continue;
            }
            let stub = if *language == SupportedLanguage::Php {
                format!("<?php\n{}\n", entity.stub())
            } else {
                format!("{}\n", entity.stub())
            };
            let tree = parser.parse(&stub).expect("parse stub");
            assert!(
                !tree.root_node().has_error(),
                "{language} {}: stub does not parse:\n{stub}",
                entity.name()
            );
        }
    }
}

#[test]
fn test_entity_serializes_without_tree() {
    let entity = entity_named(
        SupportedLanguage::Python,
        "shapes.py",
        FIXTURES[0].2,
        "total",
    );
    let value = serde_json::to_value(&entity).unwrap();
    assert_eq!(value["name"], "total");
    assert_eq!(value["kind"], "function");
    assert_eq!(value["language"], "python");
    assert!(value["tags"]
        .as_array()
        .unwrap()
        .iter()
        .any(|t| t == "HAS_LOOP"));
    assert!(value.get("handle").is_none());
}

// ============================================================================
// Naming and Tags
// ============================================================================

#[test]
fn test_qualified_method_names() {
    let names = |language: SupportedLanguage| -> Vec<String> {
        let (_, file, source) = FIXTURES
            .iter()
            .find(|(lang, _, _)| *lang == language)
            .unwrap();
        entities(language, file, source)
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    };

    assert_eq!(
        names(SupportedLanguage::Python),
        vec!["Circle", "__init__", "area", "total"]
    );
    assert_eq!(names(SupportedLanguage::Rust), vec!["Circle::area", "total"]);
    assert_eq!(names(SupportedLanguage::Go), vec!["Circle.Area", "Total"]);
    assert!(names(SupportedLanguage::JavaScript).contains(&"double".to_string()));
    assert!(names(SupportedLanguage::Ruby).contains(&"Circle".to_string()));
}

#[test]
fn test_python_fixture_tags() {
    let source = FIXTURES[0].2;
    let circle = entity_named(SupportedLanguage::Python, "shapes.py", source, "Circle");
    assert!(circle.has_tag(CodeProperty::HasParent));
    assert_eq!(circle.signature(), "class Circle(Shape)");

    let area = entity_named(SupportedLanguage::Python, "shapes.py", source, "area");
    assert!(area.has_tag(CodeProperty::HasIfElse));
    assert!(area.has_tag(CodeProperty::HasException));
    assert!(area.has_tag(CodeProperty::HasOffByOne));
    assert_eq!(area.indent_level(), 1);
    assert!(area.src_code().starts_with("def area(self):\n    if self.r < 0:"));

    let total = entity_named(SupportedLanguage::Python, "shapes.py", source, "total");
    assert!(total.has_tag(CodeProperty::HasLoop));
    assert!(total.has_tag(CodeProperty::HasAssignment));
    assert!(total.has_tag(CodeProperty::HasFunctionCall));
    assert_eq!(total.complexity(), 2);
}

#[test]
fn test_loop_functions_are_tagged_in_every_language() {
    for (language, file, source) in FIXTURES {
        let looping: Vec<_> = entities(*language, file, source)
            .into_iter()
            .filter(|e| e.name().eq_ignore_ascii_case("total"))
            .collect();
        for entity in looping {
            assert!(entity.has_tag(CodeProperty::HasLoop), "{language}");
            assert!(entity.has_tag(CodeProperty::HasAssignment), "{language}");
        }
    }
}

// ============================================================================
// File-level Policies
// ============================================================================

#[test]
fn test_extract_file_respects_entity_bound() {
    let source = FIXTURES[0].2;
    let (_dir, paths) = write_tree(&[("shapes.py", source)]);
    let adapter = SupportedLanguage::Python.adapter();

    let all = extract_file(adapter, &paths[0], None, None).unwrap();
    let bounded = extract_file(adapter, &paths[0], Some(2), None).unwrap();
    assert_eq!(bounded.len(), 2);
    for (a, b) in all.iter().zip(&bounded) {
        assert_eq!(a.name(), b.name());
    }
    assert!(extract_file(adapter, &paths[0], Some(0), None)
        .unwrap()
        .is_empty());
}

#[test]
fn test_extract_file_skips_oversized() {
    let (_dir, paths) = write_tree(&[("big.py", "def f():\n    return 1\n")]);
    let adapter = SupportedLanguage::Python.adapter();
    assert!(extract_file(adapter, &paths[0], None, Some(8))
        .unwrap()
        .is_empty());
    assert_eq!(extract_file(adapter, &paths[0], None, Some(1024)).unwrap().len(), 1);
}

#[test]
fn test_extract_file_skips_undecodable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("binary.py");
    fs::write(&path, [0x64, 0x65, 0x66, 0xff, 0xfe, 0x00, 0x20]).unwrap();

    let entities = extract_file(SupportedLanguage::Python.adapter(), &path, None, None).unwrap();
    assert!(entities.is_empty());
}

#[test]
fn test_extract_file_missing_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.go");
    let err = extract_file(SupportedLanguage::Go.adapter(), &path, None, None).unwrap_err();
    match err {
        ExtractError::Io { path: reported, .. } => assert_eq!(reported, path),
    }
}

#[test]
fn test_registry_routes_by_extension() {
    let files: Vec<(&str, &str)> = FIXTURES.iter().map(|(_, f, s)| (*f, *s)).collect();
    let (_dir, paths) = write_tree(&files);
    let registry = Registry::new(RegistryConfig::default()).unwrap();

    for ((language, _, _), path) in FIXTURES.iter().zip(&paths) {
        assert_eq!(registry.language_for_path(path).unwrap(), *language);
        let found = registry.extract(path, None).unwrap();
        assert!(!found.is_empty());
        assert!(found.iter().all(|e| e.language() == *language));
    }
}

#[test]
fn test_empty_and_comment_only_sources() {
    assert!(entities(SupportedLanguage::Python, "e.py", "").is_empty());
    assert!(entities(SupportedLanguage::Rust, "c.rs", "// nothing here\n").is_empty());
    assert!(entities(SupportedLanguage::Ruby, "c.rb", "# nothing\n").is_empty());
}
