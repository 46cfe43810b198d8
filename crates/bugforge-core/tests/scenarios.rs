//! End-to-end mutation scenarios: extract an entity from source text, apply a
//! single modifier, and check the exact rewrite.

mod common;

use bugforge_core::modifiers::{
    ControlIfElseInvert, OperationChange, OperationFlipOperator, RemoveLoop,
};
use bugforge_core::{Modifier, SupportedLanguage};
use common::entity_named;
use pretty_assertions::assert_eq;

const GO_PICK: &str = "package pick

func Pick(cond bool, xs []int) int {
\tn := 0
\tfor _, x := range xs {
\t\tif x > 0 && x < 10 {
\t\t\tn++
\t\t}
\t}
\tif cond { A() } else { B() }
\treturn n
}
";

#[test]
fn test_go_invert_if_else() {
    let pick = entity_named(SupportedLanguage::Go, "pick.go", GO_PICK, "Pick");
    // for + if + && + > + < + if + else
    assert_eq!(pick.complexity(), 8);

    let mut modifier = ControlIfElseInvert::new(SupportedLanguage::Go, 0).with_likelihood(1.0);
    assert!(modifier.can_change(&pick));

    let bug = modifier.modify(&pick).unwrap();
    let expected = pick
        .src_code()
        .replace("if cond { A() } else { B() }", "if cond { B() } else { A() }");
    assert_eq!(bug.rewrite, expected);
    assert_eq!(bug.strategy, "func_pm_ctrl_invert_if");
}

#[test]
fn test_go_invert_requires_complexity() {
    let source = "package p\n\nfunc F(c bool) {\n\tif c { A() } else { B() }\n}\n";
    let f = entity_named(SupportedLanguage::Go, "p.go", source, "F");
    let modifier = ControlIfElseInvert::new(SupportedLanguage::Go, 0).with_likelihood(1.0);
    assert!(!modifier.can_change(&f));
}

#[test]
fn test_javascript_flip_strict_equality() {
    let source = "function same(a, b) {\n  return a === b;\n}\n";
    let same = entity_named(SupportedLanguage::JavaScript, "same.js", source, "same");

    let mut modifier =
        OperationFlipOperator::new(SupportedLanguage::JavaScript, 0).with_likelihood(1.0);
    let bug = modifier.modify(&same).unwrap();
    assert_eq!(bug.rewrite, "function same(a, b) {\n  return a !== b;\n}");
}

#[test]
fn test_python_remove_for_loop() {
    let source = "def count(items):\n    n = 0\n    for item in items:\n        n += 1\n    return n\n";
    let count = entity_named(SupportedLanguage::Python, "count.py", source, "count");

    let mut modifier = RemoveLoop::new(SupportedLanguage::Python, 42).with_likelihood(1.0);
    let bug = modifier.modify(&count).unwrap();
    assert_eq!(bug.rewrite, "def count(items):\n    n = 0\n    return n");
    assert!(!bug.rewrite.contains("for "));
}

#[test]
fn test_rust_change_arithmetic_operator() {
    let source = "fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n";
    let add = entity_named(SupportedLanguage::Rust, "add.rs", source, "add");

    for seed in 0..8 {
        let run = || {
            let mut modifier =
                OperationChange::new(SupportedLanguage::Rust, seed).with_likelihood(1.0);
            modifier.modify(&add).unwrap().rewrite
        };
        let rewrite = run();
        assert_eq!(rewrite, run(), "seed {seed} is not reproducible");

        let replaced = ["-", "*", "/", "%"]
            .iter()
            .any(|op| rewrite == format!("fn add(a: i32, b: i32) -> i32 {{\n    a {op} b\n}}"));
        assert!(replaced, "unexpected rewrite for seed {seed}: {rewrite}");
    }
}
