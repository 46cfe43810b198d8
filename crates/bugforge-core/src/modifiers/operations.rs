//! Binary-expression modifiers: operator replacement, operand swapping,
//! chain breaking and numeric constant perturbation.

use rand::rngs::StdRng;
use rand::Rng;
use tree_sitter::Node;

use super::{ModifierSpec, Target, UNBOUNDED};
use crate::edits::{Edit, EditList};
use crate::entity::{BugRewrite, CodeEntity, CodeProperty};
use crate::syntax::{binary_parts, descendants_of_kinds, unwrap_parens, BinaryParts, Span};

const OPERATION_CONDITIONS: &[CodeProperty] = &[CodeProperty::IsFunction, CodeProperty::HasBinaryOp];

const fn operation_spec(name: &'static str, explanation: &'static str) -> ModifierSpec {
    ModifierSpec {
        name,
        explanation,
        conditions: OPERATION_CONDITIONS,
        min_complexity: 1,
        max_complexity: UNBOUNDED,
        max_attempts: 1,
        likelihood: 0.4,
    }
}

/// Binary expressions of the entity in pre-order, with their parts.
fn binaries<'e>(target: &Target<'e>) -> Vec<(Node<'e>, BinaryParts<'e>)> {
    descendants_of_kinds(target.node, target.grammar.binary_kinds)
        .into_iter()
        .filter_map(|node| binary_parts(&node).map(|parts| (node, parts)))
        .collect()
}

procedural_modifier!(
    /// Replace binary operators with another operator of the same class.
    OperationChange,
    operation_spec(
        "func_pm_op_change",
        "A binary operator has been replaced with a different operator of the same kind."
    )
);

impl OperationChange {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        let operators = target.grammar.operators;

        let mut edits = EditList::new();
        for (_, parts) in binaries(&target) {
            let op = target.text(&parts.operator);
            let Some(class) = operators.class_of(op) else {
                continue;
            };
            let choices: Vec<&str> = class.iter().copied().filter(|c| *c != op).collect();
            if choices.is_empty() || !self.base.flip() {
                continue;
            }
            let pick = choices[self.base.rng_mut().random_range(0..choices.len())];
            edits.try_push(Edit::replace(Span::of(&parts.operator), pick));
        }

        self.base.finish(entity, &edits)
    }
}

procedural_modifier!(
    /// Replace binary operators with their fixed logical opposite.
    OperationFlipOperator,
    operation_spec(
        "func_pm_op_flip",
        "A binary operator has been flipped to its opposite."
    )
);

impl OperationFlipOperator {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        let operators = target.grammar.operators;

        let mut edits = EditList::new();
        for (_, parts) in binaries(&target) {
            let Some(opposite) = operators.flip(target.text(&parts.operator)) else {
                continue;
            };
            if !self.base.flip() {
                continue;
            }
            edits.try_push(Edit::replace(Span::of(&parts.operator), opposite));
        }

        self.base.finish(entity, &edits)
    }
}

procedural_modifier!(
    /// Swap the operands of binary expressions.
    OperationSwapOperands,
    operation_spec(
        "func_pm_op_swap",
        "The operands of a binary expression have been swapped."
    )
);

impl OperationSwapOperands {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        let operators = target.grammar.operators;

        let mut edits = EditList::new();
        for (_, parts) in binaries(&target) {
            let left = Span::of(&parts.left);
            let right = Span::of(&parts.right);
            let operator = Span::of(&parts.operator);
            if [left, right, operator].iter().any(|span| edits.overlaps(span)) {
                continue;
            }
            if !self.base.flip() {
                continue;
            }

            let swapped = [
                Edit::replace(left, target.text(&parts.right)),
                Edit::replace(right, target.text(&parts.left)),
            ];
            for edit in swapped {
                edits.push(edit).ok()?;
            }
            // `x < y` reads `y > x` once the operands trade places.
            if let Some(mirrored) = operators.mirror(target.text(&parts.operator)) {
                edits.push(Edit::replace(operator, mirrored)).ok()?;
            }
        }

        self.base.finish(entity, &edits)
    }
}

procedural_modifier!(
    /// Collapse operator chains to one of their inner operands.
    OperationBreakChains,
    operation_spec(
        "func_pm_op_break_chains",
        "A chained binary expression has been reduced to one of its operands, dropping a term."
    )
);

impl OperationBreakChains {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        let grammar = target.grammar;

        let mut edits = EditList::new();
        for (node, parts) in binaries(&target) {
            let span = Span::of(&node);
            if edits.overlaps(&span) {
                continue;
            }

            let left = unwrap_parens(parts.left, grammar.paren_kinds);
            let right = unwrap_parens(parts.right, grammar.paren_kinds);
            let kept = if grammar.is_binary(left.kind()) {
                binary_parts(&left).map(|inner| inner.left)
            } else if grammar.is_binary(right.kind()) {
                binary_parts(&right).map(|inner| inner.right)
            } else {
                None
            };
            let Some(kept) = kept else {
                continue;
            };
            if !self.base.flip() {
                continue;
            }
            edits.try_push(Edit::replace(span, target.text(&kept)));
        }

        self.base.finish(entity, &edits)
    }
}

procedural_modifier!(
    /// Nudge numeric literals used as binary operands.
    OperationChangeConstants,
    operation_spec(
        "func_pm_op_change_const",
        "A numeric constant in a binary expression has been changed by a small amount."
    )
);

impl OperationChangeConstants {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        let grammar = target.grammar;

        let mut edits = EditList::new();
        for (_, parts) in binaries(&target) {
            for operand in [parts.left, parts.right] {
                let literal = unwrap_parens(operand, grammar.paren_kinds);
                if !grammar.number_kinds.contains(&literal.kind()) {
                    continue;
                }
                let span = Span::of(&literal);
                if edits.overlaps(&span) || !self.base.flip() {
                    continue;
                }
                if let Some(changed) = perturb_literal(target.text(&literal), self.base.rng_mut()) {
                    edits.try_push(Edit::replace(span, changed));
                }
            }
        }

        self.base.finish(entity, &edits)
    }
}

const INT_DELTAS: [i128; 4] = [1, -1, 2, -2];
const FLOAT_DELTAS: [f64; 4] = [0.1, -0.1, 1.0, -1.0];

/// Shift a decimal literal by a small delta, keeping any type suffix.
///
/// Hex/octal/binary literals, exponents, digit separators and results that
/// would turn negative are left alone or redirected to a positive delta.
pub(crate) fn perturb_literal(literal: &str, rng: &mut StdRng) -> Option<String> {
    let lower = literal.to_ascii_lowercase();
    if ["0x", "0b", "0o"].iter().any(|prefix| lower.starts_with(prefix)) || literal.contains('_') {
        return None;
    }

    let digits_end = literal
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(literal.len());
    let (digits, suffix) = literal.split_at(digits_end);
    if digits.is_empty() || digits.ends_with('.') || suffix.starts_with(['e', 'E']) {
        return None;
    }

    if let Some((_, fraction)) = digits.split_once('.') {
        let value: f64 = digits.parse().ok()?;
        let precision = fraction.len().max(1);
        let delta = FLOAT_DELTAS[rng.random_range(0..FLOAT_DELTAS.len())];
        let shifted = if value + delta < 0.0 { value + delta.abs() } else { value + delta };
        return Some(format!("{shifted:.precision$}{suffix}"));
    }

    if digits.len() > 1 && digits.starts_with('0') {
        // Leading-zero octal
        return None;
    }
    let value: i128 = digits.parse().ok()?;
    let delta = INT_DELTAS[rng.random_range(0..INT_DELTAS.len())];
    let shifted = if value + delta < 0 { value + delta.abs() } else { value + delta };
    Some(format!("{shifted}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::extract_entities;
    use crate::modifiers::Modifier;
    use crate::parser::SupportedLanguage;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use std::path::Path;

    fn first_entity(language: SupportedLanguage, path: &str, source: &str) -> CodeEntity {
        extract_entities(language.adapter(), Path::new(path), source, None)
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_change_stays_in_class() {
        let source = "int mix(int a, int b) {\n    return a << b;\n}\n";
        let entity = first_entity(SupportedLanguage::C, "mix.c", source);
        for seed in 0..8 {
            let mut m = OperationChange::new(SupportedLanguage::C, seed).with_likelihood(1.0);
            let bug = m.modify(&entity).unwrap();
            let body = bug.rewrite.lines().nth(1).unwrap().trim();
            assert!(
                ["return a & b;", "return a | b;", "return a ^ b;", "return a >> b;"]
                    .contains(&body),
                "unexpected rewrite {body}"
            );
        }
    }

    #[test]
    fn test_flip_python_membership() {
        let source = "def has(x, xs):\n    return x in xs and x is not None\n";
        let entity = first_entity(SupportedLanguage::Python, "has.py", source);
        let mut m = OperationFlipOperator::new(SupportedLanguage::Python, 0).with_likelihood(1.0);
        let bug = m.modify(&entity).unwrap();
        assert_eq!(bug.rewrite, "def has(x, xs):\n    return x not in xs or x is None");
    }

    #[test]
    fn test_swap_mirrors_ordering() {
        let source = "func less(x, y int) bool {\n\treturn x < y\n}\n";
        let entity = first_entity(SupportedLanguage::Go, "less.go", source);
        let mut m = OperationSwapOperands::new(SupportedLanguage::Go, 0).with_likelihood(1.0);
        let bug = m.modify(&entity).unwrap();
        assert_eq!(bug.rewrite, "func less(x, y int) bool {\n\treturn y > x\n}");
    }

    #[test]
    fn test_swap_keeps_equality() {
        let source = "function eq(a, b) {\n  return a - 1 === b;\n}\n";
        let entity = first_entity(SupportedLanguage::JavaScript, "eq.js", source);
        let mut m = OperationSwapOperands::new(SupportedLanguage::JavaScript, 0).with_likelihood(1.0);
        let bug = m.modify(&entity).unwrap();
        assert_eq!(bug.rewrite, "function eq(a, b) {\n  return b === a - 1;\n}");
    }

    #[test]
    fn test_break_chains_unwraps_parens() {
        let source = "fn f(a: i32, b: i32, c: i32) -> i32 {\n    (a + b) * c\n}\n";
        let entity = first_entity(SupportedLanguage::Rust, "f.rs", source);
        let mut m = OperationBreakChains::new(SupportedLanguage::Rust, 0).with_likelihood(1.0);
        let bug = m.modify(&entity).unwrap();
        assert_eq!(bug.rewrite, "fn f(a: i32, b: i32, c: i32) -> i32 {\n    a\n}");
    }

    #[test]
    fn test_break_chains_needs_chain() {
        let source = "fn f(a: i32, b: i32) -> i32 {\n    a + b\n}\n";
        let entity = first_entity(SupportedLanguage::Rust, "f.rs", source);
        let mut m = OperationBreakChains::new(SupportedLanguage::Rust, 0).with_likelihood(1.0);
        assert!(m.modify(&entity).is_none());
    }

    #[test]
    fn test_change_constants() {
        let source = "def scale(x):\n    return x * 10 + 0.5\n";
        let entity = first_entity(SupportedLanguage::Python, "scale.py", source);
        let mut m = OperationChangeConstants::new(SupportedLanguage::Python, 3).with_likelihood(1.0);
        let bug = m.modify(&entity).unwrap();
        assert!(bug.rewrite.starts_with("def scale(x):\n    return x * "));
        assert!(!bug.rewrite.contains("* 10 +"));
        assert!(!bug.rewrite.ends_with("+ 0.5"));
    }

    #[test]
    fn test_perturb_literal_forms() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let int: i64 = perturb_literal("41", &mut rng).unwrap().parse().unwrap();
            assert!((39..=43).contains(&int) && int != 41);

            let suffixed = perturb_literal("7u32", &mut rng).unwrap();
            assert!(suffixed.ends_with("u32"));

            let float = perturb_literal("2.50", &mut rng).unwrap();
            assert_eq!(float.split_once('.').unwrap().1.len(), 2);
            assert_ne!(float, "2.50");

            let zero: i64 = perturb_literal("0", &mut rng).unwrap().parse().unwrap();
            assert!(zero == 1 || zero == 2);
        }
        assert_eq!(perturb_literal("0xff", &mut rng), None);
        assert_eq!(perturb_literal("1e9", &mut rng), None);
        assert_eq!(perturb_literal("1_000", &mut rng), None);
        assert_eq!(perturb_literal("0755", &mut rng), None);
    }
}
