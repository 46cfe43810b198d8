//! PHP adapter.
//!
//! Functions, methods with a body, classes, and closures assigned to a
//! variable (`$handler = function (...) { ... };`) are entities.

use tree_sitter::Node;

use super::{field_text, has_attached, is_branching_binary, tag_binary, todo_marker, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::{Grammar, OperatorTable};
use crate::parser::SupportedLanguage;
use crate::syntax::find_child_of_kinds;

static OPERATORS: OperatorTable = OperatorTable {
    arithmetic: &["+", "-", "*", "/", "%", "**"],
    bitwise: &["&", "|", "^", "<<", ">>"],
    comparison: &["==", "!=", "===", "!==", "<", "<=", ">", ">="],
    logical: &[&["&&", "||"], &["and", "or"]],
    flips: &[
        ("==", "!="),
        ("===", "!=="),
        ("<", ">="),
        (">", "<="),
        ("&&", "||"),
        ("and", "or"),
        ("+", "-"),
        ("*", "/"),
        ("&", "|"),
        ("<<", ">>"),
    ],
};

pub(crate) static GRAMMAR: Grammar = Grammar {
    if_kinds: &["if_statement"],
    consequence_field: "body",
    else_kinds: &["else_clause"],
    elif_kinds: &["else_if_clause"],
    inline_branch_kinds: &[],
    loop_kinds: &[
        "for_statement",
        "foreach_statement",
        "while_statement",
        "do_statement",
    ],
    assignment_kinds: &["assignment_expression", "augmented_assignment_expression"],
    wrapper_kinds: &["try_statement"],
    binary_kinds: &["binary_expression"],
    paren_kinds: &["parenthesized_expression"],
    number_kinds: &["integer", "float"],
    statement_wrapper_kinds: &["expression_statement"],
    block_kinds: &["compound_statement"],
    statement_list_kinds: &[],
    statement_kinds: &[],
    comment_kinds: &["comment"],
    method_kinds: &["method_declaration"],
    base_list_kinds: &["base_clause", "class_interface_clause"],
    base_container_kinds: &[],
    base_inner_list_kinds: &[],
    call_kinds: &["member_call_expression"],
    self_prefixes: &["$this->"],
    null_literal: "null",
    empty_block_filler: None,
    operators: &OPERATORS,
};

const CLOSURES: &[&str] = &["anonymous_function", "anonymous_function_creation_expression"];

#[derive(Debug, Default)]
pub struct PhpAdapter;

impl LanguageAdapter for PhpAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::Php
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        match node.kind() {
            "function_definition" | "method_declaration" => Some(EntityKind::Function),
            "class_declaration" => Some(EntityKind::Class),
            "expression_statement" => bound_closure(node).map(|_| EntityKind::Function),
            _ => None,
        }
    }

    fn name(&self, node: &Node, source: &str) -> String {
        if node.kind() == "expression_statement" {
            return find_child_of_kinds(node, &["assignment_expression"])
                .map(|assign| field_text(&assign, "left", source))
                .unwrap_or_default();
        }
        field_text(node, "name", source)
    }

    fn body<'t>(&self, node: &Node<'t>) -> Option<Node<'t>> {
        match bound_closure(node) {
            Some(closure) => closure.child_by_field_name("body"),
            None => node.child_by_field_name("body"),
        }
    }

    fn stub(&self, node: &Node, _source: &str, signature: &str, kind: EntityKind) -> String {
        let terminator = if bound_closure(node).is_some() { ";" } else { "" };
        format!(
            "{signature} {{\n    // {}\n}}{terminator}",
            todo_marker(kind)
        )
    }

    fn tag_node(&self, node: &Node, source: &str, tags: &mut PropertySet) {
        match node.kind() {
            "if_statement" => {
                tags.insert(CodeProperty::HasIf);
                if node.child_by_field_name("alternative").is_some() {
                    tags.insert(CodeProperty::HasIfElse);
                }
            }
            "for_statement" | "foreach_statement" | "while_statement" | "do_statement" => {
                tags.insert(CodeProperty::HasLoop);
            }
            "switch_statement" | "match_expression" => {
                tags.insert(CodeProperty::HasSwitch);
            }
            "try_statement" => {
                tags.insert(CodeProperty::HasException);
                tags.insert(CodeProperty::HasWrapper);
            }
            "throw_expression" | "throw_statement" => {
                tags.insert(CodeProperty::HasException);
            }
            "assignment_expression" | "augmented_assignment_expression" => {
                tags.insert(CodeProperty::HasAssignment);
            }
            "function_call_expression"
            | "member_call_expression"
            | "scoped_call_expression"
            | "object_creation_expression" => {
                tags.insert(CodeProperty::HasFunctionCall);
            }
            "return_statement" => {
                tags.insert(CodeProperty::HasReturn);
            }
            "namespace_use_declaration"
            | "include_expression"
            | "include_once_expression"
            | "require_expression"
            | "require_once_expression" => {
                tags.insert(CodeProperty::HasImport);
            }
            "subscript_expression" => {
                tags.insert(CodeProperty::HasListIndexing);
            }
            "anonymous_function" | "anonymous_function_creation_expression" | "arrow_function" => {
                tags.insert(CodeProperty::HasLambda);
            }
            "attribute_list" => {
                tags.insert(CodeProperty::HasDecorator);
            }
            "binary_expression" => {
                tag_binary(node, source, &GRAMMAR, tags);
            }
            "unary_op_expression" | "update_expression" => {
                tags.insert(CodeProperty::HasUnaryOp);
            }
            "conditional_expression" => {
                tags.insert(CodeProperty::HasTernary);
            }
            _ => {}
        }
    }

    fn is_decision_point(&self, node: &Node, source: &str) -> bool {
        match node.kind() {
            "if_statement" | "else_if_clause" | "for_statement" | "foreach_statement"
            | "while_statement" | "do_statement" | "case_statement" | "catch_clause"
            | "conditional_expression" | "match_conditional_expression" => true,
            _ => is_branching_binary(node, source, &GRAMMAR),
        }
    }

    fn has_decorator(&self, node: &Node, _source: &str) -> bool {
        has_attached(node, &["attribute_list"])
    }
}

/// Closure assigned by an expression statement (`$f = function () {};`).
fn bound_closure<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    if node.kind() != "expression_statement" {
        return None;
    }
    let assignment = find_child_of_kinds(node, &["assignment_expression"])?;
    let value = assignment.child_by_field_name("right")?;
    CLOSURES.contains(&value.kind()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::extract_entities;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const SOURCE: &str = r#"<?php

namespace App;

abstract class Cart extends Model implements Countable
{
    abstract protected function total(): int;

    public function add($item, $qty = 1)
    {
        if ($qty <= 0 and $item !== null) {
            throw new \InvalidArgumentException("qty");
        }
        $this->items[] = $item;
        return $this->count() + $qty;
    }
}

function helper(array $values): int
{
    $sum = 0;
    foreach ($values as $v) {
        $sum += $v;
    }
    return $sum;
}

$format = function ($value) use ($prefix) {
    return $prefix . $value;
};
"#;

    #[test]
    fn test_php_entities() {
        let entities = extract_entities(&PhpAdapter, Path::new("cart.php"), SOURCE, None);
        let names: Vec<&str> = entities.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Cart", "add", "helper", "$format"]);
    }

    #[test]
    fn test_php_tags_and_stubs() {
        let entities = extract_entities(&PhpAdapter, Path::new("cart.php"), SOURCE, None);
        let cart = &entities[0];
        assert!(cart.has_tag(CodeProperty::HasParent));

        let add = &entities[1];
        assert_eq!(add.signature(), "public function add($item, $qty = 1)");
        assert!(add.has_tag(CodeProperty::HasException));
        assert!(add.has_tag(CodeProperty::HasBoolOp));
        assert!(add.has_tag(CodeProperty::HasAssignment));
        // if + and + <= + !==
        assert_eq!(add.complexity(), 5);

        let closure = &entities[3];
        assert_eq!(closure.signature(), "$format = function ($value) use ($prefix)");
        assert!(closure.stub().ends_with("};"));
    }
}
