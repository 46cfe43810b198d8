//! JavaScript adapter.
//!
//! Besides declarations, a `const`/`let`/`var` binding or an assignment whose
//! value is a function literal is an entity, named after its target.

use tree_sitter::Node;

use super::{field_text, has_attached, is_branching_binary, tag_binary, todo_marker, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::{Grammar, OperatorTable};
use crate::parser::SupportedLanguage;
use crate::syntax::{find_child_of_kinds, named_children, node_text};

pub(crate) static OPERATORS: OperatorTable = OperatorTable {
    arithmetic: &["+", "-", "*", "/", "%", "**"],
    bitwise: &["&", "|", "^", "<<", ">>", ">>>"],
    comparison: &["==", "!=", "===", "!==", "<", "<=", ">", ">="],
    logical: &[&["&&", "||"]],
    flips: &[
        ("==", "!="),
        ("===", "!=="),
        ("<", ">="),
        (">", "<="),
        ("&&", "||"),
        ("+", "-"),
        ("*", "/"),
        ("&", "|"),
        ("<<", ">>"),
    ],
};

pub(crate) static GRAMMAR: Grammar = Grammar {
    if_kinds: &["if_statement"],
    consequence_field: "consequence",
    else_kinds: &["else_clause"],
    elif_kinds: &[],
    inline_branch_kinds: &[],
    loop_kinds: &[
        "for_statement",
        "for_in_statement",
        "while_statement",
        "do_statement",
    ],
    assignment_kinds: &[
        "assignment_expression",
        "augmented_assignment_expression",
        "lexical_declaration",
        "variable_declaration",
    ],
    wrapper_kinds: &["try_statement"],
    binary_kinds: &["binary_expression"],
    paren_kinds: &["parenthesized_expression"],
    number_kinds: &["number"],
    statement_wrapper_kinds: &["expression_statement"],
    block_kinds: &["statement_block"],
    statement_list_kinds: &[],
    statement_kinds: &[],
    comment_kinds: &["comment"],
    method_kinds: &["method_definition"],
    base_list_kinds: &["class_heritage"],
    base_container_kinds: &[],
    base_inner_list_kinds: &[],
    call_kinds: &["call_expression"],
    self_prefixes: &["this."],
    null_literal: "null",
    empty_block_filler: None,
    operators: &OPERATORS,
};

const FUNCTION_LITERALS: &[&str] = &[
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
];

#[derive(Debug, Default)]
pub struct JavaScriptAdapter;

impl LanguageAdapter for JavaScriptAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::JavaScript
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        script_entity_kind(node, &[])
    }

    fn name(&self, node: &Node, source: &str) -> String {
        script_name(node, source)
    }

    fn body<'t>(&self, node: &Node<'t>) -> Option<Node<'t>> {
        script_body(node)
    }

    fn stub(&self, node: &Node, _source: &str, signature: &str, kind: EntityKind) -> String {
        script_stub(node, signature, kind)
    }

    fn tag_node(&self, node: &Node, source: &str, tags: &mut PropertySet) {
        tag_script_node(node, source, &GRAMMAR, tags);
    }

    fn is_decision_point(&self, node: &Node, source: &str) -> bool {
        is_script_decision_point(node, source, &GRAMMAR)
    }

    fn has_decorator(&self, node: &Node, _source: &str) -> bool {
        has_attached(node, &["decorator"])
    }
}

// ============================================================================
// Shared with TypeScript
// ============================================================================

/// Function literal bound by a single-declarator `const`/`let`/`var` or by an
/// assignment statement.
pub(crate) fn bound_function<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    let value = match node.kind() {
        "lexical_declaration" | "variable_declaration" => {
            let declarators = named_children(node)
                .into_iter()
                .filter(|c| c.kind() == "variable_declarator")
                .collect::<Vec<_>>();
            match declarators.as_slice() {
                [only] => only.child_by_field_name("value")?,
                _ => return None,
            }
        }
        "expression_statement" => {
            let assignment = find_child_of_kinds(node, &["assignment_expression"])?;
            assignment.child_by_field_name("right")?
        }
        _ => return None,
    };
    FUNCTION_LITERALS.contains(&value.kind()).then_some(value)
}

pub(crate) fn script_entity_kind(node: &Node, extra_classes: &[&str]) -> Option<EntityKind> {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" | "method_definition" => {
            Some(EntityKind::Function)
        }
        "class_declaration" => Some(EntityKind::Class),
        kind if extra_classes.contains(&kind) => Some(EntityKind::Class),
        "lexical_declaration" | "variable_declaration" | "expression_statement" => {
            bound_function(node).map(|_| EntityKind::Function)
        }
        _ => None,
    }
}

pub(crate) fn script_name(node: &Node, source: &str) -> String {
    match node.kind() {
        "lexical_declaration" | "variable_declaration" => {
            find_child_of_kinds(node, &["variable_declarator"])
                .map(|decl| field_text(&decl, "name", source))
                .unwrap_or_default()
        }
        "expression_statement" => find_child_of_kinds(node, &["assignment_expression"])
            .map(|assign| field_text(&assign, "left", source))
            .unwrap_or_default(),
        _ => field_text(node, "name", source),
    }
}

pub(crate) fn script_body<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    match bound_function(node) {
        Some(function) => function.child_by_field_name("body"),
        None => node.child_by_field_name("body"),
    }
}

pub(crate) fn script_stub(node: &Node, signature: &str, kind: EntityKind) -> String {
    let arrow = bound_function(node).is_some_and(|f| f.kind() == "arrow_function");
    let joiner = if arrow { " => " } else { " " };
    format!("{signature}{joiner}{{\n    // {}\n}}", todo_marker(kind))
}

pub(crate) fn tag_script_node(node: &Node, source: &str, grammar: &Grammar, tags: &mut PropertySet) {
    match node.kind() {
        "if_statement" => {
            tags.insert(CodeProperty::HasIf);
            if node.child_by_field_name("alternative").is_some() {
                tags.insert(CodeProperty::HasIfElse);
            }
        }
        "for_statement" | "for_in_statement" | "while_statement" | "do_statement" => {
            tags.insert(CodeProperty::HasLoop);
        }
        "switch_statement" => {
            tags.insert(CodeProperty::HasSwitch);
        }
        "try_statement" => {
            tags.insert(CodeProperty::HasException);
            tags.insert(CodeProperty::HasWrapper);
        }
        "throw_statement" => {
            tags.insert(CodeProperty::HasException);
        }
        "assignment_expression" | "augmented_assignment_expression" | "variable_declarator" => {
            tags.insert(CodeProperty::HasAssignment);
        }
        "call_expression" => {
            tags.insert(CodeProperty::HasFunctionCall);
            let callee = node
                .child_by_field_name("function")
                .map(|f| node_text(&f, source))
                .unwrap_or("");
            if callee == "require" || callee == "import" {
                tags.insert(CodeProperty::HasImport);
            }
        }
        "new_expression" => {
            tags.insert(CodeProperty::HasFunctionCall);
        }
        "return_statement" => {
            tags.insert(CodeProperty::HasReturn);
        }
        "import_statement" => {
            tags.insert(CodeProperty::HasImport);
        }
        "subscript_expression" => {
            tags.insert(CodeProperty::HasListIndexing);
        }
        "arrow_function" | "function_expression" | "function" => {
            tags.insert(CodeProperty::HasLambda);
        }
        "decorator" => {
            tags.insert(CodeProperty::HasDecorator);
        }
        "binary_expression" => {
            tag_binary(node, source, grammar, tags);
        }
        "unary_expression" | "update_expression" => {
            tags.insert(CodeProperty::HasUnaryOp);
        }
        "ternary_expression" => {
            tags.insert(CodeProperty::HasTernary);
        }
        _ => {}
    }
}

pub(crate) fn is_script_decision_point(node: &Node, source: &str, grammar: &Grammar) -> bool {
    match node.kind() {
        "if_statement" | "for_statement" | "for_in_statement" | "while_statement"
        | "do_statement" | "switch_case" | "catch_clause" | "ternary_expression" => true,
        _ => is_branching_binary(node, source, grammar),
    }
}
