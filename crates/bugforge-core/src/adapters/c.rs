//! C adapter.
//!
//! The node-kind tagging here is shared with the C++ adapter, which applies it
//! first and then adds its own kinds.

use tree_sitter::Node;

use super::{is_branching_binary, tag_binary, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::{Grammar, C_OPERATORS};
use crate::parser::SupportedLanguage;
use crate::syntax::node_text;

pub(crate) static GRAMMAR: Grammar = Grammar {
    if_kinds: &["if_statement"],
    consequence_field: "consequence",
    else_kinds: &["else_clause"],
    elif_kinds: &[],
    inline_branch_kinds: &[],
    loop_kinds: &["for_statement", "while_statement", "do_statement"],
    assignment_kinds: &["assignment_expression", "declaration"],
    wrapper_kinds: &[],
    binary_kinds: &["binary_expression"],
    paren_kinds: &["parenthesized_expression"],
    number_kinds: &["number_literal"],
    statement_wrapper_kinds: &["expression_statement"],
    block_kinds: &["compound_statement"],
    statement_list_kinds: &[],
    statement_kinds: &[],
    comment_kinds: &["comment"],
    method_kinds: &[],
    base_list_kinds: &[],
    base_container_kinds: &[],
    base_inner_list_kinds: &[],
    call_kinds: &["call_expression"],
    self_prefixes: &[],
    null_literal: "NULL",
    empty_block_filler: None,
    operators: &C_OPERATORS,
};

const DECLARATOR_LEAVES: &[&str] = &[
    "identifier",
    "field_identifier",
    "qualified_identifier",
    "destructor_name",
    "operator_name",
    "template_function",
];

#[derive(Debug, Default)]
pub struct CAdapter;

impl LanguageAdapter for CAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::C
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        (node.kind() == "function_definition").then_some(EntityKind::Function)
    }

    fn name(&self, node: &Node, source: &str) -> String {
        declarator_name(node, source)
    }

    fn tag_node(&self, node: &Node, source: &str, tags: &mut PropertySet) {
        tag_c_node(node, source, &GRAMMAR, tags);
    }

    fn is_decision_point(&self, node: &Node, source: &str) -> bool {
        is_c_decision_point(node, source, &GRAMMAR)
    }
}

/// Follow the `declarator` chain of a definition down to its identifier.
pub(crate) fn declarator_name(node: &Node, source: &str) -> String {
    let mut current = node.child_by_field_name("declarator");
    while let Some(declarator) = current {
        if DECLARATOR_LEAVES.contains(&declarator.kind()) {
            return node_text(&declarator, source).to_string();
        }
        current = declarator.child_by_field_name("declarator");
    }
    String::new()
}

pub(crate) fn tag_c_node(node: &Node, source: &str, grammar: &Grammar, tags: &mut PropertySet) {
    match node.kind() {
        "if_statement" => {
            tags.insert(CodeProperty::HasIf);
            if node.child_by_field_name("alternative").is_some() {
                tags.insert(CodeProperty::HasIfElse);
            }
        }
        "for_statement" | "while_statement" | "do_statement" => {
            tags.insert(CodeProperty::HasLoop);
        }
        "switch_statement" => {
            tags.insert(CodeProperty::HasSwitch);
        }
        "assignment_expression" | "init_declarator" => {
            tags.insert(CodeProperty::HasAssignment);
        }
        "call_expression" => {
            tags.insert(CodeProperty::HasFunctionCall);
        }
        "return_statement" => {
            tags.insert(CodeProperty::HasReturn);
        }
        "preproc_include" => {
            tags.insert(CodeProperty::HasImport);
        }
        "subscript_expression" => {
            tags.insert(CodeProperty::HasListIndexing);
        }
        "binary_expression" => {
            tag_binary(node, source, grammar, tags);
        }
        "unary_expression" | "update_expression" | "pointer_expression" => {
            tags.insert(CodeProperty::HasUnaryOp);
        }
        "conditional_expression" => {
            tags.insert(CodeProperty::HasTernary);
        }
        _ => {}
    }
}

pub(crate) fn is_c_decision_point(node: &Node, source: &str, grammar: &Grammar) -> bool {
    match node.kind() {
        "if_statement" | "for_statement" | "while_statement" | "do_statement"
        | "case_statement" | "conditional_expression" => true,
        _ => is_branching_binary(node, source, grammar),
    }
}
