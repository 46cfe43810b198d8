//! Go adapter.
//!
//! Functions and methods are entities; methods are named `Receiver.Method`
//! with pointer and type-parameter decorations stripped from the receiver.

use tree_sitter::Node;

use super::{field_text, is_branching_binary, tag_binary, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::{Grammar, OperatorTable, C_FLIPS};
use crate::parser::SupportedLanguage;
use crate::syntax::{find_child_of_kinds, node_text};

static OPERATORS: OperatorTable = OperatorTable {
    arithmetic: &["+", "-", "*", "/", "%"],
    bitwise: &["&", "|", "^", "<<", ">>", "&^"],
    comparison: &["==", "!=", "<", "<=", ">", ">="],
    logical: &[&["&&", "||"]],
    flips: C_FLIPS,
};

pub(crate) static GRAMMAR: Grammar = Grammar {
    if_kinds: &["if_statement"],
    consequence_field: "consequence",
    else_kinds: &[],
    elif_kinds: &[],
    inline_branch_kinds: &[],
    loop_kinds: &["for_statement"],
    assignment_kinds: &[
        "assignment_statement",
        "short_var_declaration",
        "var_declaration",
    ],
    wrapper_kinds: &[],
    binary_kinds: &["binary_expression"],
    paren_kinds: &["parenthesized_expression"],
    number_kinds: &["int_literal", "float_literal"],
    statement_wrapper_kinds: &["expression_statement"],
    block_kinds: &["block", "statement_list"],
    statement_list_kinds: &["statement_list"],
    statement_kinds: &[],
    comment_kinds: &["comment"],
    method_kinds: &[],
    base_list_kinds: &[],
    base_container_kinds: &[],
    base_inner_list_kinds: &[],
    call_kinds: &["call_expression"],
    self_prefixes: &[],
    null_literal: "nil",
    empty_block_filler: None,
    operators: &OPERATORS,
};

#[derive(Debug, Default)]
pub struct GoAdapter;

impl LanguageAdapter for GoAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::Go
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        match node.kind() {
            "function_declaration" | "method_declaration" => Some(EntityKind::Function),
            _ => None,
        }
    }

    fn name(&self, node: &Node, source: &str) -> String {
        let name = field_text(node, "name", source);
        if node.kind() != "method_declaration" {
            return name;
        }
        match receiver_type(node, source) {
            Some(receiver) => format!("{receiver}.{name}"),
            None => name,
        }
    }

    fn tag_node(&self, node: &Node, source: &str, tags: &mut PropertySet) {
        match node.kind() {
            "if_statement" => {
                tags.insert(CodeProperty::HasIf);
                if node.child_by_field_name("alternative").is_some() {
                    tags.insert(CodeProperty::HasIfElse);
                }
            }
            "for_statement" => {
                tags.insert(CodeProperty::HasLoop);
            }
            "expression_switch_statement" | "type_switch_statement" | "select_statement" => {
                tags.insert(CodeProperty::HasSwitch);
            }
            "assignment_statement"
            | "short_var_declaration"
            | "var_declaration"
            | "inc_statement"
            | "dec_statement" => {
                tags.insert(CodeProperty::HasAssignment);
            }
            "call_expression" => {
                tags.insert(CodeProperty::HasFunctionCall);
                let callee = field_text(node, "function", source);
                if callee == "panic" || callee == "recover" {
                    tags.insert(CodeProperty::HasException);
                }
            }
            "return_statement" => {
                tags.insert(CodeProperty::HasReturn);
            }
            "import_declaration" => {
                tags.insert(CodeProperty::HasImport);
            }
            "index_expression" | "slice_expression" => {
                tags.insert(CodeProperty::HasListIndexing);
            }
            "func_literal" => {
                tags.insert(CodeProperty::HasLambda);
            }
            "binary_expression" => {
                tag_binary(node, source, &GRAMMAR, tags);
            }
            "unary_expression" => {
                tags.insert(CodeProperty::HasUnaryOp);
            }
            _ => {}
        }
    }

    fn is_decision_point(&self, node: &Node, source: &str) -> bool {
        match node.kind() {
            "if_statement" | "for_statement" | "expression_case" | "type_case"
            | "communication_case" => true,
            _ => is_branching_binary(node, source, &GRAMMAR),
        }
    }
}

/// Base type name of a method receiver (`(s *Stack[T])` gives `Stack`).
fn receiver_type(node: &Node, source: &str) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let param = find_child_of_kinds(&receiver, &["parameter_declaration"])?;
    let ty = param.child_by_field_name("type")?;
    let text = node_text(&ty, source).trim_start_matches('*').trim();
    let base = text.split('[').next().unwrap_or(text).trim();
    (!base.is_empty()).then(|| base.to_string())
}
