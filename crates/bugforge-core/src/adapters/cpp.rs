//! C++ adapter, layered on the C rules.

use tree_sitter::Node;

use super::c::{declarator_name, is_c_decision_point, tag_c_node};
use super::{field_text, todo_marker, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::{Grammar, C_OPERATORS};
use crate::parser::SupportedLanguage;

pub(crate) static GRAMMAR: Grammar = Grammar {
    if_kinds: &["if_statement"],
    consequence_field: "consequence",
    else_kinds: &["else_clause"],
    elif_kinds: &[],
    inline_branch_kinds: &[],
    loop_kinds: &[
        "for_statement",
        "for_range_loop",
        "while_statement",
        "do_statement",
    ],
    assignment_kinds: &["assignment_expression", "declaration"],
    wrapper_kinds: &["try_statement"],
    binary_kinds: &["binary_expression"],
    paren_kinds: &["parenthesized_expression"],
    number_kinds: &["number_literal"],
    statement_wrapper_kinds: &["expression_statement"],
    block_kinds: &["compound_statement"],
    statement_list_kinds: &[],
    statement_kinds: &[],
    comment_kinds: &["comment"],
    method_kinds: &["function_definition"],
    base_list_kinds: &["base_class_clause"],
    base_container_kinds: &[],
    base_inner_list_kinds: &[],
    call_kinds: &["call_expression"],
    self_prefixes: &["this->"],
    null_literal: "nullptr",
    empty_block_filler: None,
    operators: &C_OPERATORS,
};

#[derive(Debug, Default)]
pub struct CppAdapter;

impl LanguageAdapter for CppAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::Cpp
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        match node.kind() {
            "function_definition" => Some(EntityKind::Function),
            "class_specifier" | "struct_specifier" => Some(EntityKind::Class),
            _ => None,
        }
    }

    fn name(&self, node: &Node, source: &str) -> String {
        match node.kind() {
            "class_specifier" | "struct_specifier" => field_text(node, "name", source),
            _ => declarator_name(node, source),
        }
    }

    fn stub(&self, _node: &Node, _source: &str, signature: &str, kind: EntityKind) -> String {
        let terminator = if kind == EntityKind::Class { ";" } else { "" };
        format!(
            "{signature} {{\n    // {}\n}}{terminator}",
            todo_marker(kind)
        )
    }

    fn tag_node(&self, node: &Node, source: &str, tags: &mut PropertySet) {
        tag_c_node(node, source, &GRAMMAR, tags);

        match node.kind() {
            "for_range_loop" => {
                tags.insert(CodeProperty::HasLoop);
            }
            "try_statement" => {
                tags.insert(CodeProperty::HasException);
                tags.insert(CodeProperty::HasWrapper);
            }
            "throw_statement" => {
                tags.insert(CodeProperty::HasException);
            }
            "lambda_expression" => {
                tags.insert(CodeProperty::HasLambda);
            }
            "new_expression" => {
                tags.insert(CodeProperty::HasFunctionCall);
            }
            "using_declaration" => {
                tags.insert(CodeProperty::HasImport);
            }
            "attribute_declaration" => {
                tags.insert(CodeProperty::HasDecorator);
            }
            _ => {}
        }
    }

    fn is_decision_point(&self, node: &Node, source: &str) -> bool {
        matches!(node.kind(), "for_range_loop" | "catch_clause")
            || is_c_decision_point(node, source, &GRAMMAR)
    }
}
