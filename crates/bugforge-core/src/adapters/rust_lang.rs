//! Rust adapter.
//!
//! Every `fn` item with a body is an entity; methods inside `impl` and `trait`
//! blocks are named `Type::method`. Rust has no class entities.

use tree_sitter::Node;

use super::{field_text, has_attached, is_branching_binary, tag_binary, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::{Grammar, C_OPERATORS};
use crate::parser::SupportedLanguage;
use crate::syntax::{find_ancestor_of_kinds, node_text};

pub(crate) static GRAMMAR: Grammar = Grammar {
    if_kinds: &["if_expression"],
    consequence_field: "consequence",
    else_kinds: &["else_clause"],
    elif_kinds: &[],
    inline_branch_kinds: &[],
    loop_kinds: &["for_expression", "while_expression", "loop_expression"],
    assignment_kinds: &[
        "assignment_expression",
        "compound_assignment_expr",
        "let_declaration",
    ],
    wrapper_kinds: &[],
    binary_kinds: &["binary_expression"],
    paren_kinds: &["parenthesized_expression"],
    number_kinds: &["integer_literal", "float_literal"],
    statement_wrapper_kinds: &["expression_statement"],
    block_kinds: &["block"],
    statement_list_kinds: &[],
    statement_kinds: &[
        "expression_statement",
        "let_declaration",
        "empty_statement",
        "attribute_item",
        "use_declaration",
        "const_item",
        "static_item",
        "function_item",
        "struct_item",
        "enum_item",
        "union_item",
        "impl_item",
        "trait_item",
        "type_item",
        "mod_item",
        "macro_definition",
        "extern_crate_declaration",
        "foreign_mod_item",
    ],
    comment_kinds: &["line_comment", "block_comment"],
    method_kinds: &[],
    base_list_kinds: &[],
    base_container_kinds: &[],
    base_inner_list_kinds: &[],
    call_kinds: &["call_expression"],
    self_prefixes: &["self."],
    null_literal: "None",
    empty_block_filler: None,
    operators: &C_OPERATORS,
};

const PANICKING_MACROS: &[&str] = &["panic", "unreachable", "todo", "unimplemented"];

#[derive(Debug, Default)]
pub struct RustAdapter;

impl LanguageAdapter for RustAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::Rust
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        (node.kind() == "function_item").then_some(EntityKind::Function)
    }

    fn name(&self, node: &Node, source: &str) -> String {
        let name = field_text(node, "name", source);
        match find_impl_target(node, source) {
            Some(target) => format!("{target}::{name}"),
            None => name,
        }
    }

    fn tag_node(&self, node: &Node, source: &str, tags: &mut PropertySet) {
        match node.kind() {
            "if_expression" => {
                tags.insert(CodeProperty::HasIf);
                if node.child_by_field_name("alternative").is_some() {
                    tags.insert(CodeProperty::HasIfElse);
                }
            }
            "for_expression" | "while_expression" | "loop_expression" => {
                tags.insert(CodeProperty::HasLoop);
            }
            "match_expression" => {
                tags.insert(CodeProperty::HasSwitch);
            }
            "try_expression" => {
                tags.insert(CodeProperty::HasException);
            }
            "macro_invocation" => {
                tags.insert(CodeProperty::HasFunctionCall);
                let name = field_text(node, "macro", source);
                if PANICKING_MACROS.contains(&name.as_str()) {
                    tags.insert(CodeProperty::HasException);
                }
            }
            "assignment_expression" | "compound_assignment_expr" | "let_declaration" => {
                tags.insert(CodeProperty::HasAssignment);
            }
            "call_expression" => {
                tags.insert(CodeProperty::HasFunctionCall);
            }
            "return_expression" => {
                tags.insert(CodeProperty::HasReturn);
            }
            "use_declaration" | "extern_crate_declaration" => {
                tags.insert(CodeProperty::HasImport);
            }
            "index_expression" => {
                tags.insert(CodeProperty::HasListIndexing);
            }
            "closure_expression" => {
                tags.insert(CodeProperty::HasLambda);
            }
            "attribute_item" => {
                tags.insert(CodeProperty::HasDecorator);
            }
            "binary_expression" => {
                tag_binary(node, source, &GRAMMAR, tags);
            }
            "unary_expression" => {
                tags.insert(CodeProperty::HasUnaryOp);
            }
            "range_expression" => {
                tags.insert(CodeProperty::HasOffByOne);
            }
            _ => {}
        }
    }

    fn is_decision_point(&self, node: &Node, source: &str) -> bool {
        match node.kind() {
            "if_expression" | "for_expression" | "while_expression" | "loop_expression"
            | "match_arm" | "try_expression" => true,
            _ => is_branching_binary(node, source, &GRAMMAR),
        }
    }

    fn has_decorator(&self, node: &Node, _source: &str) -> bool {
        has_attached(node, &["attribute_item"])
    }
}

/// Name of the type an `impl` (or trait) block containing `node` targets.
///
/// For `impl Trait for Type` this is `Type`; generic arguments are dropped.
fn find_impl_target(node: &Node, source: &str) -> Option<String> {
    let container = find_ancestor_of_kinds(node, &["impl_item", "trait_item"])?;
    if container.kind() == "trait_item" {
        return container
            .child_by_field_name("name")
            .map(|name| node_text(&name, source).to_string());
    }

    let target = container.child_by_field_name("type")?;
    if target.kind() == "generic_type" {
        if let Some(base) = target.child_by_field_name("type") {
            return Some(node_text(&base, source).to_string());
        }
    }
    Some(node_text(&target, source).to_string())
}
