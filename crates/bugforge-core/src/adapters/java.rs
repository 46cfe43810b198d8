//! Java adapter.

use tree_sitter::Node;

use super::{field_text, is_branching_binary, tag_binary, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::{Grammar, OperatorTable, C_FLIPS};
use crate::parser::SupportedLanguage;
use crate::syntax::{find_child_of_kinds, has_child_of_kind};

static OPERATORS: OperatorTable = OperatorTable {
    arithmetic: &["+", "-", "*", "/", "%"],
    bitwise: &["&", "|", "^", "<<", ">>", ">>>"],
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
    loop_kinds: &[
        "for_statement",
        "enhanced_for_statement",
        "while_statement",
        "do_statement",
    ],
    assignment_kinds: &["assignment_expression", "local_variable_declaration"],
    wrapper_kinds: &[
        "try_statement",
        "try_with_resources_statement",
        "synchronized_statement",
    ],
    binary_kinds: &["binary_expression"],
    paren_kinds: &["parenthesized_expression"],
    number_kinds: &["decimal_integer_literal", "decimal_floating_point_literal"],
    statement_wrapper_kinds: &["expression_statement"],
    block_kinds: &["block", "constructor_body"],
    statement_list_kinds: &[],
    statement_kinds: &[],
    comment_kinds: &["line_comment", "block_comment"],
    method_kinds: &["method_declaration"],
    base_list_kinds: &["superclass", "super_interfaces"],
    base_container_kinds: &[],
    base_inner_list_kinds: &["type_list"],
    call_kinds: &["method_invocation"],
    self_prefixes: &["this."],
    null_literal: "null",
    empty_block_filler: None,
    operators: &OPERATORS,
};

#[derive(Debug, Default)]
pub struct JavaAdapter;

impl LanguageAdapter for JavaAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::Java
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        match node.kind() {
            "method_declaration" | "constructor_declaration" => Some(EntityKind::Function),
            "class_declaration" | "enum_declaration" | "record_declaration" => {
                Some(EntityKind::Class)
            }
            _ => None,
        }
    }

    fn name(&self, node: &Node, source: &str) -> String {
        field_text(node, "name", source)
    }

    fn tag_node(&self, node: &Node, source: &str, tags: &mut PropertySet) {
        match node.kind() {
            "if_statement" => {
                tags.insert(CodeProperty::HasIf);
                if node.child_by_field_name("alternative").is_some() {
                    tags.insert(CodeProperty::HasIfElse);
                }
            }
            "for_statement" | "enhanced_for_statement" | "while_statement" | "do_statement" => {
                tags.insert(CodeProperty::HasLoop);
            }
            "switch_expression" | "switch_statement" => {
                tags.insert(CodeProperty::HasSwitch);
            }
            "try_statement" | "try_with_resources_statement" => {
                tags.insert(CodeProperty::HasException);
                tags.insert(CodeProperty::HasWrapper);
            }
            "throw_statement" => {
                tags.insert(CodeProperty::HasException);
            }
            "synchronized_statement" => {
                tags.insert(CodeProperty::HasWrapper);
            }
            "assignment_expression" | "variable_declarator" => {
                tags.insert(CodeProperty::HasAssignment);
            }
            "method_invocation" | "object_creation_expression" => {
                tags.insert(CodeProperty::HasFunctionCall);
            }
            "return_statement" => {
                tags.insert(CodeProperty::HasReturn);
            }
            "import_declaration" => {
                tags.insert(CodeProperty::HasImport);
            }
            "array_access" => {
                tags.insert(CodeProperty::HasListIndexing);
            }
            "lambda_expression" | "method_reference" => {
                tags.insert(CodeProperty::HasLambda);
            }
            "annotation" | "marker_annotation" => {
                tags.insert(CodeProperty::HasDecorator);
            }
            "binary_expression" => {
                tag_binary(node, source, &GRAMMAR, tags);
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

    fn is_decision_point(&self, node: &Node, source: &str) -> bool {
        match node.kind() {
            "if_statement"
            | "for_statement"
            | "enhanced_for_statement"
            | "while_statement"
            | "do_statement"
            | "switch_block_statement_group"
            | "switch_rule"
            | "catch_clause"
            | "ternary_expression" => true,
            _ => is_branching_binary(node, source, &GRAMMAR),
        }
    }

    fn has_decorator(&self, node: &Node, _source: &str) -> bool {
        find_child_of_kinds(node, &["modifiers"]).is_some_and(|modifiers| {
            has_child_of_kind(&modifiers, "annotation")
                || has_child_of_kind(&modifiers, "marker_annotation")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::extract_entities;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const SOURCE: &str = r#"import java.util.List;

public abstract class Repository<T> extends Base implements Store, AutoCloseable {
    private final List<T> items;

    public Repository(List<T> items) {
        this.items = items;
    }

    protected abstract T create();

    @Override
    public int count(
            int limit) {
        int total = 0;
        for (T item : items) {
            if (total >= limit) {
                break;
            }
            total += 1;
        }
        return total;
    }
}

interface Store {
    void close();
}
"#;

    #[test]
    fn test_java_entities() {
        let entities = extract_entities(&JavaAdapter, Path::new("Repository.java"), SOURCE, None);
        let names: Vec<&str> = entities.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Repository", "Repository", "count"]);
        assert!(entities[0].has_tag(CodeProperty::HasParent));
    }

    #[test]
    fn test_java_method_signature_and_tags() {
        let entities = extract_entities(&JavaAdapter, Path::new("Repository.java"), SOURCE, None);
        let count = &entities[2];
        assert_eq!(count.signature(), "@Override\npublic int count(int limit)");
        assert!(count.has_tag(CodeProperty::HasDecorator));
        assert!(count.has_tag(CodeProperty::HasLoop));
        assert!(count.has_tag(CodeProperty::HasOffByOne));
        // for + if + >=
        assert_eq!(count.complexity(), 4);
    }

    #[test]
    fn test_java_else_chain_complexity() {
        let source = "class M {\n    int sign(int x) {\n        if (x < 0) {\n            return -1;\n        } else if (x == 0) {\n            return 0;\n        } else {\n            return 1;\n        }\n    }\n}\n";
        let entities = extract_entities(&JavaAdapter, Path::new("M.java"), source, None);
        let sign = entities.iter().find(|e| e.name() == "sign").unwrap();
        // if + < + else-if + == + else
        assert_eq!(sign.complexity(), 6);
    }
}
