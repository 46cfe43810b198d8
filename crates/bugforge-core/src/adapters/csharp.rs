//! C# adapter.

use tree_sitter::Node;

use super::{field_text, has_attached, is_branching_binary, tag_binary, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::{Grammar, C_OPERATORS};
use crate::parser::SupportedLanguage;
use crate::syntax::find_child_of_kinds;

pub(crate) static GRAMMAR: Grammar = Grammar {
    if_kinds: &["if_statement"],
    consequence_field: "consequence",
    else_kinds: &[],
    elif_kinds: &[],
    inline_branch_kinds: &[],
    loop_kinds: &[
        "for_statement",
        "foreach_statement",
        "while_statement",
        "do_statement",
    ],
    assignment_kinds: &["assignment_expression", "local_declaration_statement"],
    wrapper_kinds: &["try_statement", "using_statement", "lock_statement"],
    binary_kinds: &["binary_expression"],
    paren_kinds: &["parenthesized_expression"],
    number_kinds: &["integer_literal", "real_literal"],
    statement_wrapper_kinds: &["expression_statement"],
    block_kinds: &["block"],
    statement_list_kinds: &[],
    statement_kinds: &[],
    comment_kinds: &["comment"],
    method_kinds: &["method_declaration"],
    base_list_kinds: &["base_list"],
    base_container_kinds: &[],
    base_inner_list_kinds: &[],
    call_kinds: &["invocation_expression"],
    self_prefixes: &["this."],
    null_literal: "null",
    empty_block_filler: None,
    operators: &C_OPERATORS,
};

#[derive(Debug, Default)]
pub struct CSharpAdapter;

impl LanguageAdapter for CSharpAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::CSharp
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        match node.kind() {
            "method_declaration"
            | "constructor_declaration"
            | "destructor_declaration"
            | "operator_declaration"
            | "local_function_statement" => Some(EntityKind::Function),
            "class_declaration" | "struct_declaration" | "record_declaration" => {
                Some(EntityKind::Class)
            }
            _ => None,
        }
    }

    fn name(&self, node: &Node, source: &str) -> String {
        field_text(node, "name", source)
    }

    /// Block body, or the `=> expr` clause of an expression-bodied member.
    fn body<'t>(&self, node: &Node<'t>) -> Option<Node<'t>> {
        node.child_by_field_name("body")
            .or_else(|| find_child_of_kinds(node, &["arrow_expression_clause"]))
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
            "switch_statement" | "switch_expression" => {
                tags.insert(CodeProperty::HasSwitch);
            }
            "try_statement" => {
                tags.insert(CodeProperty::HasException);
                tags.insert(CodeProperty::HasWrapper);
            }
            "throw_statement" | "throw_expression" => {
                tags.insert(CodeProperty::HasException);
            }
            "using_statement" | "lock_statement" => {
                tags.insert(CodeProperty::HasWrapper);
            }
            "assignment_expression" | "variable_declarator" => {
                tags.insert(CodeProperty::HasAssignment);
            }
            "invocation_expression" | "object_creation_expression" => {
                tags.insert(CodeProperty::HasFunctionCall);
            }
            "return_statement" => {
                tags.insert(CodeProperty::HasReturn);
            }
            "using_directive" => {
                tags.insert(CodeProperty::HasImport);
            }
            "element_access_expression" => {
                tags.insert(CodeProperty::HasListIndexing);
            }
            "query_expression" => {
                tags.insert(CodeProperty::HasListComprehension);
            }
            "lambda_expression" | "anonymous_method_expression" => {
                tags.insert(CodeProperty::HasLambda);
            }
            "attribute_list" => {
                tags.insert(CodeProperty::HasDecorator);
            }
            "binary_expression" => {
                tag_binary(node, source, &GRAMMAR, tags);
            }
            "prefix_unary_expression" | "postfix_unary_expression" => {
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
            "if_statement" | "for_statement" | "foreach_statement" | "while_statement"
            | "do_statement" | "switch_section" | "switch_expression_arm" | "catch_clause"
            | "conditional_expression" => true,
            _ => is_branching_binary(node, source, &GRAMMAR),
        }
    }

    fn has_decorator(&self, node: &Node, _source: &str) -> bool {
        has_attached(node, &["attribute_list"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::extract_entities;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const SOURCE: &str = r#"using System;

public interface IShape {
    double Area();
}

[Serializable]
public class Square : Shape, IShape {
    private double side;

    public Square(double side) {
        this.side = side;
    }

    public double Area() => side * side;

    public abstract void Reset();

    public int Clamp(int value) {
        lock (this) {
            if (value < 0 || value > 10) {
                return 0;
            } else {
                return value;
            }
        }
    }
}
"#;

    #[test]
    fn test_csharp_entities() {
        let entities = extract_entities(&CSharpAdapter, Path::new("Square.cs"), SOURCE, None);
        let names: Vec<&str> = entities.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Square", "Square", "Area", "Clamp"]);
    }

    #[test]
    fn test_csharp_expression_bodied_member() {
        let entities = extract_entities(&CSharpAdapter, Path::new("Square.cs"), SOURCE, None);
        let area = &entities[2];
        assert_eq!(area.signature(), "public double Area()");
        assert!(area.has_tag(CodeProperty::HasArithmetic));
    }

    #[test]
    fn test_csharp_class_tags() {
        let entities = extract_entities(&CSharpAdapter, Path::new("Square.cs"), SOURCE, None);
        let class = &entities[0];
        assert!(class.has_tag(CodeProperty::HasParent));
        assert!(class.has_tag(CodeProperty::HasDecorator));

        let clamp = &entities[3];
        assert!(clamp.has_tag(CodeProperty::HasWrapper));
        assert!(clamp.has_tag(CodeProperty::HasIfElse));
        // if + else + || + < + >
        assert_eq!(clamp.complexity(), 6);
    }
}
