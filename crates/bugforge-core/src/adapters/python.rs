//! Python adapter.

use tree_sitter::Node;

use super::{field_text, signature_before_body, tag_binary, todo_marker, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::{Grammar, OperatorTable};
use crate::parser::SupportedLanguage;
use crate::syntax::has_child_of_kind;

static OPERATORS: OperatorTable = OperatorTable {
    arithmetic: &["+", "-", "*", "/", "//", "%", "**"],
    bitwise: &["&", "|", "^", "<<", ">>"],
    comparison: &["==", "!=", "<", "<=", ">", ">="],
    logical: &[&["and", "or"]],
    flips: &[
        ("==", "!="),
        ("<", ">="),
        (">", "<="),
        ("and", "or"),
        ("+", "-"),
        ("*", "/"),
        ("&", "|"),
        ("<<", ">>"),
        ("is", "is not"),
        ("in", "not in"),
    ],
};

pub(crate) static GRAMMAR: Grammar = Grammar {
    if_kinds: &["if_statement"],
    consequence_field: "consequence",
    else_kinds: &["else_clause"],
    elif_kinds: &["elif_clause"],
    inline_branch_kinds: &[],
    loop_kinds: &["for_statement", "while_statement"],
    assignment_kinds: &["assignment", "augmented_assignment"],
    wrapper_kinds: &["try_statement", "with_statement"],
    binary_kinds: &["binary_operator", "comparison_operator", "boolean_operator"],
    paren_kinds: &["parenthesized_expression"],
    number_kinds: &["integer", "float"],
    statement_wrapper_kinds: &["expression_statement"],
    block_kinds: &["block"],
    statement_list_kinds: &[],
    statement_kinds: &[],
    comment_kinds: &["comment"],
    method_kinds: &["function_definition", "decorated_definition"],
    base_list_kinds: &["argument_list"],
    base_container_kinds: &[],
    base_inner_list_kinds: &[],
    call_kinds: &["call"],
    self_prefixes: &["self."],
    null_literal: "None",
    empty_block_filler: Some("pass"),
    operators: &OPERATORS,
};

/// Python: `def` functions/methods and `class` definitions.
///
/// Signatures are kept verbatim (Python has no brace delimiters to normalize).
#[derive(Debug, Default)]
pub struct PythonAdapter;

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::Python
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        match node.kind() {
            "function_definition" => Some(EntityKind::Function),
            "class_definition" => Some(EntityKind::Class),
            _ => None,
        }
    }

    fn name(&self, node: &Node, source: &str) -> String {
        field_text(node, "name", source)
    }

    fn signature(&self, node: &Node, source: &str) -> String {
        signature_before_body(node, self.body(node), source, false)
    }

    fn stub(&self, _node: &Node, _source: &str, signature: &str, kind: EntityKind) -> String {
        format!("{signature}:\n    # {}\n    pass", todo_marker(kind))
    }

    fn tag_node(&self, node: &Node, source: &str, tags: &mut PropertySet) {
        match node.kind() {
            "if_statement" => {
                tags.insert(CodeProperty::HasIf);
                if has_child_of_kind(node, "else_clause") {
                    tags.insert(CodeProperty::HasIfElse);
                }
            }
            "for_statement" | "while_statement" => {
                tags.insert(CodeProperty::HasLoop);
            }
            "match_statement" => {
                tags.insert(CodeProperty::HasSwitch);
            }
            "try_statement" => {
                tags.insert(CodeProperty::HasException);
                tags.insert(CodeProperty::HasWrapper);
            }
            "raise_statement" => {
                tags.insert(CodeProperty::HasException);
            }
            "with_statement" => {
                tags.insert(CodeProperty::HasWrapper);
            }
            "assignment" | "augmented_assignment" => {
                tags.insert(CodeProperty::HasAssignment);
            }
            "call" => {
                tags.insert(CodeProperty::HasFunctionCall);
                let callee = field_text(node, "function", source);
                if callee == "__import__" || callee == "importlib.import_module" {
                    tags.insert(CodeProperty::HasImport);
                }
            }
            "return_statement" => {
                tags.insert(CodeProperty::HasReturn);
            }
            "import_statement" | "import_from_statement" => {
                tags.insert(CodeProperty::HasImport);
            }
            "subscript" => {
                tags.insert(CodeProperty::HasListIndexing);
            }
            "list_comprehension"
            | "dictionary_comprehension"
            | "set_comprehension"
            | "generator_expression" => {
                tags.insert(CodeProperty::HasListComprehension);
            }
            "lambda" => {
                tags.insert(CodeProperty::HasLambda);
            }
            "decorator" => {
                tags.insert(CodeProperty::HasDecorator);
            }
            "binary_operator" | "comparison_operator" | "boolean_operator" => {
                tag_binary(node, source, &GRAMMAR, tags);
            }
            "unary_operator" | "not_operator" => {
                tags.insert(CodeProperty::HasUnaryOp);
            }
            "conditional_expression" => {
                tags.insert(CodeProperty::HasTernary);
            }
            _ => {}
        }
    }

    fn is_decision_point(&self, node: &Node, _source: &str) -> bool {
        matches!(
            node.kind(),
            "if_statement"
                | "elif_clause"
                | "for_statement"
                | "while_statement"
                | "except_clause"
                | "case_clause"
                | "boolean_operator"
                | "comparison_operator"
                | "conditional_expression"
                | "for_in_clause"
                | "if_clause"
        )
    }

    fn has_decorator(&self, node: &Node, _source: &str) -> bool {
        node.parent()
            .is_some_and(|parent| parent.kind() == "decorated_definition")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::extract_entities;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const SOURCE: &str = r#"import os

class Greeter(Base, metaclass=Meta):
    def greet(self, name):
        if name:
            return "hi " + name
        else:
            return "hi"

@cached
def compute(
    a,
    b,
):
    total = 0
    for x in range(a):
        total += x * b
    return [y for y in [total] if y > 0]
"#;

    #[test]
    fn test_python_entities_in_preorder() {
        let entities = extract_entities(&PythonAdapter, Path::new("m.py"), SOURCE, None);
        let names: Vec<&str> = entities.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Greeter", "greet", "compute"]);

        let class = &entities[0];
        assert_eq!(class.kind(), EntityKind::Class);
        assert!(class.has_tag(CodeProperty::IsClass));
        assert!(class.has_tag(CodeProperty::HasParent));
        assert_eq!(class.signature(), "class Greeter(Base, metaclass=Meta)");
    }

    #[test]
    fn test_python_method_dedent_and_tags() {
        let entities = extract_entities(&PythonAdapter, Path::new("m.py"), SOURCE, None);
        let greet = &entities[1];
        assert_eq!(greet.indent_level(), 1);
        assert_eq!(greet.indent_size(), 4);
        assert!(greet.src_code().starts_with("def greet(self, name):\n    if name:"));
        assert!(greet.has_tag(CodeProperty::HasIfElse));
        assert!(greet.has_tag(CodeProperty::HasReturn));
        assert!(greet.has_tag(CodeProperty::HasArithmetic));
        // if + else
        assert_eq!(greet.complexity(), 3);
        assert_eq!(
            greet.stub(),
            "def greet(self, name):\n    # TODO: Implement this function\n    pass"
        );
    }

    #[test]
    fn test_python_multiline_signature_verbatim() {
        let entities = extract_entities(&PythonAdapter, Path::new("m.py"), SOURCE, None);
        let compute = &entities[2];
        assert_eq!(compute.signature(), "def compute(\n    a,\n    b,\n)");
        assert!(compute.has_tag(CodeProperty::HasDecorator));
        assert!(compute.has_tag(CodeProperty::HasLoop));
        assert!(compute.has_tag(CodeProperty::HasListComprehension));
        assert!(compute.has_tag(CodeProperty::HasOffByOne));
        assert!(!compute.has_tag(CodeProperty::HasIf));
        assert_eq!(compute.line_start(), 11);
        assert_eq!(compute.line_end(), 18);
    }

    #[test]
    fn test_python_membership_and_identity_are_decisions() {
        let source = "def find(xs, key):\n    if key in xs and xs is not None:\n        return key\n    elif key is None:\n        return None\n    else:\n        return xs\n";
        let entities = extract_entities(&PythonAdapter, Path::new("f.py"), source, None);
        // if + elif + else + and + in + is not + is
        assert_eq!(entities[0].complexity(), 8);
    }
}
