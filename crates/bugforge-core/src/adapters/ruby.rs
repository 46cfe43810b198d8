//! Ruby adapter.
//!
//! `def` methods (including `def self.x` singleton methods) and classes are
//! entities. Signatures are kept verbatim; stubs close with `end`.

use tree_sitter::Node;

use super::{field_text, is_branching_binary, signature_before_body, tag_binary, todo_marker, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::{Grammar, OperatorTable};
use crate::parser::SupportedLanguage;
use crate::syntax::find_child_of_kinds;

static OPERATORS: OperatorTable = OperatorTable {
    arithmetic: &["+", "-", "*", "/", "%", "**"],
    bitwise: &["&", "|", "^", "<<", ">>"],
    comparison: &["==", "!=", "<", "<=", ">", ">="],
    logical: &[&["&&", "||"], &["and", "or"]],
    flips: &[
        ("==", "!="),
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
    if_kinds: &["if"],
    consequence_field: "consequence",
    else_kinds: &["else"],
    elif_kinds: &["elsif"],
    inline_branch_kinds: &["then", "else"],
    loop_kinds: &["while", "until", "for"],
    assignment_kinds: &["assignment", "operator_assignment"],
    wrapper_kinds: &["begin"],
    binary_kinds: &["binary"],
    paren_kinds: &["parenthesized_statements"],
    number_kinds: &["integer", "float"],
    statement_wrapper_kinds: &[],
    block_kinds: &[
        "body_statement",
        "then",
        "else",
        "do_block",
        "block_body",
        "begin",
    ],
    statement_list_kinds: &[],
    statement_kinds: &[],
    comment_kinds: &["comment"],
    method_kinds: &["method", "singleton_method"],
    base_list_kinds: &["superclass"],
    base_container_kinds: &[],
    base_inner_list_kinds: &[],
    call_kinds: &["call"],
    self_prefixes: &["self."],
    null_literal: "nil",
    empty_block_filler: None,
    operators: &OPERATORS,
};

const ITERATORS: &[&str] = &["each", "each_with_index", "times", "upto", "downto", "loop"];

#[derive(Debug, Default)]
pub struct RubyAdapter;

impl LanguageAdapter for RubyAdapter {
    fn language(&self) -> SupportedLanguage {
        SupportedLanguage::Ruby
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        match node.kind() {
            "method" | "singleton_method" => Some(EntityKind::Function),
            "class" => Some(EntityKind::Class),
            _ => None,
        }
    }

    fn name(&self, node: &Node, source: &str) -> String {
        let name = field_text(node, "name", source);
        if node.kind() == "singleton_method" {
            let object = field_text(node, "object", source);
            return format!("{object}.{name}");
        }
        name
    }

    fn body<'t>(&self, node: &Node<'t>) -> Option<Node<'t>> {
        node.child_by_field_name("body")
            .or_else(|| find_child_of_kinds(node, &["body_statement"]))
    }

    fn signature(&self, node: &Node, source: &str) -> String {
        signature_before_body(node, self.body(node), source, false)
    }

    fn stub(&self, _node: &Node, _source: &str, signature: &str, kind: EntityKind) -> String {
        format!("{signature}\n  # {}\nend", todo_marker(kind))
    }

    fn tag_node(&self, node: &Node, source: &str, tags: &mut PropertySet) {
        // Keyword tokens share their construct's kind name (`if`, `while`, ...)
        if !node.is_named() {
            return;
        }
        match node.kind() {
            "if" | "unless" => {
                tags.insert(CodeProperty::HasIf);
                if node.child_by_field_name("alternative").is_some() {
                    tags.insert(CodeProperty::HasIfElse);
                }
            }
            "if_modifier" | "unless_modifier" => {
                tags.insert(CodeProperty::HasIf);
            }
            "while" | "until" | "for" | "while_modifier" | "until_modifier" => {
                tags.insert(CodeProperty::HasLoop);
            }
            "case" | "case_match" => {
                tags.insert(CodeProperty::HasSwitch);
            }
            "begin" => {
                tags.insert(CodeProperty::HasException);
                tags.insert(CodeProperty::HasWrapper);
            }
            "rescue" | "ensure" => {
                tags.insert(CodeProperty::HasException);
            }
            "assignment" | "operator_assignment" => {
                tags.insert(CodeProperty::HasAssignment);
            }
            "call" => {
                tags.insert(CodeProperty::HasFunctionCall);
                let method = field_text(node, "method", source);
                if ITERATORS.contains(&method.as_str()) {
                    tags.insert(CodeProperty::HasLoop);
                }
                match method.as_str() {
                    "raise" => {
                        tags.insert(CodeProperty::HasException);
                    }
                    "require" | "require_relative" => {
                        tags.insert(CodeProperty::HasImport);
                    }
                    _ => {}
                }
            }
            "return" => {
                tags.insert(CodeProperty::HasReturn);
            }
            "element_reference" => {
                tags.insert(CodeProperty::HasListIndexing);
            }
            "lambda" | "block" | "do_block" => {
                tags.insert(CodeProperty::HasLambda);
            }
            "binary" => {
                tag_binary(node, source, &GRAMMAR, tags);
            }
            "unary" | "not" => {
                tags.insert(CodeProperty::HasUnaryOp);
            }
            "conditional" => {
                tags.insert(CodeProperty::HasTernary);
            }
            _ => {}
        }
    }

    fn is_decision_point(&self, node: &Node, source: &str) -> bool {
        match node.kind() {
            "if" | "elsif" | "unless" | "while" | "until" | "for" | "when" | "rescue"
            | "conditional" | "if_modifier" | "unless_modifier" | "while_modifier"
            | "until_modifier" => true,
            "else" => node.parent().is_some_and(|parent| parent.kind() == "unless"),
            _ => is_branching_binary(node, source, &GRAMMAR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::extract_entities;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const SOURCE: &str = r#"require "json"

class Stack < Base
  def self.build(items)
    new(items)
  end

  def push(item)
    if item.nil? || item == false
      raise ArgumentError
    else
      @items << item
    end
  end

  def empty
  end
end
"#;

    #[test]
    fn test_ruby_entities() {
        let entities = extract_entities(&RubyAdapter, Path::new("stack.rb"), SOURCE, None);
        let names: Vec<&str> = entities.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["Stack", "self.build", "push"]);
        assert!(entities[0].has_tag(CodeProperty::HasParent));
        assert_eq!(entities[0].signature(), "class Stack < Base");
        assert_eq!(entities[0].indent_size(), 2);
    }

    #[test]
    fn test_ruby_stub_and_tags() {
        let entities = extract_entities(&RubyAdapter, Path::new("stack.rb"), SOURCE, None);
        let push = &entities[2];
        assert_eq!(push.signature(), "def push(item)");
        assert_eq!(
            push.stub(),
            "def push(item)\n  # TODO: Implement this function\nend"
        );
        assert!(push.has_tag(CodeProperty::HasIfElse));
        assert!(push.has_tag(CodeProperty::HasException));
        assert!(push.has_tag(CodeProperty::HasBoolOp));
        // if + else + || + ==
        assert_eq!(push.complexity(), 5);
    }

    #[test]
    fn test_ruby_keywords_counted_once() {
        let source = "def drain(queue)\n  unless queue.empty?\n    queue.pop\n  else\n    nil\n  end\n  while running\n    step\n  end\nend\n";
        let entities = extract_entities(&RubyAdapter, Path::new("q.rb"), source, None);
        let drain = &entities[0];
        assert!(drain.has_tag(CodeProperty::HasLoop));
        // unless + else + while
        assert_eq!(drain.complexity(), 4);
    }
}
