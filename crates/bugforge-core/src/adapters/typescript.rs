//! TypeScript and TSX adapter.
//!
//! Composes the JavaScript rules: every node is first tagged as JavaScript,
//! then the TypeScript-only kinds are added on top. Interfaces, type aliases
//! and signature-only members have no body and are never entities.

use tree_sitter::Node;

use super::javascript::{
    is_script_decision_point, script_body, script_entity_kind, script_name, script_stub,
    tag_script_node, OPERATORS,
};
use super::{has_attached, LanguageAdapter};
use crate::entity::{CodeProperty, EntityKind, PropertySet};
use crate::grammar::Grammar;
use crate::parser::SupportedLanguage;

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
    base_list_kinds: &["extends_clause", "implements_clause"],
    base_container_kinds: &["class_heritage"],
    base_inner_list_kinds: &[],
    call_kinds: &["call_expression"],
    self_prefixes: &["this."],
    null_literal: "null",
    empty_block_filler: None,
    operators: &OPERATORS,
};

const ABSTRACT_CLASSES: &[&str] = &["abstract_class_declaration"];

/// TypeScript adapter; one instance per dialect (`.ts` and `.tsx`).
#[derive(Debug)]
pub struct TypeScriptAdapter {
    tsx: bool,
}

impl TypeScriptAdapter {
    pub const fn typescript() -> Self {
        Self { tsx: false }
    }

    pub const fn tsx() -> Self {
        Self { tsx: true }
    }
}

impl LanguageAdapter for TypeScriptAdapter {
    fn language(&self) -> SupportedLanguage {
        if self.tsx {
            SupportedLanguage::Tsx
        } else {
            SupportedLanguage::TypeScript
        }
    }

    fn grammar(&self) -> &'static Grammar {
        &GRAMMAR
    }

    fn entity_kind(&self, node: &Node, _source: &str) -> Option<EntityKind> {
        script_entity_kind(node, ABSTRACT_CLASSES)
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

        match node.kind() {
            "non_null_expression" => {
                tags.insert(CodeProperty::HasUnaryOp);
            }
            "import_alias" | "import_require_clause" => {
                tags.insert(CodeProperty::HasImport);
            }
            _ => {}
        }
    }

    fn is_decision_point(&self, node: &Node, source: &str) -> bool {
        is_script_decision_point(node, source, &GRAMMAR)
    }

    fn has_decorator(&self, node: &Node, _source: &str) -> bool {
        has_attached(node, &["decorator"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::extract_entities;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const SOURCE: &str = r#"interface Shape {
  area(): number;
}

type Id = string;

abstract class Base implements Shape {
  abstract area(): number;

  describe(): string {
    return `area ${this.area()}`;
  }
}

export class Square extends Base implements Shape, Printable {
  constructor(private side: number) {
    super();
  }

  area(): number {
    return this.side! * this.side;
  }
}

export const scale = (value: number, factor: number): number => value * factor;
"#;

    #[test]
    fn test_typescript_skips_bodyless_declarations() {
        let entities = extract_entities(
            &TypeScriptAdapter::typescript(),
            Path::new("shapes.ts"),
            SOURCE,
            None,
        );
        let names: Vec<&str> = entities.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["Base", "describe", "Square", "constructor", "area", "scale"]
        );
    }

    #[test]
    fn test_typescript_composes_javascript_tags() {
        let entities = extract_entities(
            &TypeScriptAdapter::typescript(),
            Path::new("shapes.ts"),
            SOURCE,
            None,
        );
        let area = &entities[4];
        assert!(area.has_tag(CodeProperty::HasReturn));
        assert!(area.has_tag(CodeProperty::HasArithmetic));
        assert!(area.has_tag(CodeProperty::HasUnaryOp));
        assert_eq!(area.signature(), "area(): number");

        let square = &entities[2];
        assert!(square.has_tag(CodeProperty::HasParent));
        assert_eq!(
            square.signature(),
            "class Square extends Base implements Shape, Printable"
        );

        let scale = &entities[5];
        assert_eq!(
            scale.signature(),
            "const scale = (value: number, factor: number): number"
        );
    }

    #[test]
    fn test_tsx_dialect() {
        let source = "function View() {\n  return <div>hi</div>;\n}\n";
        let entities =
            extract_entities(&TypeScriptAdapter::tsx(), Path::new("view.tsx"), source, None);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].language(), SupportedLanguage::Tsx);
    }
}
