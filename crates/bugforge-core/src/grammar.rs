//! Per-language node-kind tables consumed by the modifier framework.
//!
//! Each language adapter publishes one static [`Grammar`] describing which
//! tree-sitter node kinds play which structural role (if-statements, loops,
//! binary expressions, class bodies, ...). Modifiers are written once against
//! these tables instead of once per language.

use tree_sitter::Node;

use crate::syntax::{find_child_of_kinds, named_children};

/// Broad category of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCategory {
    Arithmetic,
    Bitwise,
    Comparison,
    Logical,
}

/// Operator equivalence classes and opposites for one language.
#[derive(Debug)]
pub struct OperatorTable {
    pub arithmetic: &'static [&'static str],
    pub bitwise: &'static [&'static str],
    pub comparison: &'static [&'static str],
    pub logical: &'static [&'static [&'static str]],
    /// Symmetric 1:1 opposites (`==`/`!=`, `<`/`>=`, ...)
    pub flips: &'static [(&'static str, &'static str)],
}

/// Comparison operators whose direction changes when operands are swapped.
const ORDERING_MIRRORS: &[(&str, &str)] = &[("<", ">"), ("<=", ">="), (">", "<"), (">=", "<=")];

impl OperatorTable {
    /// Category of an operator, if it belongs to any class.
    pub fn category(&self, op: &str) -> Option<OperatorCategory> {
        if self.arithmetic.contains(&op) {
            Some(OperatorCategory::Arithmetic)
        } else if self.bitwise.contains(&op) {
            Some(OperatorCategory::Bitwise)
        } else if self.comparison.contains(&op) {
            Some(OperatorCategory::Comparison)
        } else if self.logical.iter().any(|class| class.contains(&op)) {
            Some(OperatorCategory::Logical)
        } else {
            None
        }
    }

    /// Equivalence class containing `op`.
    pub fn class_of(&self, op: &str) -> Option<&'static [&'static str]> {
        if self.arithmetic.contains(&op) {
            return Some(self.arithmetic);
        }
        if self.bitwise.contains(&op) {
            return Some(self.bitwise);
        }
        if self.comparison.contains(&op) {
            return Some(self.comparison);
        }
        self.logical.iter().copied().find(|class| class.contains(&op))
    }

    /// Fixed logical opposite of `op`.
    pub fn flip(&self, op: &str) -> Option<&'static str> {
        self.flips.iter().find_map(|(a, b)| {
            if *a == op {
                Some(*b)
            } else if *b == op {
                Some(*a)
            } else {
                None
            }
        })
    }

    /// Operator to use after swapping operands (`<` becomes `>`, `==` stays).
    pub fn mirror(&self, op: &str) -> Option<&'static str> {
        ORDERING_MIRRORS
            .iter()
            .find(|(from, _)| *from == op)
            .map(|(_, to)| *to)
    }

    /// Ordering comparisons are the usual source of off-by-one bugs.
    pub fn is_ordering(&self, op: &str) -> bool {
        ORDERING_MIRRORS.iter().any(|(from, _)| *from == op)
    }
}

/// Opposites shared by the C family.
pub const C_FLIPS: &[(&str, &str)] = &[
    ("==", "!="),
    ("<", ">="),
    (">", "<="),
    ("&&", "||"),
    ("+", "-"),
    ("*", "/"),
    ("&", "|"),
    ("<<", ">>"),
];

pub static C_OPERATORS: OperatorTable = OperatorTable {
    arithmetic: &["+", "-", "*", "/", "%"],
    bitwise: &["&", "|", "^", "<<", ">>"],
    comparison: &["==", "!=", "<", "<=", ">", ">="],
    logical: &[&["&&", "||"]],
    flips: C_FLIPS,
};

/// Node kinds that play structural roles in one grammar.
#[derive(Debug)]
pub struct Grammar {
    /// if-statements / if-expressions
    pub if_kinds: &'static [&'static str],
    /// Field holding the if's "then" branch
    pub consequence_field: &'static str,
    /// Wrappers that hold an else body (`else_clause`, Ruby `else`)
    pub else_kinds: &'static [&'static str],
    /// Else-if continuations (`elif_clause`, `else_if_clause`, `elsif`)
    pub elif_kinds: &'static [&'static str],
    /// Branch nodes whose own text starts with a keyword; only their named
    /// children form the branch body
    pub inline_branch_kinds: &'static [&'static str],
    pub loop_kinds: &'static [&'static str],
    /// Assignment and declaration constructs (expression or statement level)
    pub assignment_kinds: &'static [&'static str],
    /// try/with/using/lock/begin blocks
    pub wrapper_kinds: &'static [&'static str],
    pub binary_kinds: &'static [&'static str],
    pub paren_kinds: &'static [&'static str],
    pub number_kinds: &'static [&'static str],
    /// Statement wrappers around expressions (`expression_statement`)
    pub statement_wrapper_kinds: &'static [&'static str],
    /// Containers whose children are statements
    pub block_kinds: &'static [&'static str],
    /// Node kinds that only hold a statement sequence inside a block
    pub statement_list_kinds: &'static [&'static str],
    /// Block children that are statements, for grammars whose blocks may end
    /// in a value expression; empty when every block child is a statement
    pub statement_kinds: &'static [&'static str],
    pub comment_kinds: &'static [&'static str],
    /// Class member kinds treated as methods
    pub method_kinds: &'static [&'static str],
    /// Containers of base-class references
    pub base_list_kinds: &'static [&'static str],
    /// Intermediate nodes between a class and its base lists
    pub base_container_kinds: &'static [&'static str],
    /// Nested list kinds inside a base list (`type_list`)
    pub base_inner_list_kinds: &'static [&'static str],
    /// Call expression kinds
    pub call_kinds: &'static [&'static str],
    /// Prefixes of same-class member calls (`self.`, `this.`, `$this->`)
    pub self_prefixes: &'static [&'static str],
    /// Literal used to neutralize calls to removed methods
    pub null_literal: &'static str,
    /// Statement inserted when a block would become empty
    pub empty_block_filler: Option<&'static str>,
    pub operators: &'static OperatorTable,
}

impl Grammar {
    pub fn is_if(&self, kind: &str) -> bool {
        self.if_kinds.contains(&kind)
    }

    pub fn is_loop(&self, kind: &str) -> bool {
        self.loop_kinds.contains(&kind)
    }

    pub fn is_binary(&self, kind: &str) -> bool {
        self.binary_kinds.contains(&kind)
    }

    pub fn is_comment(&self, kind: &str) -> bool {
        self.comment_kinds.contains(&kind)
    }

    pub fn has_wrappers(&self) -> bool {
        !self.wrapper_kinds.is_empty()
    }

    /// Non-empty base-class lists attached to a class node.
    pub fn base_lists<'t>(&self, class: &Node<'t>) -> Vec<Node<'t>> {
        let mut lists = Vec::new();
        let mut cursor = class.walk();
        for child in class.children(&mut cursor) {
            if self.base_list_kinds.contains(&child.kind()) {
                lists.push(child);
            } else if self.base_container_kinds.contains(&child.kind()) {
                let mut inner = child.walk();
                lists.extend(
                    child
                        .children(&mut inner)
                        .filter(|c| self.base_list_kinds.contains(&c.kind())),
                );
            }
        }
        lists.retain(|list| !named_children(list).is_empty());
        lists
    }

    /// Node holding the comma-separated base references of `list`.
    pub fn base_items_holder<'t>(&self, list: &Node<'t>) -> Node<'t> {
        find_child_of_kinds(list, self.base_inner_list_kinds).unwrap_or(*list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_classes() {
        assert_eq!(C_OPERATORS.category("+"), Some(OperatorCategory::Arithmetic));
        assert_eq!(C_OPERATORS.category("<<"), Some(OperatorCategory::Bitwise));
        assert_eq!(C_OPERATORS.category(">="), Some(OperatorCategory::Comparison));
        assert_eq!(C_OPERATORS.category("||"), Some(OperatorCategory::Logical));
        assert_eq!(C_OPERATORS.category("??"), None);
        assert_eq!(C_OPERATORS.class_of("%").unwrap().len(), 5);
    }

    #[test]
    fn test_flip_is_symmetric() {
        for (a, b) in C_FLIPS {
            assert_eq!(C_OPERATORS.flip(a), Some(*b));
            assert_eq!(C_OPERATORS.flip(b), Some(*a));
        }
        assert_eq!(C_OPERATORS.flip("%"), None);
    }

    #[test]
    fn test_mirror() {
        assert_eq!(C_OPERATORS.mirror("<"), Some(">"));
        assert_eq!(C_OPERATORS.mirror(">="), Some("<="));
        assert_eq!(C_OPERATORS.mirror("=="), None);
        assert!(C_OPERATORS.is_ordering("<="));
        assert!(!C_OPERATORS.is_ordering("!="));
    }
}
