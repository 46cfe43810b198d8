//! Uniform read-only view over tree-sitter syntax trees.
//!
//! Every grammar is driven through the same `tree_sitter::Node` API, so the
//! helpers here (text slicing, pre-order walks, child lookup) are shared by all
//! language adapters and modifiers.

use tree_sitter::Node;

/// Control value returned by a pre-order visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Visit the node's children next
    Continue,
    /// Skip the node's subtree
    SkipChildren,
    /// Abort the whole traversal
    Stop,
}

/// Byte range `[start, end)` in a source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span covered by a node.
    pub fn of(node: &Node) -> Self {
        Self::new(node.start_byte(), node.end_byte())
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies entirely inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two spans share at least one byte (or the same insertion point).
    pub fn overlaps(&self, other: &Span) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.start == other.start
                || (self.start > other.start && self.start < other.end)
                || (other.start > self.start && other.start < self.end);
        }
        self.start < other.end && other.start < self.end
    }

    /// Text covered by this span, or an empty string when out of bounds.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

/// Get the source text of a node.
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    Span::of(node).text(source)
}

/// Visit `root` and its descendants in document pre-order.
///
/// Returns `false` if the visitor stopped the traversal early.
pub fn walk_preorder<'t, F>(root: Node<'t>, mut visit: F) -> bool
where
    F: FnMut(Node<'t>) -> Walk,
{
    let mut cursor = root.walk();
    loop {
        let descend = match visit(cursor.node()) {
            Walk::Stop => return false,
            Walk::Continue => true,
            Walk::SkipChildren => false,
        };

        if descend && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.node().id() == root.id() {
                return true;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return true;
            }
        }
    }
}

/// Collect all named descendants (including `root`) whose kind is in `kinds`,
/// in pre-order. Anonymous tokens are skipped: Ruby keywords share their
/// construct's kind name.
pub fn descendants_of_kinds<'t>(root: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    walk_preorder(root, |node| {
        if node.is_named() && kinds.contains(&node.kind()) {
            found.push(node);
        }
        Walk::Continue
    });
    found
}

/// Collect the named children of a node.
pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Collect all children (named and anonymous) of a node.
pub fn children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Collect every child stored under `field`.
pub fn children_by_field<'t>(node: &Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Check if a node has a child of the specified kind.
pub fn has_child_of_kind(node: &Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == kind);
    found
}

/// Find the first child whose kind is in `kinds`.
pub fn find_child_of_kinds<'t>(node: &Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let result = node
        .children(&mut cursor)
        .find(|child| kinds.contains(&child.kind()));
    result
}

/// Find the nearest ancestor whose kind is in `kinds`.
pub fn find_ancestor_of_kinds<'t>(node: &Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if kinds.contains(&parent.kind()) {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

/// Strip any number of enclosing parenthesized-expression wrappers.
pub fn unwrap_parens<'t>(node: Node<'t>, paren_kinds: &[&str]) -> Node<'t> {
    let mut current = node;
    while paren_kinds.contains(&current.kind()) {
        let inner = named_children(&current);
        match inner.as_slice() {
            [only] => current = *only,
            _ => break,
        }
    }
    current
}

/// Operands and operator of a binary expression.
#[derive(Debug, Clone, Copy)]
pub struct BinaryParts<'t> {
    pub left: Node<'t>,
    pub operator: Node<'t>,
    pub right: Node<'t>,
}

/// Split a binary expression into its operands and operator.
///
/// The operator comes from the `operator` field (or a lone `operators` entry,
/// as in Python comparisons). Operands come from the `left`/`right` fields, or
/// from the two named children around the operator. Chained comparisons with
/// several operators yield `None`.
pub fn binary_parts<'t>(node: &Node<'t>) -> Option<BinaryParts<'t>> {
    let operator = match node.child_by_field_name("operator") {
        Some(op) => op,
        None => match children_by_field(node, "operators").as_slice() {
            [only] => *only,
            _ => return None,
        },
    };

    if let (Some(left), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) {
        return Some(BinaryParts {
            left,
            operator,
            right,
        });
    }

    let operands: Vec<Node<'t>> = named_children(node)
        .into_iter()
        .filter(|child| child.id() != operator.id() && !child.is_extra())
        .collect();
    match operands.as_slice() {
        [left, right] => Some(BinaryParts {
            left: *left,
            operator,
            right: *right,
        }),
        _ => None,
    }
}

/// Whether any node in the subtree is an error or a missing node.
pub fn is_error_node(node: &Node) -> bool {
    node.is_error() || node.is_missing()
}

/// Byte offset of the start of the line containing `offset`.
pub fn line_start(source: &str, offset: usize) -> usize {
    source
        .get(..offset)
        .and_then(|prefix| prefix.rfind('\n'))
        .map(|idx| idx + 1)
        .unwrap_or(0)
}

/// Byte offset just past the newline terminating the line containing `offset`
/// (or the end of the source).
pub fn line_end_inclusive(source: &str, offset: usize) -> usize {
    source
        .get(offset..)
        .and_then(|rest| rest.find('\n'))
        .map(|idx| offset + idx + 1)
        .unwrap_or(source.len())
}

/// Leading whitespace of the line containing `offset`.
pub fn line_indent(source: &str, offset: usize) -> &str {
    let start = line_start(source, offset);
    let line = source.get(start..).unwrap_or("");
    let width = line
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    &line[..width]
}

/// Extend a node span so that deleting it removes whole lines when the node
/// is the only thing on them.
pub fn whole_line_span(source: &str, span: Span) -> Span {
    let mut result = span;

    let ls = line_start(source, span.start);
    let before = source.get(ls..span.start).unwrap_or("");
    let owns_start = before.chars().all(|c| c == ' ' || c == '\t');

    let le = line_end_inclusive(source, span.end);
    let after = source.get(span.end..le).unwrap_or("");
    let owns_end = after.trim().is_empty() || after.trim() == ";";

    if owns_start && owns_end {
        result.start = ls;
        result.end = le;
    }
    result
}
