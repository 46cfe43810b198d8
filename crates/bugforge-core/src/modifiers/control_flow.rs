//! Control-flow modifiers: if/else inversion and statement shuffling.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tree_sitter::Node;

use super::{ModifierSpec, Target, UNBOUNDED};
use crate::edits::{Edit, EditList};
use crate::entity::{BugRewrite, CodeEntity, CodeProperty};
use crate::grammar::Grammar;
use crate::syntax::{children_by_field, descendants_of_kinds, named_children, Span};

/// Kinds that close the statement run of a Ruby `body_statement`.
const CLAUSE_KINDS: &[&str] = &["rescue", "else", "ensure"];

procedural_modifier!(
    /// Swap the bodies of an if-statement and its else branch.
    ControlIfElseInvert,
    ModifierSpec {
        name: "func_pm_ctrl_invert_if",
        explanation: "The if and else branches of a conditional have been swapped.",
        conditions: &[CodeProperty::IsFunction, CodeProperty::HasIfElse],
        min_complexity: 5,
        max_complexity: UNBOUNDED,
        max_attempts: 1,
        likelihood: 0.9,
    }
);

impl ControlIfElseInvert {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        let grammar = target.grammar;

        let mut edits = EditList::new();
        for if_node in descendants_of_kinds(target.node, grammar.if_kinds) {
            let Some((then_span, else_span)) = invertible_branches(&if_node, grammar) else {
                continue;
            };
            if edits.overlaps(&then_span) || edits.overlaps(&else_span) {
                continue;
            }
            if !self.base.flip() {
                continue;
            }

            let then_text = then_span.text(target.source);
            let else_text = else_span.text(target.source);
            if edits.push(Edit::replace(then_span, else_text)).is_ok()
                && edits.push(Edit::replace(else_span, then_text)).is_err()
            {
                // Spans come from sibling subtrees; a clash means a malformed tree.
                return None;
            }
        }

        self.base.finish(entity, &edits)
    }
}

/// Spans of the then-branch and else-branch of an if with a plain else.
///
/// `None` for ifs without an else, with elif/else-if chains, or whose else
/// branch is itself an if.
fn invertible_branches(if_node: &Node, grammar: &Grammar) -> Option<(Span, Span)> {
    let alternatives = children_by_field(if_node, "alternative");
    let [alternative] = alternatives.as_slice() else {
        return None;
    };
    if grammar.elif_kinds.contains(&alternative.kind()) || grammar.is_if(alternative.kind()) {
        return None;
    }

    let else_body = if grammar.else_kinds.contains(&alternative.kind()) {
        if grammar.inline_branch_kinds.contains(&alternative.kind()) {
            *alternative
        } else {
            alternative.child_by_field_name("body").or_else(|| {
                named_children(alternative)
                    .into_iter()
                    .find(|child| !grammar.is_comment(child.kind()))
            })?
        }
    } else {
        *alternative
    };
    if grammar.is_if(else_body.kind()) {
        return None;
    }

    let consequence = if_node.child_by_field_name(grammar.consequence_field)?;
    let then_span = branch_span(&consequence, grammar)?;
    let else_span = branch_span(&else_body, grammar)?;
    if then_span.overlaps(&else_span) {
        return None;
    }
    Some((then_span, else_span))
}

/// Span of a branch body; keyword-led branch nodes contribute only their statements.
fn branch_span(node: &Node, grammar: &Grammar) -> Option<Span> {
    if !grammar.inline_branch_kinds.contains(&node.kind()) {
        return Some(Span::of(node));
    }
    let statements = named_children(node);
    let first = statements.first()?;
    let last = statements.last()?;
    Some(Span::new(first.start_byte(), last.end_byte()))
}

procedural_modifier!(
    /// Randomly permute the top-level statements of a function body.
    ControlShuffleLines,
    ModifierSpec {
        name: "func_pm_ctrl_shuffle",
        explanation: "The statements of the function body have been reordered.",
        conditions: &[CodeProperty::IsFunction, CodeProperty::HasLoop],
        min_complexity: 1,
        max_complexity: 10,
        max_attempts: 3,
        likelihood: 1.0,
    }
);

impl ControlShuffleLines {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        let body = target.adapter.body(&target.node)?;
        if !target.grammar.block_kinds.contains(&body.kind()) {
            return None;
        }

        let statements = body_statements(&body, target.grammar);
        if statements.len() < 2 || !self.base.flip() {
            return None;
        }

        for _ in 0..self.base.max_attempts() {
            let order = shuffled_order(statements.len(), self.base.rng_mut());
            let mut edits = EditList::new();
            for (slot, source_idx) in statements.iter().zip(&order) {
                let text = target.text(&statements[*source_idx]);
                edits.push(Edit::replace(Span::of(slot), text)).ok()?;
            }
            if let Some(bug) = self.base.finish(entity, &edits) {
                return Some(bug);
            }
        }
        None
    }
}

/// Random permutation of `0..len` that is never the identity.
pub(crate) fn shuffled_order(len: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    if order.iter().enumerate().all(|(idx, value)| idx == *value) {
        order.swap(0, 1);
    }
    order
}

/// Direct statements of a block, skipping comments. A trailing value
/// expression (Rust block tail) is left out so it stays last.
pub(crate) fn body_statements<'t>(block: &Node<'t>, grammar: &Grammar) -> Vec<Node<'t>> {
    let mut children: Vec<Node<'t>> = named_children(block)
        .into_iter()
        .filter(|child| !grammar.is_comment(child.kind()))
        .collect();

    if let [only] = children.as_slice() {
        if grammar.statement_list_kinds.contains(&only.kind()) {
            let list = *only;
            children = named_children(&list)
                .into_iter()
                .filter(|child| !grammar.is_comment(child.kind()))
                .collect();
        }
    }

    let mut statements: Vec<Node<'t>> = children
        .into_iter()
        .take_while(|child| !CLAUSE_KINDS.contains(&child.kind()))
        .collect();
    if !grammar.statement_kinds.is_empty()
        && statements
            .last()
            .is_some_and(|last| !grammar.statement_kinds.contains(&last.kind()))
    {
        statements.pop();
    }
    statements
}
