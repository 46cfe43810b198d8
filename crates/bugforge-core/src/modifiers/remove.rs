//! Removal modifiers: delete whole loop, conditional, assignment or wrapper
//! statements, each occurrence gated by its own draw.

use std::collections::HashMap;

use tree_sitter::Node;

use super::{ModifierSpec, ProceduralModifier, Target, UNBOUNDED};
use crate::edits::{Edit, EditList};
use crate::entity::{BugRewrite, CodeEntity, CodeProperty};
use crate::grammar::Grammar;
use crate::syntax::{descendants_of_kinds, line_indent, line_start, named_children, whole_line_span, Span};

procedural_modifier!(
    /// Delete loop statements.
    RemoveLoop,
    ModifierSpec {
        name: "func_pm_remove_loop",
        explanation: "A loop statement has been removed from the function.",
        conditions: &[CodeProperty::IsFunction, CodeProperty::HasLoop],
        min_complexity: 1,
        max_complexity: UNBOUNDED,
        max_attempts: 1,
        likelihood: 0.5,
    }
);

impl RemoveLoop {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        remove_matching(&mut self.base, entity, &target, target.grammar.loop_kinds)
    }
}

procedural_modifier!(
    /// Delete if-statements together with their else branches.
    RemoveConditional,
    ModifierSpec {
        name: "func_pm_remove_cond",
        explanation: "A conditional statement has been removed from the function.",
        conditions: &[CodeProperty::IsFunction, CodeProperty::HasIf],
        min_complexity: 1,
        max_complexity: UNBOUNDED,
        max_attempts: 1,
        likelihood: 0.5,
    }
);

impl RemoveConditional {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        remove_matching(&mut self.base, entity, &target, target.grammar.if_kinds)
    }
}

procedural_modifier!(
    /// Delete assignment and declaration statements.
    RemoveAssign,
    ModifierSpec {
        name: "func_pm_remove_assign",
        explanation: "An assignment statement has been removed from the function.",
        conditions: &[CodeProperty::IsFunction, CodeProperty::HasAssignment],
        min_complexity: 1,
        max_complexity: UNBOUNDED,
        max_attempts: 1,
        likelihood: 0.3,
    }
);

impl RemoveAssign {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        remove_matching(&mut self.base, entity, &target, target.grammar.assignment_kinds)
    }
}

procedural_modifier!(
    /// Delete try/with/using/lock/begin blocks.
    RemoveWrapper,
    ModifierSpec {
        name: "func_pm_remove_wrapper",
        explanation: "A wrapping block (try/with/using/lock) has been removed from the function.",
        conditions: &[CodeProperty::IsFunction, CodeProperty::HasWrapper],
        min_complexity: 1,
        max_complexity: UNBOUNDED,
        max_attempts: 1,
        likelihood: 0.5,
    }
);

impl RemoveWrapper {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        remove_matching(&mut self.base, entity, &target, target.grammar.wrapper_kinds)
    }
}

/// Remove statements of `kinds`, each independently with probability `likelihood`.
fn remove_matching(
    base: &mut ProceduralModifier,
    entity: &CodeEntity,
    target: &Target,
    kinds: &[&str],
) -> Option<BugRewrite> {
    let grammar = target.grammar;
    let mut chosen: Vec<Node> = Vec::new();

    for candidate in descendants_of_kinds(target.node, kinds) {
        if candidate.id() == target.node.id() {
            continue;
        }
        let Some(statement) = statement_of(candidate, grammar, &target.node) else {
            continue;
        };
        let span = Span::of(&statement);
        if chosen.iter().any(|c| Span::of(c).overlaps(&span)) {
            continue;
        }
        if base.flip() {
            chosen.push(statement);
        }
    }

    let edits = removal_edits(target, &chosen);
    base.finish(entity, &edits)
}

/// The statement that carries `node`: lifted through statement wrappers and
/// required to sit directly in a block strictly inside `root`.
pub(crate) fn statement_of<'t>(node: Node<'t>, grammar: &Grammar, root: &Node<'t>) -> Option<Node<'t>> {
    let mut statement = node;
    while let Some(parent) = statement.parent() {
        if !grammar.statement_wrapper_kinds.contains(&parent.kind()) {
            break;
        }
        statement = parent;
    }

    let parent = statement.parent()?;
    if !grammar.block_kinds.contains(&parent.kind()) {
        return None;
    }

    let span = Span::of(&statement);
    let root_span = Span::of(root);
    (root_span.contains(&span) && span != root_span).then_some(statement)
}

/// Deletion edits for whole statements.
///
/// Statements alone on their lines take the lines with them. In grammars with
/// an empty-block filler, a block whose every statement is removed keeps the
/// filler in place of its last statement.
pub(crate) fn removal_edits(target: &Target, statements: &[Node]) -> EditList {
    let source = target.source;
    let mut removals: Vec<(Node, Span)> = statements
        .iter()
        .map(|stmt| (*stmt, whole_line_span(source, Span::of(stmt))))
        .collect();
    removals.sort_by_key(|(_, span)| span.start);

    let mut fillers: HashMap<usize, String> = HashMap::new();
    if let Some(filler) = target.grammar.empty_block_filler {
        let mut per_block: HashMap<usize, (Node, usize)> = HashMap::new();
        for (stmt, _) in &removals {
            if let Some(parent) = stmt.parent() {
                per_block.entry(parent.id()).or_insert((parent, 0)).1 += 1;
            }
        }

        for (block, removed) in per_block.values() {
            let remaining = named_children(block)
                .into_iter()
                .filter(|child| !target.grammar.is_comment(child.kind()))
                .count();
            if remaining > *removed {
                continue;
            }
            let last = removals
                .iter()
                .enumerate()
                .filter(|(_, (stmt, _))| stmt.parent().is_some_and(|p| p.id() == block.id()))
                .map(|(idx, _)| idx)
                .next_back();
            if let Some(idx) = last {
                let (stmt, span) = removals[idx];
                let replacement = if span.start == line_start(source, span.start) {
                    let newline = if span.text(source).ends_with('\n') { "\n" } else { "" };
                    format!("{}{filler}{newline}", line_indent(source, stmt.start_byte()))
                } else {
                    filler.to_string()
                };
                fillers.insert(idx, replacement);
            }
        }
    }

    let mut edits = EditList::new();
    for (idx, (_, span)) in removals.iter().enumerate() {
        let replacement = fillers.remove(&idx).unwrap_or_default();
        edits.try_push(Edit::replace(*span, replacement));
    }
    edits
}
