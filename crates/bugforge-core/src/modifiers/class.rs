//! Class-level modifiers: base removal, method removal and method shuffling.

use rand::Rng;
use tree_sitter::Node;

use super::control_flow::shuffled_order;
use super::remove::removal_edits;
use super::{ModifierSpec, Target, UNBOUNDED};
use crate::edits::{Edit, EditList};
use crate::entity::{BugRewrite, CodeEntity, CodeProperty};
use crate::grammar::Grammar;
use crate::syntax::{children, descendants_of_kinds, named_children, node_text, Span};

/// Base-list entries that are not base classes (`metaclass=...`).
const NON_BASE_KINDS: &[&str] = &["keyword_argument", "comment"];

procedural_modifier!(
    /// Drop one base class or interface from a class declaration.
    ClassRemoveBases,
    ModifierSpec {
        name: "func_pm_class_rm_base",
        explanation: "A base class has been removed from the class definition.",
        conditions: &[CodeProperty::IsClass, CodeProperty::HasParent],
        min_complexity: 1,
        max_complexity: UNBOUNDED,
        max_attempts: 1,
        likelihood: 0.5,
    }
);

impl ClassRemoveBases {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        let candidates = base_removals(&target);
        if candidates.is_empty() || !self.base.flip() {
            return None;
        }

        let pick = candidates[self.base.rng_mut().random_range(0..candidates.len())];
        let mut edits = EditList::new();
        edits.push(Edit::delete(pick)).ok()?;
        self.base.finish(entity, &edits)
    }
}

/// Deletion spans, one per removable base reference.
///
/// A sole entry takes its whole clause (and the whitespace before it) with
/// it; otherwise the entry goes together with one adjacent comma.
fn base_removals(target: &Target) -> Vec<Span> {
    let grammar = target.grammar;
    let mut spans = Vec::new();

    for list in grammar.base_lists(&target.node) {
        let holder = grammar.base_items_holder(&list);
        let groups = comma_groups(&holder);

        if let [only] = groups.as_slice() {
            if only.is_base {
                let start = list.start_byte();
                let prefix = target.source.get(..start).unwrap_or("");
                let trimmed = prefix.trim_end_matches([' ', '\t']).len();
                spans.push(Span::new(trimmed, list.end_byte()));
            }
            continue;
        }

        for (idx, group) in groups.iter().enumerate() {
            if !group.is_base {
                continue;
            }
            let span = match (groups.get(idx + 1), group.preceding_comma) {
                (Some(next), _) => Span::new(group.start, next.start),
                (None, Some(comma)) => Span::new(comma, group.end),
                (None, None) => Span::new(group.start, group.end),
            };
            spans.push(span);
        }
    }
    spans
}

/// Comma-separated entry of a base list.
struct BaseGroup {
    start: usize,
    end: usize,
    preceding_comma: Option<usize>,
    is_base: bool,
}

fn comma_groups(holder: &Node) -> Vec<BaseGroup> {
    let mut groups = Vec::new();
    let mut current: Option<BaseGroup> = None;
    let mut last_comma: Option<usize> = None;

    for child in children(holder) {
        if child.kind() == "," {
            groups.extend(current.take());
            last_comma = Some(child.start_byte());
            continue;
        }
        if !child.is_named() || child.is_extra() {
            continue;
        }
        let group = current.get_or_insert(BaseGroup {
            start: child.start_byte(),
            end: child.end_byte(),
            preceding_comma: last_comma,
            is_base: true,
        });
        group.end = child.end_byte();
        if NON_BASE_KINDS.contains(&child.kind()) {
            group.is_base = false;
        }
    }
    groups.extend(current);
    groups
}

procedural_modifier!(
    /// Remove a random subset of methods and neutralize calls to them.
    ClassRemoveFuncs,
    ModifierSpec {
        name: "func_pm_class_rm_funcs",
        explanation: "One or more methods have been removed from the class.",
        conditions: &[CodeProperty::IsClass],
        min_complexity: 1,
        max_complexity: UNBOUNDED,
        max_attempts: 3,
        likelihood: 0.3,
    }
);

impl ClassRemoveFuncs {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        let methods = class_methods(&target)?;
        if methods.is_empty() {
            return None;
        }

        for _ in 0..self.base.max_attempts() {
            let removed: Vec<Node> = methods
                .iter()
                .copied()
                .filter(|_| self.base.flip())
                .collect();
            if removed.is_empty() {
                continue;
            }

            let mut edits = removal_edits(&target, &removed);
            let names: Vec<String> = removed
                .iter()
                .filter_map(|method| member_name(method, target.source))
                .collect();
            neutralize_calls(&target, &names, &mut edits);

            if let Some(bug) = self.base.finish(entity, &edits) {
                return Some(bug);
            }
        }
        None
    }
}

/// Replace `self.name(...)`-style calls to removed methods with the null literal.
fn neutralize_calls(target: &Target, names: &[String], edits: &mut EditList) {
    let grammar = target.grammar;
    for call in descendants_of_kinds(target.node, grammar.call_kinds) {
        let text = target.text(&call);
        let calls_removed = grammar.self_prefixes.iter().any(|prefix| {
            names.iter().any(|name| {
                text.strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix(name.as_str()))
                    .is_some_and(|rest| rest.is_empty() || rest.trim_start().starts_with('('))
            })
        });
        if calls_removed {
            edits.try_push(Edit::replace(Span::of(&call), grammar.null_literal));
        }
    }
}

procedural_modifier!(
    /// Reorder method declarations; other members keep their slots.
    ClassShuffleMethods,
    ModifierSpec {
        name: "func_pm_class_shuffle_funcs",
        explanation: "The methods of the class have been reordered.",
        conditions: &[CodeProperty::IsClass],
        min_complexity: 1,
        max_complexity: UNBOUNDED,
        max_attempts: 3,
        likelihood: 1.0,
    }
);

impl ClassShuffleMethods {
    fn mutate(&mut self, entity: &CodeEntity) -> Option<BugRewrite> {
        let target = Target::of(entity)?;
        let methods = class_methods(&target)?;
        if methods.len() < 2 || !self.base.flip() {
            return None;
        }

        for _ in 0..self.base.max_attempts() {
            let order = shuffled_order(methods.len(), self.base.rng_mut());
            let mut edits = EditList::new();
            for (slot, source_idx) in methods.iter().zip(&order) {
                let text = target.text(&methods[*source_idx]);
                edits.push(Edit::replace(Span::of(slot), text)).ok()?;
            }
            if let Some(bug) = self.base.finish(entity, &edits) {
                return Some(bug);
            }
        }
        None
    }
}

/// Method members declared directly in the class body.
fn class_methods<'e>(target: &Target<'e>) -> Option<Vec<Node<'e>>> {
    let body = target.adapter.body(&target.node)?;
    Some(methods_in(&body, target.grammar))
}

fn methods_in<'t>(body: &Node<'t>, grammar: &Grammar) -> Vec<Node<'t>> {
    named_children(body)
        .into_iter()
        .filter(|child| grammar.method_kinds.contains(&child.kind()))
        .collect()
}

/// Declared name of a method, looking through decorators and declarators.
fn member_name(node: &Node, source: &str) -> Option<String> {
    let mut current = *node;
    loop {
        if let Some(name) = current.child_by_field_name("name") {
            return Some(node_text(&name, source).to_string());
        }
        if matches!(current.kind(), "identifier" | "field_identifier") {
            return Some(node_text(&current, source).to_string());
        }
        current = current
            .child_by_field_name("definition")
            .or_else(|| current.child_by_field_name("declarator"))?;
    }
}
