//! Procedural modifiers: seeded structural mutations over extracted entities.
//!
//! Every modifier wraps a [`ProceduralModifier`] (name, eligibility
//! conditions, complexity bounds, likelihood and an owned seeded generator)
//! and implements [`Modifier::modify`]. Modifiers never touch the entity; they
//! collect byte-range edits against the entity's original syntax tree and
//! return the rewritten text as a [`BugRewrite`].
//!
//! ## Families
//!
//! - [`control_flow`]: branch inversion and statement shuffling
//! - [`operations`]: binary operator, operand and constant perturbation
//! - [`remove`]: loop/conditional/assignment/wrapper deletion
//! - [`class`]: base-class removal, method removal and method shuffling
//!
//! ## Randomness
//!
//! Each candidate edit is gated by an independent [`ProceduralModifier::flip`]
//! draw with probability `likelihood`. For a fixed seed the sequence of draws
//! is reproducible as long as the modifier sees the same entities in the same
//! order; [`ProceduralModifier::reseed`] pins it again.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, trace};
use tree_sitter::Node;

use crate::adapters::LanguageAdapter;
use crate::edits::EditList;
use crate::entity::{BugRewrite, CodeEntity, CodeProperty, PropertySet};
use crate::grammar::Grammar;
use crate::parser::SupportedLanguage;
use crate::syntax::node_text;

/// Declare a modifier type backed by a [`ProceduralModifier`] built from `SPEC`.
///
/// The type must provide an inherent `fn mutate(&mut self, &CodeEntity) -> Option<BugRewrite>`.
macro_rules! procedural_modifier {
    ($(#[$meta:meta])* $ty:ident, $spec:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $ty {
            base: $crate::modifiers::ProceduralModifier,
        }

        impl $ty {
            /// Default parameters of this modifier.
            pub const SPEC: $crate::modifiers::ModifierSpec = $spec;

            pub fn new(language: $crate::parser::SupportedLanguage, seed: u64) -> Self {
                Self {
                    base: $crate::modifiers::ProceduralModifier::from_spec(&Self::SPEC, language, seed),
                }
            }

            /// Override the per-candidate probability.
            pub fn with_likelihood(mut self, likelihood: f64) -> Self {
                self.base.set_likelihood(likelihood);
                self
            }
        }

        impl $crate::modifiers::Modifier for $ty {
            fn base(&self) -> &$crate::modifiers::ProceduralModifier {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $crate::modifiers::ProceduralModifier {
                &mut self.base
            }

            fn modify(
                &mut self,
                entity: &$crate::entity::CodeEntity,
            ) -> Option<$crate::entity::BugRewrite> {
                self.mutate(entity)
            }
        }

        impl $crate::modifiers::Seeded for $ty {
            const SPEC: $crate::modifiers::ModifierSpec = $spec;

            fn seeded(language: $crate::parser::SupportedLanguage, seed: u64) -> Self {
                Self::new(language, seed)
            }
        }
    };
}

pub mod class;
pub mod control_flow;
pub mod operations;
pub mod remove;

pub use class::{ClassRemoveBases, ClassRemoveFuncs, ClassShuffleMethods};
pub use control_flow::{ControlIfElseInvert, ControlShuffleLines};
pub use operations::{
    OperationBreakChains, OperationChange, OperationChangeConstants, OperationFlipOperator,
    OperationSwapOperands,
};
pub use remove::{RemoveAssign, RemoveConditional, RemoveLoop, RemoveWrapper};

/// Unbounded maximum complexity.
pub const UNBOUNDED: u32 = u32::MAX;

// ============================================================================
// Modifier Parameters
// ============================================================================

/// How a modifier produces its rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStrategy {
    /// Byte-range edits applied to the original text
    TextSplice,
    /// Rebuild nodes in a formatting-preserving tree and re-serialize
    TreeTransform,
}

/// Static default parameters of one modifier.
#[derive(Debug, Clone, Copy)]
pub struct ModifierSpec {
    pub name: &'static str,
    pub explanation: &'static str,
    pub conditions: &'static [CodeProperty],
    pub min_complexity: u32,
    pub max_complexity: u32,
    pub max_attempts: u32,
    pub likelihood: f64,
}

/// Configuration and seeded generator shared by every modifier.
pub struct ProceduralModifier {
    name: String,
    explanation: String,
    conditions: PropertySet,
    min_complexity: u32,
    max_complexity: u32,
    max_attempts: u32,
    likelihood: f64,
    strategy: MutationStrategy,
    language: SupportedLanguage,
    rng: StdRng,
}

impl ProceduralModifier {
    pub fn from_spec(spec: &ModifierSpec, language: SupportedLanguage, seed: u64) -> Self {
        Self {
            name: spec.name.to_string(),
            explanation: spec.explanation.to_string(),
            conditions: spec.conditions.iter().copied().collect(),
            min_complexity: spec.min_complexity,
            max_complexity: spec.max_complexity,
            max_attempts: spec.max_attempts.max(1),
            likelihood: spec.likelihood.clamp(0.0, 1.0),
            strategy: MutationStrategy::TextSplice,
            language,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn conditions(&self) -> &PropertySet {
        &self.conditions
    }

    pub fn min_complexity(&self) -> u32 {
        self.min_complexity
    }

    pub fn max_complexity(&self) -> u32 {
        self.max_complexity
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn likelihood(&self) -> f64 {
        self.likelihood
    }

    pub fn strategy(&self) -> MutationStrategy {
        self.strategy
    }

    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Set the per-candidate probability, clamped to `[0, 1]`.
    pub fn set_likelihood(&mut self, likelihood: f64) {
        self.likelihood = likelihood.clamp(0.0, 1.0);
    }

    pub fn set_complexity_bounds(&mut self, min: Option<u32>, max: Option<u32>) {
        if let Some(min) = min {
            self.min_complexity = min;
        }
        if let Some(max) = max {
            self.max_complexity = max;
        }
    }

    pub fn set_max_attempts(&mut self, attempts: u32) {
        self.max_attempts = attempts.max(1);
    }

    /// Restart the generator from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Draw `true` with probability `likelihood`.
    pub fn flip(&mut self) -> bool {
        self.rng.random_bool(self.likelihood)
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Cheap eligibility pre-filter: all conditions present and complexity in bounds.
    pub fn can_change(&self, entity: &CodeEntity) -> bool {
        let complexity = entity.complexity();
        self.conditions.is_subset(entity.tags())
            && self.min_complexity <= complexity
            && complexity <= self.max_complexity
    }

    /// Turn file-coordinate edits into a rewrite of `entity`.
    ///
    /// Returns `None` when there is nothing to apply, the edits do not fit the
    /// entity, or the result is identical to the original text.
    pub(crate) fn finish(&self, entity: &CodeEntity, edits: &EditList) -> Option<BugRewrite> {
        if edits.is_empty() {
            return None;
        }

        let span = entity.handle().span();
        let applied = edits
            .rebase(span.start, span.len())
            .and_then(|local| local.apply(entity.raw_text()));
        let raw = match applied {
            Ok(raw) => raw,
            Err(e) => {
                debug!(modifier = %self.name, entity = entity.name(), error = %e, "Discarding edits");
                return None;
            }
        };

        let rewrite = entity.dedent(&raw);
        if rewrite == entity.src_code() {
            trace!(modifier = %self.name, entity = entity.name(), "Edits produced no change");
            return None;
        }

        trace!(
            modifier = %self.name,
            entity = entity.name(),
            edits = edits.len(),
            "Applied edits"
        );
        Some(BugRewrite::new(rewrite, self.explanation.clone(), self.name.clone()))
    }
}

impl fmt::Debug for ProceduralModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProceduralModifier")
            .field("name", &self.name)
            .field("language", &self.language)
            .field("likelihood", &self.likelihood)
            .field("min_complexity", &self.min_complexity)
            .field("max_complexity", &self.max_complexity)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Modifier Trait
// ============================================================================

/// A configured mutation strategy.
pub trait Modifier: Send + fmt::Debug {
    fn base(&self) -> &ProceduralModifier;

    fn base_mut(&mut self) -> &mut ProceduralModifier;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn can_change(&self, entity: &CodeEntity) -> bool {
        self.base().can_change(entity)
    }

    /// Attempt one mutation; `None` when no candidate was found or every
    /// candidate was suppressed by the random draws.
    fn modify(&mut self, entity: &CodeEntity) -> Option<BugRewrite>;
}

/// Modifier types constructible from a language and seed.
pub(crate) trait Seeded: Modifier + Sized + 'static {
    const SPEC: ModifierSpec;

    fn seeded(language: SupportedLanguage, seed: u64) -> Self;
}

/// Syntax context of the entity a modifier is working on.
pub(crate) struct Target<'e> {
    pub node: Node<'e>,
    pub source: &'e str,
    pub grammar: &'static Grammar,
    pub adapter: &'static dyn LanguageAdapter,
}

impl<'e> Target<'e> {
    pub fn of(entity: &'e CodeEntity) -> Option<Self> {
        let adapter = entity.language().adapter();
        Some(Self {
            node: entity.node()?,
            source: entity.handle().source(),
            grammar: adapter.grammar(),
            adapter,
        })
    }

    pub fn text(&self, node: &Node) -> &'e str {
        node_text(node, self.source)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Broad grouping of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierFamily {
    ControlFlow,
    Operation,
    Removal,
    Class,
}

impl fmt::Display for ModifierFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModifierFamily::ControlFlow => "control_flow",
            ModifierFamily::Operation => "operation",
            ModifierFamily::Removal => "removal",
            ModifierFamily::Class => "class",
        };
        f.write_str(name)
    }
}

/// One registered modifier type.
pub struct CatalogEntry {
    pub spec: ModifierSpec,
    pub family: ModifierFamily,
    build: fn(SupportedLanguage, u64) -> Box<dyn Modifier>,
}

impl CatalogEntry {
    /// Whether this modifier has anything to target in `language`.
    pub fn applies_to(&self, language: SupportedLanguage) -> bool {
        match self.family {
            ModifierFamily::Class => language.has_classes(),
            _ if self.spec.name == RemoveWrapper::SPEC.name => language.grammar().has_wrappers(),
            _ => true,
        }
    }

    /// Fresh instance for `language` with its own generator.
    pub fn build(&self, language: SupportedLanguage, seed: u64) -> Box<dyn Modifier> {
        (self.build)(language, seed)
    }
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("name", &self.spec.name)
            .field("family", &self.family)
            .finish()
    }
}

fn boxed<M: Seeded>(language: SupportedLanguage, seed: u64) -> Box<dyn Modifier> {
    Box::new(M::seeded(language, seed))
}

const fn entry<M: Seeded>(family: ModifierFamily) -> CatalogEntry {
    CatalogEntry {
        spec: M::SPEC,
        family,
        build: boxed::<M>,
    }
}

static CATALOG: [CatalogEntry; 14] = [
    entry::<ControlIfElseInvert>(ModifierFamily::ControlFlow),
    entry::<ControlShuffleLines>(ModifierFamily::ControlFlow),
    entry::<OperationChange>(ModifierFamily::Operation),
    entry::<OperationFlipOperator>(ModifierFamily::Operation),
    entry::<OperationSwapOperands>(ModifierFamily::Operation),
    entry::<OperationBreakChains>(ModifierFamily::Operation),
    entry::<OperationChangeConstants>(ModifierFamily::Operation),
    entry::<RemoveLoop>(ModifierFamily::Removal),
    entry::<RemoveConditional>(ModifierFamily::Removal),
    entry::<RemoveAssign>(ModifierFamily::Removal),
    entry::<RemoveWrapper>(ModifierFamily::Removal),
    entry::<ClassRemoveBases>(ModifierFamily::Class),
    entry::<ClassRemoveFuncs>(ModifierFamily::Class),
    entry::<ClassShuffleMethods>(ModifierFamily::Class),
];

/// Every modifier type, in application order.
pub fn catalog() -> &'static [CatalogEntry] {
    &CATALOG
}

/// Look a modifier type up by name.
pub fn find_entry(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.spec.name == name)
}

/// Catalog entries applicable to `language`.
pub fn entries_for(language: SupportedLanguage) -> impl Iterator<Item = &'static CatalogEntry> {
    CATALOG.iter().filter(move |entry| entry.applies_to(language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::extract_entities;
    use std::path::Path;

    fn entity(language: SupportedLanguage, path: &str, source: &str) -> CodeEntity {
        extract_entities(language.adapter(), Path::new(path), source, None)
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn test_catalog_names_unique() {
        let mut names: Vec<&str> = catalog().iter().map(|e| e.spec.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog().len());
        assert!(find_entry("func_pm_op_flip").is_some());
        assert!(find_entry("func_pm_nothing").is_none());
    }

    #[test]
    fn test_class_family_only_for_class_languages() {
        let go: Vec<&str> = entries_for(SupportedLanguage::Go).map(|e| e.spec.name).collect();
        assert!(!go.iter().any(|name| name.starts_with("func_pm_class")));
        assert!(!go.contains(&"func_pm_remove_wrapper"));

        let python: Vec<&str> = entries_for(SupportedLanguage::Python)
            .map(|e| e.spec.name)
            .collect();
        assert_eq!(python.len(), 14);
    }

    #[test]
    fn test_can_change_checks_tags_and_bounds() {
        let source = "def f(a, b):\n    return a + b\n";
        let e = entity(SupportedLanguage::Python, "f.py", source);

        let op = OperationChange::new(SupportedLanguage::Python, 0);
        assert!(op.can_change(&e));

        let invert = ControlIfElseInvert::new(SupportedLanguage::Python, 0);
        assert!(!invert.can_change(&e));

        let mut bounded = OperationChange::new(SupportedLanguage::Python, 0);
        bounded.base_mut().set_complexity_bounds(Some(2), None);
        assert!(!bounded.can_change(&e));
    }

    #[test]
    fn test_likelihood_is_clamped() {
        let m = OperationFlipOperator::new(SupportedLanguage::Go, 1).with_likelihood(3.0);
        assert_eq!(m.base().likelihood(), 1.0);
        let m = m.with_likelihood(-1.0);
        assert_eq!(m.base().likelihood(), 0.0);
    }

    #[test]
    fn test_zero_likelihood_never_rewrites() {
        let source = "def f(a, b):\n    return a + b\n";
        let e = entity(SupportedLanguage::Python, "f.py", source);
        let mut m = OperationFlipOperator::new(SupportedLanguage::Python, 7).with_likelihood(0.0);
        assert!(m.modify(&e).is_none());
    }

    #[test]
    fn test_reseed_reproduces_draws() {
        let mut base = ProceduralModifier::from_spec(&OperationChange::SPEC, SupportedLanguage::C, 9);
        base.set_likelihood(0.5);
        let first: Vec<bool> = (0..16).map(|_| base.flip()).collect();
        base.reseed(9);
        let second: Vec<bool> = (0..16).map(|_| base.flip()).collect();
        assert_eq!(first, second);
    }
}
