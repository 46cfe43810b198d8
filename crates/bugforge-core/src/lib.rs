//! Bugforge Core - Entity extraction and procedural bug synthesis using tree-sitter
//!
//! This crate provides the core functionality for synthesizing bugs:
//! - Tree-sitter parsing for eleven languages behind one syntax view
//! - Per-language entity extraction (functions, methods, classes) with
//!   structural property tags and complexity scores
//! - An edit-list primitive for exact byte-range splicing
//! - Seeded procedural modifiers (control flow, operations, removal, class)
//! - An explicit registry mapping file extensions to adapters and modifiers

pub mod adapters;
pub mod edits;
pub mod entity;
pub mod grammar;
pub mod modifiers;
pub mod parser;
pub mod registry;
pub mod syntax;

// Re-exports for convenience
pub use adapters::{
    detect_indent_size, extract_entities, extract_file, ExtractError, LanguageAdapter,
    TODO_CLASS, TODO_FUNCTION,
};
pub use edits::{Edit, EditError, EditList};
pub use entity::{BugRewrite, CodeEntity, CodeProperty, EntityKind, NodeHandle, PropertySet};
pub use parser::{CodeParser, ParserError, SupportedLanguage};
pub use syntax::Span;

// Modifier re-exports
pub use modifiers::{
    catalog, entries_for, find_entry, CatalogEntry, Modifier, ModifierFamily, ModifierSpec,
    MutationStrategy, ProceduralModifier,
};

// Registry re-exports
pub use registry::{derive_seed, ModifierOverride, Registry, RegistryConfig, RegistryError};
