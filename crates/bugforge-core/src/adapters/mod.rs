//! Language adapters and the shared extraction driver.
//!
//! Each supported language contributes one stateless adapter implementing
//! [`LanguageAdapter`]. The adapter answers per-node questions (is this an
//! entity, what is its name, which properties does this node contribute);
//! [`extract_entities`] drives a single pre-order walk over the parsed tree
//! and assembles [`CodeEntity`] values from those answers.
//!
//! ## Error policy
//!
//! - Unreadable files surface as [`ExtractError::Io`].
//! - Undecodable (non UTF-8) or oversized files are skipped with a warning.
//! - A syntax-error node stops the walk; entities collected so far are kept.

mod c;
mod cpp;
mod csharp;
mod go;
mod java;
mod javascript;
mod php;
mod python;
mod ruby;
mod rust_lang;
mod typescript;

pub use c::CAdapter;
pub use cpp::CppAdapter;
pub use csharp::CSharpAdapter;
pub use go::GoAdapter;
pub use java::JavaAdapter;
pub use javascript::JavaScriptAdapter;
pub use php::PhpAdapter;
pub use python::PythonAdapter;
pub use ruby::RubyAdapter;
pub use rust_lang::RustAdapter;
pub use typescript::TypeScriptAdapter;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};
use tree_sitter::{Node, Tree};

use crate::entity::{dedent, CodeEntity, CodeProperty, EntityKind, EntityParts, NodeHandle, PropertySet};
use crate::grammar::{Grammar, OperatorCategory};
use crate::parser::{CodeParser, SupportedLanguage};
use crate::syntax::{binary_parts, is_error_node, line_indent, node_text, walk_preorder, Walk};

/// Placeholder comment body used in function stubs.
pub const TODO_FUNCTION: &str = "TODO: Implement this function";

/// Placeholder comment body used in class stubs.
pub const TODO_CLASS: &str = "TODO: Implement this class";

// ============================================================================
// Errors
// ============================================================================

/// Errors that abort extraction for a file.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Adapter Trait
// ============================================================================

/// Per-language rules for entity selection, naming, and property tagging.
///
/// Adapters are stateless; one static instance per language is shared by
/// every extraction.
pub trait LanguageAdapter: Send + Sync {
    fn language(&self) -> SupportedLanguage;

    /// Structural node-kind tables used by the modifiers.
    fn grammar(&self) -> &'static Grammar;

    /// Whether `node` defines an entity, and of which kind.
    ///
    /// Bodyless declarations are filtered later by [`body`](Self::body).
    fn entity_kind(&self, node: &Node, source: &str) -> Option<EntityKind>;

    /// Best-effort identifier of an entity node.
    fn name(&self, node: &Node, source: &str) -> String;

    /// Executable body of an entity node, if any.
    fn body<'t>(&self, node: &Node<'t>) -> Option<Node<'t>> {
        node.child_by_field_name("body")
    }

    /// Text preceding the body.
    fn signature(&self, node: &Node, source: &str) -> String {
        signature_before_body(node, self.body(node), source, true)
    }

    /// Signature followed by a placeholder body.
    fn stub(&self, _node: &Node, _source: &str, signature: &str, kind: EntityKind) -> String {
        brace_stub(signature, kind)
    }

    /// Add the properties contributed by one node of an entity's subtree.
    fn tag_node(&self, node: &Node, source: &str, tags: &mut PropertySet);

    /// Whether `node` counts towards the entity's complexity.
    fn is_decision_point(&self, node: &Node, source: &str) -> bool;

    /// Whether a class entity declares at least one base type.
    fn has_parent(&self, node: &Node, _source: &str) -> bool {
        !self.grammar().base_lists(node).is_empty()
    }

    /// Whether the entity carries decorators/annotations/attributes.
    fn has_decorator(&self, _node: &Node, _source: &str) -> bool {
        false
    }
}

static PYTHON: PythonAdapter = PythonAdapter;
static JAVASCRIPT: JavaScriptAdapter = JavaScriptAdapter;
static TYPESCRIPT: TypeScriptAdapter = TypeScriptAdapter::typescript();
static TSX: TypeScriptAdapter = TypeScriptAdapter::tsx();
static RUST: RustAdapter = RustAdapter;
static GO: GoAdapter = GoAdapter;
static C: CAdapter = CAdapter;
static CPP: CppAdapter = CppAdapter;
static CSHARP: CSharpAdapter = CSharpAdapter;
static JAVA: JavaAdapter = JavaAdapter;
static PHP: PhpAdapter = PhpAdapter;
static RUBY: RubyAdapter = RubyAdapter;

impl SupportedLanguage {
    /// The adapter responsible for this language.
    pub fn adapter(&self) -> &'static dyn LanguageAdapter {
        match self {
            SupportedLanguage::Python => &PYTHON,
            SupportedLanguage::JavaScript => &JAVASCRIPT,
            SupportedLanguage::TypeScript => &TYPESCRIPT,
            SupportedLanguage::Tsx => &TSX,
            SupportedLanguage::Rust => &RUST,
            SupportedLanguage::Go => &GO,
            SupportedLanguage::C => &C,
            SupportedLanguage::Cpp => &CPP,
            SupportedLanguage::CSharp => &CSHARP,
            SupportedLanguage::Java => &JAVA,
            SupportedLanguage::Php => &PHP,
            SupportedLanguage::Ruby => &RUBY,
        }
    }

    /// Node-kind tables of this language.
    pub fn grammar(&self) -> &'static Grammar {
        self.adapter().grammar()
    }
}

// ============================================================================
// Extraction Driver
// ============================================================================

/// Read `path` and extract its entities.
///
/// `max_file_size` (bytes) skips larger files with a warning.
pub fn extract_file(
    adapter: &dyn LanguageAdapter,
    path: &Path,
    max_entities: Option<usize>,
    max_file_size: Option<u64>,
) -> Result<Vec<CodeEntity>, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(limit) = max_file_size {
        if bytes.len() as u64 > limit {
            warn!(
                file = %path.display(),
                size = bytes.len(),
                limit,
                "Skipping file larger than the size limit"
            );
            return Ok(Vec::new());
        }
    }

    let source = match String::from_utf8(bytes) {
        Ok(source) => source,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Skipping file with undecodable content");
            return Ok(Vec::new());
        }
    };

    Ok(extract_entities(adapter, path, &source, max_entities))
}

/// Extract entities from already-decoded source text.
///
/// Entities are returned in document pre-order. `max_entities` of `None`
/// means unlimited; otherwise the walk stops as soon as the bound is hit.
pub fn extract_entities(
    adapter: &dyn LanguageAdapter,
    file_path: &Path,
    source: &str,
    max_entities: Option<usize>,
) -> Vec<CodeEntity> {
    if max_entities == Some(0) {
        return Vec::new();
    }

    let mut parser = match CodeParser::new(adapter.language()) {
        Ok(parser) => parser,
        Err(e) => {
            warn!(file = %file_path.display(), error = %e, "Failed to create parser");
            return Vec::new();
        }
    };
    let tree = match parser.parse(source) {
        Ok(tree) => Arc::new(tree),
        Err(e) => {
            warn!(file = %file_path.display(), error = %e, "Failed to parse file");
            return Vec::new();
        }
    };

    let shared: Arc<str> = Arc::from(source);
    let ctx = BuildContext {
        adapter,
        file_path,
        tree: &tree,
        source: &shared,
        indent_size: detect_indent_size(source),
    };

    let mut entities = Vec::new();
    walk_preorder(tree.root_node(), |node| {
        if is_error_node(&node) {
            warn!(
                file = %file_path.display(),
                line = node.start_position().row + 1,
                kind = node.kind(),
                collected = entities.len(),
                "Syntax error encountered, stopping extraction"
            );
            return Walk::Stop;
        }

        if let Some(kind) = adapter.entity_kind(&node, source) {
            if adapter.body(&node).is_some() {
                entities.push(ctx.build(&node, kind));
                if max_entities.is_some_and(|max| entities.len() >= max) {
                    return Walk::Stop;
                }
            }
        }
        Walk::Continue
    });

    debug!(
        file = %file_path.display(),
        language = %adapter.language(),
        entities = entities.len(),
        "Extracted entities"
    );
    entities
}

struct BuildContext<'a> {
    adapter: &'a dyn LanguageAdapter,
    file_path: &'a Path,
    tree: &'a Arc<Tree>,
    source: &'a Arc<str>,
    indent_size: usize,
}

impl BuildContext<'_> {
    fn build(&self, node: &Node, kind: EntityKind) -> CodeEntity {
        let source: &str = self.source;
        let adapter = self.adapter;

        let indent_prefix = line_indent(source, node.start_byte()).to_string();
        let signature = adapter.signature(node, source);
        let stub = adapter.stub(node, source, &signature, kind);

        let mut tags = PropertySet::new();
        tags.insert(kind.property());
        let mut complexity = 1u32;
        walk_preorder(*node, |child| {
            adapter.tag_node(&child, source, &mut tags);
            if child.is_named() && adapter.is_decision_point(&child, source) {
                complexity += 1;
            }
            complexity += else_branches(&child, adapter.grammar());
            Walk::Continue
        });
        if kind == EntityKind::Class && adapter.has_parent(node, source) {
            tags.insert(CodeProperty::HasParent);
        }
        if adapter.has_decorator(node, source) {
            tags.insert(CodeProperty::HasDecorator);
        }

        CodeEntity::from_parts(EntityParts {
            file_path: self.file_path.to_path_buf(),
            language: adapter.language(),
            kind,
            name: adapter.name(node, source),
            signature,
            stub,
            line_start: node.start_position().row + 1,
            line_end: node.end_position().row + 1,
            indent_level: indent_prefix.len() / self.indent_size.max(1),
            indent_size: self.indent_size,
            src_code: dedent(node_text(node, source), &indent_prefix),
            indent_prefix,
            tags,
            complexity,
            handle: NodeHandle::new(Arc::clone(self.tree), Arc::clone(self.source), node),
        })
    }
}

/// Detect the indentation unit of a file.
///
/// Uses the smallest non-zero run of leading spaces; tab-indented files use 1
/// and files without indentation default to 4. Block-comment continuation
/// lines (` * ...`) are ignored.
pub fn detect_indent_size(source: &str) -> usize {
    let mut smallest: Option<usize> = None;
    let mut tabs = false;

    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('*') {
            continue;
        }
        if line.starts_with('\t') {
            tabs = true;
            continue;
        }
        let width = line.len() - line.trim_start_matches(' ').len();
        if width > 0 {
            smallest = Some(smallest.map_or(width, |s| s.min(width)));
        }
    }

    match smallest {
        Some(width) => width,
        None if tabs => 1,
        None => 4,
    }
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Source text from the start of `node` up to its body.
///
/// Trailing `{`, `=>` and `:` are stripped. With `normalize`, whitespace runs
/// inside parentheses collapse to one space.
pub(crate) fn signature_before_body(
    node: &Node,
    body: Option<Node>,
    source: &str,
    normalize: bool,
) -> String {
    let start = node.start_byte();
    let end = body
        .map(|b| b.start_byte())
        .unwrap_or_else(|| node.end_byte())
        .max(start);
    let raw = source.get(start..end).unwrap_or("");

    let mut signature = dedent(raw, line_indent(source, start)).trim_end().to_string();
    while let Some(stripped) = ["{", "=>", ":"]
        .iter()
        .find_map(|suffix| signature.strip_suffix(suffix))
    {
        signature = stripped.trim_end().to_string();
    }

    if normalize {
        collapse_parameter_whitespace(&signature)
    } else {
        signature
    }
}

/// Collapse whitespace runs inside parentheses to a single space, dropping it
/// entirely right after `(` and right before `)`.
pub(crate) fn collapse_parameter_whitespace(signature: &str) -> String {
    let mut out = String::with_capacity(signature.len());
    let mut depth = 0usize;
    let mut pending_space = false;

    for ch in signature.chars() {
        if depth > 0 && ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            pending_space = false;
            if ch != ')' && !out.ends_with('(') {
                out.push(' ');
            }
        }
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        out.push(ch);
    }
    out
}

pub(crate) fn todo_marker(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Function => TODO_FUNCTION,
        EntityKind::Class => TODO_CLASS,
    }
}

/// `signature { // TODO }` stub for brace-delimited languages.
pub(crate) fn brace_stub(signature: &str, kind: EntityKind) -> String {
    format!("{signature} {{\n    // {}\n}}", todo_marker(kind))
}

/// Record the properties implied by a binary expression's operator.
pub(crate) fn tag_binary(node: &Node, source: &str, grammar: &Grammar, tags: &mut PropertySet) {
    tags.insert(CodeProperty::HasBinaryOp);
    let Some(parts) = binary_parts(node) else {
        return;
    };
    let op = node_text(&parts.operator, source);
    let operators = grammar.operators;
    match operators.category(op) {
        Some(OperatorCategory::Arithmetic) => {
            tags.insert(CodeProperty::HasArithmetic);
        }
        Some(OperatorCategory::Logical) => {
            tags.insert(CodeProperty::HasBoolOp);
        }
        Some(OperatorCategory::Comparison) if operators.is_ordering(op) => {
            tags.insert(CodeProperty::HasOffByOne);
        }
        _ => {}
    }
}

/// Whether a binary expression branches: short-circuit operators (`&&`,
/// `||`, `and`, `or`, `??`) and comparisons.
pub(crate) fn is_branching_binary(node: &Node, source: &str, grammar: &Grammar) -> bool {
    if !grammar.is_binary(node.kind()) {
        return false;
    }
    binary_parts(node).is_some_and(|parts| {
        let op = node_text(&parts.operator, source);
        op == "??"
            || matches!(
                grammar.operators.category(op),
                Some(OperatorCategory::Logical | OperatorCategory::Comparison)
            )
    })
}

/// Number of plain `else` branches hanging off an if (or else-if) node.
///
/// An `else` whose body is another if is an else-if and is counted through
/// that nested if instead.
pub(crate) fn else_branches(node: &Node, grammar: &Grammar) -> u32 {
    let kind = node.kind();
    if !node.is_named() || !(grammar.is_if(kind) || grammar.elif_kinds.contains(&kind)) {
        return 0;
    }
    let mut cursor = node.walk();
    let count = node
        .children_by_field_name("alternative", &mut cursor)
        .filter(|alt| is_plain_else(alt, grammar))
        .count();
    count as u32
}

fn is_plain_else(alt: &Node, grammar: &Grammar) -> bool {
    let kind = alt.kind();
    if grammar.is_if(kind) || grammar.elif_kinds.contains(&kind) {
        return false;
    }
    if !grammar.else_kinds.contains(&kind) {
        return true;
    }
    let mut cursor = alt.walk();
    let first = alt
        .named_children(&mut cursor)
        .find(|child| !grammar.is_comment(child.kind()));
    !first.is_some_and(|body| grammar.is_if(body.kind()))
}

/// Text of a node's field, or an empty string.
pub(crate) fn field_text(node: &Node, field: &str, source: &str) -> String {
    node.child_by_field_name(field)
        .map(|child| node_text(&child, source).to_string())
        .unwrap_or_default()
}

/// Whether a node has a preceding sibling or child of one of `kinds`.
pub(crate) fn has_attached(node: &Node, kinds: &[&str]) -> bool {
    let mut cursor = node.walk();
    if node.children(&mut cursor).any(|c| kinds.contains(&c.kind())) {
        return true;
    }
    let mut sibling = node.prev_named_sibling();
    while let Some(prev) = sibling {
        if kinds.contains(&prev.kind()) {
            return true;
        }
        if !prev.is_extra() {
            break;
        }
        sibling = prev.prev_named_sibling();
    }
    false
}
