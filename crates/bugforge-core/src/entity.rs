//! Entity model: extracted code units, their structural tags, and rewrites.
//!
//! A [`CodeEntity`] is produced once per function/method/class found while
//! scanning a file. It owns a shared handle to the parsed tree so modifiers can
//! revisit the original syntax without re-parsing.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Tree};

use crate::parser::SupportedLanguage;
use crate::syntax::Span;

// ============================================================================
// Code Properties
// ============================================================================

/// Structural fact about an entity, computed once from its subtree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeProperty {
    // Entity kind
    IsFunction,
    IsClass,
    // Control flow
    HasIf,
    HasIfElse,
    HasLoop,
    HasSwitch,
    HasException,
    // Operations
    HasAssignment,
    HasFunctionCall,
    HasReturn,
    HasImport,
    HasListIndexing,
    HasListComprehension,
    HasLambda,
    HasDecorator,
    HasWrapper,
    HasParent,
    HasArithmetic,
    HasOffByOne,
    // Expression shape
    HasBinaryOp,
    HasBoolOp,
    HasUnaryOp,
    HasTernary,
}

impl CodeProperty {
    pub const ALL: [CodeProperty; 23] = [
        CodeProperty::IsFunction,
        CodeProperty::IsClass,
        CodeProperty::HasIf,
        CodeProperty::HasIfElse,
        CodeProperty::HasLoop,
        CodeProperty::HasSwitch,
        CodeProperty::HasException,
        CodeProperty::HasAssignment,
        CodeProperty::HasFunctionCall,
        CodeProperty::HasReturn,
        CodeProperty::HasImport,
        CodeProperty::HasListIndexing,
        CodeProperty::HasListComprehension,
        CodeProperty::HasLambda,
        CodeProperty::HasDecorator,
        CodeProperty::HasWrapper,
        CodeProperty::HasParent,
        CodeProperty::HasArithmetic,
        CodeProperty::HasOffByOne,
        CodeProperty::HasBinaryOp,
        CodeProperty::HasBoolOp,
        CodeProperty::HasUnaryOp,
        CodeProperty::HasTernary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeProperty::IsFunction => "IS_FUNCTION",
            CodeProperty::IsClass => "IS_CLASS",
            CodeProperty::HasIf => "HAS_IF",
            CodeProperty::HasIfElse => "HAS_IF_ELSE",
            CodeProperty::HasLoop => "HAS_LOOP",
            CodeProperty::HasSwitch => "HAS_SWITCH",
            CodeProperty::HasException => "HAS_EXCEPTION",
            CodeProperty::HasAssignment => "HAS_ASSIGNMENT",
            CodeProperty::HasFunctionCall => "HAS_FUNCTION_CALL",
            CodeProperty::HasReturn => "HAS_RETURN",
            CodeProperty::HasImport => "HAS_IMPORT",
            CodeProperty::HasListIndexing => "HAS_LIST_INDEXING",
            CodeProperty::HasListComprehension => "HAS_LIST_COMPREHENSION",
            CodeProperty::HasLambda => "HAS_LAMBDA",
            CodeProperty::HasDecorator => "HAS_DECORATOR",
            CodeProperty::HasWrapper => "HAS_WRAPPER",
            CodeProperty::HasParent => "HAS_PARENT",
            CodeProperty::HasArithmetic => "HAS_ARITHMETIC",
            CodeProperty::HasOffByOne => "HAS_OFF_BY_ONE",
            CodeProperty::HasBinaryOp => "HAS_BINARY_OP",
            CodeProperty::HasBoolOp => "HAS_BOOL_OP",
            CodeProperty::HasUnaryOp => "HAS_UNARY_OP",
            CodeProperty::HasTernary => "HAS_TERNARY",
        }
    }
}

impl fmt::Display for CodeProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CodeProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown code property: {s}"))
    }
}

/// Ordered set of properties attached to an entity.
pub type PropertySet = BTreeSet<CodeProperty>;

/// Whether an entity is a callable unit or a class-like container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Function,
    Class,
}

impl EntityKind {
    pub fn property(&self) -> CodeProperty {
        match self {
            EntityKind::Function => CodeProperty::IsFunction,
            EntityKind::Class => CodeProperty::IsClass,
        }
    }
}

// ============================================================================
// Node Handle
// ============================================================================

/// Shared, read-only handle to an entity's node inside its parsed file.
#[derive(Clone)]
pub struct NodeHandle {
    tree: Arc<Tree>,
    source: Arc<str>,
    span: Span,
    kind: &'static str,
}

impl NodeHandle {
    pub(crate) fn new(tree: Arc<Tree>, source: Arc<str>, node: &Node) -> Self {
        Self {
            tree,
            source,
            span: Span::of(node),
            kind: node.kind(),
        }
    }

    /// Resolve the node inside the shared tree.
    pub fn node(&self) -> Option<Node<'_>> {
        let mut node = self
            .tree
            .root_node()
            .descendant_for_byte_range(self.span.start, self.span.end)?;
        loop {
            if node.kind() == self.kind && Span::of(&node) == self.span {
                return Some(node);
            }
            node = node.parent()?;
        }
    }

    /// Full text of the file the entity was extracted from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Byte range of the entity inside the file.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("kind", &self.kind)
            .field("span", &self.span)
            .finish()
    }
}

// ============================================================================
// Code Entity
// ============================================================================

/// One extractable unit (function, method, or class) of a source file.
///
/// All fields are computed at construction; the entity is immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct CodeEntity {
    file_path: PathBuf,
    language: SupportedLanguage,
    kind: EntityKind,
    name: String,
    signature: String,
    stub: String,
    line_start: usize,
    line_end: usize,
    indent_level: usize,
    indent_size: usize,
    src_code: String,
    tags: PropertySet,
    complexity: u32,
    #[serde(skip)]
    indent_prefix: String,
    #[serde(skip)]
    handle: NodeHandle,
}

/// Values computed by a language adapter for a new entity.
pub(crate) struct EntityParts {
    pub file_path: PathBuf,
    pub language: SupportedLanguage,
    pub kind: EntityKind,
    pub name: String,
    pub signature: String,
    pub stub: String,
    pub line_start: usize,
    pub line_end: usize,
    pub indent_level: usize,
    pub indent_size: usize,
    pub indent_prefix: String,
    pub src_code: String,
    pub tags: PropertySet,
    pub complexity: u32,
    pub handle: NodeHandle,
}

impl CodeEntity {
    pub(crate) fn from_parts(parts: EntityParts) -> Self {
        debug_assert!(parts.line_start <= parts.line_end);
        Self {
            file_path: parts.file_path,
            language: parts.language,
            kind: parts.kind,
            name: parts.name,
            signature: parts.signature,
            stub: parts.stub,
            line_start: parts.line_start,
            line_end: parts.line_end,
            indent_level: parts.indent_level,
            indent_size: parts.indent_size,
            src_code: parts.src_code,
            tags: parts.tags,
            complexity: parts.complexity.max(1),
            indent_prefix: parts.indent_prefix,
            handle: parts.handle,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Best-effort identifier; empty when none could be extracted.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source text preceding the body, whitespace-normalized per language.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Signature followed by a placeholder body.
    pub fn stub(&self) -> &str {
        &self.stub
    }

    /// First line of the entity (1-based, inclusive).
    pub fn line_start(&self) -> usize {
        self.line_start
    }

    /// Last line of the entity (1-based, inclusive).
    pub fn line_end(&self) -> usize {
        self.line_end
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    pub fn indent_size(&self) -> usize {
        self.indent_size
    }

    /// Dedented verbatim text of the unit.
    pub fn src_code(&self) -> &str {
        &self.src_code
    }

    pub fn tags(&self) -> &PropertySet {
        &self.tags
    }

    pub fn has_tag(&self, property: CodeProperty) -> bool {
        self.tags.contains(&property)
    }

    /// Decision-point count (always at least 1).
    pub fn complexity(&self) -> u32 {
        self.complexity
    }

    /// Handle to the entity's syntax node.
    pub fn handle(&self) -> &NodeHandle {
        &self.handle
    }

    /// Resolve the entity's syntax node.
    pub fn node(&self) -> Option<Node<'_>> {
        self.handle.node()
    }

    /// Un-dedented entity text as it appears in the file.
    pub fn raw_text(&self) -> &str {
        self.handle.span().text(self.handle.source())
    }

    /// Dedent text taken from this entity's raw range using the entity's own indentation.
    pub fn dedent(&self, raw: &str) -> String {
        dedent(raw, &self.indent_prefix)
    }
}

// ============================================================================
// Bug Rewrite
// ============================================================================

/// Output of a successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugRewrite {
    /// Full replacement for the entity's `src_code`
    pub rewrite: String,
    /// Human-readable rationale (fixed per modifier)
    pub explanation: String,
    /// Identifier of the modifier that produced the rewrite
    pub strategy: String,
    /// Reserved for downstream collaborators
    pub cost: f64,
}

impl BugRewrite {
    pub fn new(
        rewrite: impl Into<String>,
        explanation: impl Into<String>,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            rewrite: rewrite.into(),
            explanation: explanation.into(),
            strategy: strategy.into(),
            cost: 0.0,
        }
    }
}

// ============================================================================
// Dedent
// ============================================================================

/// Remove `prefix` (the first line's indentation) from every line after the first.
///
/// Lines that do not start with the full prefix lose as much leading
/// whitespace as the prefix is long.
pub fn dedent(text: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        if idx == 0 {
            out.push_str(line);
            continue;
        }
        if let Some(rest) = line.strip_prefix(prefix) {
            out.push_str(rest);
        } else {
            let strip = line
                .bytes()
                .take(prefix.len())
                .take_while(|b| *b == b' ' || *b == b'\t')
                .count();
            out.push_str(&line[strip..]);
        }
    }
    out
}
