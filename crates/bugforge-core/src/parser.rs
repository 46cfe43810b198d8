//! Tree-Sitter Parser for Entity Extraction
//!
//! This module provides the language catalog and the tree-sitter parser
//! wrapper shared by every language adapter and modifier.
//!
//! ## Supported Languages
//!
//! - Python (.py)
//! - JavaScript (.js, .mjs, .cjs, .jsx)
//! - TypeScript (.ts, .mts, .cts, .tsx)
//! - Rust (.rs)
//! - Go (.go)
//! - C (.c, .h)
//! - C++ (.cpp, .hpp, .cc, .cxx, .hh, .hxx)
//! - C# (.cs)
//! - Java (.java)
//! - PHP (.php)
//! - Ruby (.rb)

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tree_sitter::{Language, Parser, Tree};

// ============================================================================
// Supported Languages
// ============================================================================

/// Supported programming languages for extraction and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Rust,
    Go,
    C,
    Cpp,
    CSharp,
    Java,
    Php,
    Ruby,
}

impl SupportedLanguage {
    /// Every supported language, in catalog order.
    pub const ALL: [SupportedLanguage; 12] = [
        SupportedLanguage::Python,
        SupportedLanguage::JavaScript,
        SupportedLanguage::TypeScript,
        SupportedLanguage::Tsx,
        SupportedLanguage::Rust,
        SupportedLanguage::Go,
        SupportedLanguage::C,
        SupportedLanguage::Cpp,
        SupportedLanguage::CSharp,
        SupportedLanguage::Java,
        SupportedLanguage::Php,
        SupportedLanguage::Ruby,
    ];

    /// Get the language name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedLanguage::Python => "python",
            SupportedLanguage::JavaScript => "javascript",
            SupportedLanguage::TypeScript => "typescript",
            SupportedLanguage::Tsx => "tsx",
            SupportedLanguage::Rust => "rust",
            SupportedLanguage::Go => "go",
            SupportedLanguage::C => "c",
            SupportedLanguage::Cpp => "cpp",
            SupportedLanguage::CSharp => "csharp",
            SupportedLanguage::Java => "java",
            SupportedLanguage::Php => "php",
            SupportedLanguage::Ruby => "ruby",
        }
    }

    /// Get the tree-sitter Language for this language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SupportedLanguage::Python => tree_sitter_python::LANGUAGE.into(),
            SupportedLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            SupportedLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SupportedLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            SupportedLanguage::Rust => tree_sitter_rust::LANGUAGE.into(),
            SupportedLanguage::Go => tree_sitter_go::LANGUAGE.into(),
            SupportedLanguage::C => tree_sitter_c::LANGUAGE.into(),
            SupportedLanguage::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            SupportedLanguage::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
            SupportedLanguage::Java => tree_sitter_java::LANGUAGE.into(),
            SupportedLanguage::Php => tree_sitter_php::LANGUAGE_PHP.into(),
            SupportedLanguage::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        }
    }

    /// Detect language from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    pub fn from_extension(ext: &str) -> Option<Self> {
        get_extension_map()
            .get(ext.trim_start_matches('.').to_lowercase().as_str())
            .copied()
    }

    /// Detect language from file path.
    ///
    /// Returns `None` if the file extension is not recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Look a language up by its name (as returned by [`as_str`](Self::as_str)).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(name))
    }

    /// File extensions mapped to this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SupportedLanguage::Python => &["py"],
            SupportedLanguage::JavaScript => &["js", "mjs", "cjs", "jsx"],
            SupportedLanguage::TypeScript => &["ts", "mts", "cts"],
            SupportedLanguage::Tsx => &["tsx"],
            SupportedLanguage::Rust => &["rs"],
            SupportedLanguage::Go => &["go"],
            SupportedLanguage::C => &["c", "h"],
            SupportedLanguage::Cpp => &["cpp", "hpp", "cc", "cxx", "hh", "hxx"],
            SupportedLanguage::CSharp => &["cs"],
            SupportedLanguage::Java => &["java"],
            SupportedLanguage::Php => &["php"],
            SupportedLanguage::Ruby => &["rb"],
        }
    }

    /// Get all supported file extensions.
    pub fn all_extensions() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .flat_map(|lang| lang.extensions().iter().copied())
            .collect()
    }

    /// Whether the language has class-like entities that class modifiers can target.
    pub fn has_classes(&self) -> bool {
        !matches!(
            self,
            SupportedLanguage::Rust | SupportedLanguage::Go | SupportedLanguage::C
        )
    }
}

impl std::fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static extension to language mapping.
static EXTENSION_MAP: OnceLock<HashMap<&'static str, SupportedLanguage>> = OnceLock::new();

fn get_extension_map() -> &'static HashMap<&'static str, SupportedLanguage> {
    EXTENSION_MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for lang in SupportedLanguage::ALL {
            for ext in lang.extensions() {
                map.insert(*ext, lang);
            }
        }
        map
    })
}

// ============================================================================
// Parser Errors
// ============================================================================

/// Errors that can occur during parsing.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Failed to set language
    #[error("Failed to set language: {0}")]
    LanguageSet(String),

    /// Failed to parse source code
    #[error("Failed to parse source code")]
    ParseFailed,

    /// Unsupported language
    #[error("Unsupported language for file: {0}")]
    UnsupportedLanguage(String),
}

// ============================================================================
// Code Parser
// ============================================================================

/// A tree-sitter based code parser.
pub struct CodeParser {
    parser: Parser,
    language: SupportedLanguage,
}

impl CodeParser {
    /// Create a new parser for the specified language.
    pub fn new(language: SupportedLanguage) -> Result<Self, ParserError> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| ParserError::LanguageSet(e.to_string()))?;

        Ok(Self { parser, language })
    }

    /// Create a parser for the given file path.
    ///
    /// Detects language from file extension.
    pub fn for_path(path: &Path) -> Result<Self, ParserError> {
        let language = SupportedLanguage::from_path(path)
            .ok_or_else(|| ParserError::UnsupportedLanguage(path.display().to_string()))?;
        Self::new(language)
    }

    /// Get the language this parser is configured for.
    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parse source code into a syntax tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, ParserError> {
        self.parser
            .parse(source, None)
            .ok_or(ParserError::ParseFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_extension() {
        assert_eq!(
            SupportedLanguage::from_extension("py"),
            Some(SupportedLanguage::Python)
        );
        assert_eq!(
            SupportedLanguage::from_extension(".RS"),
            Some(SupportedLanguage::Rust)
        );
        assert_eq!(
            SupportedLanguage::from_extension("tsx"),
            Some(SupportedLanguage::Tsx)
        );
        assert_eq!(
            SupportedLanguage::from_extension("rb"),
            Some(SupportedLanguage::Ruby)
        );
        assert_eq!(SupportedLanguage::from_extension("md"), None);
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            SupportedLanguage::from_path(Path::new("src/main.go")),
            Some(SupportedLanguage::Go)
        );
        assert_eq!(
            SupportedLanguage::from_path(Path::new("include/util.hpp")),
            Some(SupportedLanguage::Cpp)
        );
        assert_eq!(SupportedLanguage::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_language_from_name() {
        assert_eq!(
            SupportedLanguage::from_name("CSharp"),
            Some(SupportedLanguage::CSharp)
        );
        assert_eq!(SupportedLanguage::from_name("cobol"), None);
    }

    #[test]
    fn test_every_extension_round_trips() {
        for ext in SupportedLanguage::all_extensions() {
            let lang = SupportedLanguage::from_extension(ext).unwrap();
            assert!(lang.extensions().contains(&ext));
        }
    }

    #[test]
    fn test_every_grammar_loads() {
        for lang in SupportedLanguage::ALL {
            let parser = CodeParser::new(lang);
            assert!(parser.is_ok(), "Failed to load grammar for {lang}");
        }
    }

    #[test]
    fn test_parse_rust() {
        let mut parser = CodeParser::new(SupportedLanguage::Rust).unwrap();
        let tree = parser.parse("fn main() { let x = 1; }").unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_for_path_unsupported() {
        let result = CodeParser::for_path(Path::new("notes.txt"));
        assert!(matches!(result, Err(ParserError::UnsupportedLanguage(_))));
    }
}
