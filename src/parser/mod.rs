pub mod go_parser;
pub mod language;
pub mod pattern;

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use go_parser::GoParser;
pub use language::{Language, LanguageClassifier};
pub use pattern::{GenericExtractor, PythonExtractor, ScriptExtractor};

/// A named declaration extracted from source, with a 1-based line span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Symbol>,
}

impl Symbol {
    /// Symbol occupying a single line, as produced by the line-oriented extractors.
    pub fn at_line(name: impl Into<String>, kind: SymbolKind, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            signature: None,
            start_line: line,
            end_line: line,
            children: Vec::new(),
        }
    }

    /// `signature` when present, otherwise `"<kind> <name>"`.
    pub fn label(&self) -> String {
        match &self.signature {
            Some(sig) => sig.clone(),
            None => format!("{} {}", self.kind.as_str(), self.name),
        }
    }
}

/// Type of code symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Method,
    Type,
    Struct,
    Interface,
    Class,
    Const,
    Var,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Type => "type",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Class => "class",
            SymbolKind::Const => "const",
            SymbolKind::Var => "var",
        }
    }
}

/// One extraction strategy for one language family.
///
/// Implementations must be pure functions of the source text.
pub trait SymbolExtractor: Send + Sync {
    fn extract(&self, source: &str) -> Result<Vec<Symbol>, ExtractError>;
}

/// Language to extractor dispatch.
///
/// Languages without a registered extractor go through the generic fallback;
/// only classified languages ever reach the registry.
pub struct ExtractorRegistry {
    extractors: HashMap<Language, Box<dyn SymbolExtractor>>,
    fallback: Box<dyn SymbolExtractor>,
}

impl ExtractorRegistry {
    /// Registry with no language-specific extractors.
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
            fallback: Box::new(GenericExtractor),
        }
    }

    pub fn register(&mut self, language: Language, extractor: Box<dyn SymbolExtractor>) {
        self.extractors.insert(language, extractor);
    }

    pub fn extract(&self, language: Language, source: &str) -> Result<Vec<Symbol>, ExtractError> {
        self.extractors
            .get(&language)
            .unwrap_or(&self.fallback)
            .extract(source)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Language::Go, Box::new(GoParser::new()));
        registry.register(Language::TypeScript, Box::new(ScriptExtractor));
        registry.register(Language::JavaScript, Box::new(ScriptExtractor));
        registry.register(Language::Python, Box::new(PythonExtractor));
        registry
    }
}
