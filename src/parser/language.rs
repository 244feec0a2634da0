use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Language tag attached to every mapped file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Go,
    Java,
    JavaScript,
    Python,
    Rust,
    TypeScript,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Go => "go",
            Language::Java => "java",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::TypeScript => "typescript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension table shared with the other tools that read these maps.
pub const DEFAULT_EXTENSIONS: &[(&str, Language)] = &[
    ("go", Language::Go),
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("js", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("py", Language::Python),
    ("rs", Language::Rust),
    ("java", Language::Java),
    ("c", Language::C),
    ("h", Language::C),
    ("cpp", Language::Cpp),
    ("hpp", Language::Cpp),
];

/// Maps file extensions to languages. Extensions are matched case-sensitively,
/// so `main.GO` is not a Go file.
#[derive(Debug, Clone)]
pub struct LanguageClassifier {
    extensions: HashMap<String, Language>,
}

impl LanguageClassifier {
    pub fn new(table: &[(&str, Language)]) -> Self {
        Self {
            extensions: table
                .iter()
                .map(|(ext, lang)| (ext.to_string(), *lang))
                .collect(),
        }
    }

    pub fn classify(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        self.extensions.get(ext).copied()
    }
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        let classifier = LanguageClassifier::default();
        assert_eq!(classifier.classify(Path::new("main.go")), Some(Language::Go));
        assert_eq!(classifier.classify(Path::new("ui/App.tsx")), Some(Language::TypeScript));
        assert_eq!(classifier.classify(Path::new("lib.jsx")), Some(Language::JavaScript));
        assert_eq!(classifier.classify(Path::new("include/io.h")), Some(Language::C));
        assert_eq!(classifier.classify(Path::new("vec.hpp")), Some(Language::Cpp));
    }

    #[test]
    fn test_classify_unknown_extensions() {
        let classifier = LanguageClassifier::default();
        assert_eq!(classifier.classify(Path::new("README.md")), None);
        assert_eq!(classifier.classify(Path::new("Makefile")), None);
        assert_eq!(classifier.classify(Path::new("app.cc")), None);
    }

    #[test]
    fn test_language_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Language::TypeScript).unwrap(), "\"typescript\"");
        assert_eq!(Language::Cpp.to_string(), "cpp");
    }
}
