pub mod ignore_rules;

use crate::config::MapperConfig;
use crate::error::MapError;
use crate::parser::{Language, LanguageClassifier};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use ignore_rules::IgnoreResolver;

/// A file that survived ignore rules, pattern filters and classification
#[derive(Debug, Clone, PartialEq)]
pub struct WalkedFile {
    pub path: PathBuf,
    /// Root-relative path with `/` separators
    pub relative_path: String,
    pub language: Language,
}

#[derive(Debug, Default)]
pub struct WalkResult {
    pub files: Vec<WalkedFile>,
    /// Set when an eligible file was left out because of the file cap
    pub truncated: bool,
}

/// Include/exclude filter. A pattern matches a path if it globs it or is a
/// substring of it.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl PathFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        Self {
            include: include.to_vec(),
            exclude: exclude.to_vec(),
        }
    }

    pub fn accepts(&self, rel_path: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| pattern_matches(p, rel_path)) {
            return false;
        }
        !self.exclude.iter().any(|p| pattern_matches(p, rel_path))
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    if path.contains(pattern) {
        return true;
    }
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };
    Pattern::new(pattern)
        .map(|p| p.matches_with(path, options))
        .unwrap_or(false)
}

/// Depth-first walk collecting eligible files in file-name order
pub struct DirectoryWalker<'a> {
    config: &'a MapperConfig,
    classifier: &'a LanguageClassifier,
}

impl<'a> DirectoryWalker<'a> {
    pub fn new(config: &'a MapperConfig, classifier: &'a LanguageClassifier) -> Self {
        Self { config, classifier }
    }

    /// Walk `root`. `max_files == 0` disables the cap.
    ///
    /// Only an unreadable root is an error; failures below it skip the entry.
    pub fn walk(
        &self,
        root: &Path,
        filter: &PathFilter,
        max_files: usize,
    ) -> Result<WalkResult, MapError> {
        check_root(root)?;

        let mut resolver = IgnoreResolver::new(root, self.config);
        let mut result = WalkResult::default();
        let mut it = WalkDir::new(root).sort_by_file_name().into_iter();

        while let Some(entry) = it.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if entry.file_type().is_dir() {
                if entry.depth() == 0 {
                    continue;
                }
                resolver.track_directory(path);
                if resolver.should_ignore(path, true) {
                    tracing::debug!("Skipping directory {}", path.display());
                    it.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_file() {
                continue;
            }

            let rel_path = match path.strip_prefix(root) {
                Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };
            if !filter.accepts(&rel_path) || resolver.should_ignore(path, false) {
                continue;
            }
            let language = match self.classifier.classify(path) {
                Some(language) => language,
                None => continue,
            };

            if max_files > 0 && result.files.len() >= max_files {
                tracing::info!("File cap of {} reached, map is partial", max_files);
                result.truncated = true;
                break;
            }

            result.files.push(WalkedFile {
                path: path.to_path_buf(),
                relative_path: rel_path,
                language,
            });
        }

        Ok(result)
    }
}

fn check_root(root: &Path) -> Result<(), MapError> {
    let metadata = std::fs::metadata(root).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            MapError::RootNotFound {
                path: root.to_path_buf(),
            }
        } else {
            MapError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;

    if !metadata.is_dir() {
        return Err(MapError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    std::fs::read_dir(root).map_err(|source| MapError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn walk(root: &Path, include: &[&str], exclude: &[&str], max_files: usize) -> WalkResult {
        let config = MapperConfig::default();
        let classifier = LanguageClassifier::default();
        let include: Vec<String> = include.iter().map(|s| s.to_string()).collect();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        DirectoryWalker::new(&config, &classifier)
            .walk(root, &PathFilter::new(&include, &exclude), max_files)
            .unwrap()
    }

    fn paths(result: &WalkResult) -> Vec<&str> {
        result.files.iter().map(|f| f.relative_path.as_str()).collect()
    }

    #[test]
    fn test_walk_skips_ignored_subtrees() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        write(root, ".gitignore", "*.log\nlogs/\n");
        write(root, "main.go", "package main\n");
        write(root, "README.md", "# readme\n");
        write(root, "node_modules/lib/index.js", "function x() {}\n");
        write(root, ".hidden/secret.py", "def f():\n");
        write(root, "logs/app.py", "def f():\n");
        write(root, "src/.gitignore", "gen.go\n");
        write(root, "src/gen.go", "package src\n");
        write(root, "src/app.ts", "export class App {}\n");
        write(root, "gen.go", "package main\n");

        let result = walk(root, &[], &[], 0);

        assert_eq!(paths(&result), vec!["gen.go", "main.go", "src/app.ts"]);
        assert!(!result.truncated);
        assert_eq!(result.files[2].language, Language::TypeScript);

        let included = walk(root, &["node_modules", "*.js", ".hidden", "logs"], &[], 0);
        assert!(included.files.is_empty());
    }

    #[test]
    fn test_walk_include_exclude() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        write(root, "a.go", "package a\n");
        write(root, "a_test.go", "package a\n");
        write(root, "web/app.ts", "\n");
        write(root, "web/util.js", "\n");

        assert_eq!(paths(&walk(root, &["*.go"], &["*_test.go"], 0)), vec!["a.go"]);
        // `*` does not cross directories, but substring containment still matches
        assert_eq!(paths(&walk(root, &["*.ts"], &[], 0)), Vec::<&str>::new());
        assert_eq!(paths(&walk(root, &["web/"], &["util"], 0)), vec!["web/app.ts"]);
    }

    #[test]
    fn test_walk_file_cap() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        write(root, "a.go", "package a\n");
        write(root, "b.go", "package b\n");

        let capped = walk(root, &[], &[], 1);
        assert_eq!(paths(&capped), vec!["a.go"]);
        assert!(capped.truncated);

        let exact = walk(root, &[], &[], 2);
        assert_eq!(exact.files.len(), 2);
        assert!(!exact.truncated);
    }

    #[test]
    fn test_walk_missing_root() {
        let tmp = tempdir().unwrap();
        let config = MapperConfig::default();
        let classifier = LanguageClassifier::default();
        let result = DirectoryWalker::new(&config, &classifier).walk(
            &tmp.path().join("missing"),
            &PathFilter::default(),
            0,
        );
        assert!(matches!(result, Err(MapError::RootNotFound { .. })));
    }

    #[test]
    fn test_pattern_matching() {
        let filter = PathFilter::new(&["*.go".to_string()], &["*_test.go".to_string()]);
        assert!(filter.accepts("file.go"));
        assert!(!filter.accepts("file.txt"));
        assert!(!filter.accepts("file_test.go"));
        assert!(PathFilter::default().accepts("anything/at/all.rs"));
    }
}
