pub mod format;

use crate::config::MapperConfig;
use crate::error::MapError;
use crate::parser::{ExtractorRegistry, Language, LanguageClassifier, Symbol, SymbolKind};
use crate::walker::{DirectoryWalker, PathFilter, WalkedFile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

pub use format::OutputFormat;

/// Compressed view of a whole codebase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMap {
    pub root_path: String,
    pub languages: Vec<Language>,
    pub files: Vec<FileSymbols>,
    pub statistics: ProjectStats,
    /// The file cap stopped the walk early. Not part of the serialized form.
    #[serde(skip)]
    pub truncated: bool,
}

/// Symbols extracted from a single file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSymbols {
    pub path: String,
    pub language: Language,
    pub symbols: Vec<Symbol>,
    pub line_count: usize,
}

/// Aggregate statistics.
///
/// Symbol totals count every symbol including interface methods and other
/// children, so `total_symbols` always equals the sum of `by_symbol_kind`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total_files: usize,
    pub total_lines: usize,
    pub total_symbols: usize,
    pub by_language: BTreeMap<Language, usize>,
    pub by_symbol_kind: BTreeMap<SymbolKind, usize>,
}

/// Scan parameters supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// 0 disables the cap
    pub max_files: usize,
}

/// Walks a tree, extracts symbols and folds them into a [`ProjectMap`].
///
/// Holds only immutable configuration; every call to [`CodebaseMapper::map`]
/// is an independent snapshot.
pub struct CodebaseMapper {
    config: MapperConfig,
    classifier: LanguageClassifier,
    registry: ExtractorRegistry,
}

impl CodebaseMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self::with_parts(config, LanguageClassifier::default(), ExtractorRegistry::default())
    }

    pub fn with_parts(
        config: MapperConfig,
        classifier: LanguageClassifier,
        registry: ExtractorRegistry,
    ) -> Self {
        Self {
            config,
            classifier,
            registry,
        }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn map(&self, root: &Path, options: &MapOptions) -> Result<ProjectMap, MapError> {
        tracing::info!("Mapping codebase at: {}", root.display());

        let filter = PathFilter::new(&options.include, &options.exclude);
        let walked = DirectoryWalker::new(&self.config, &self.classifier).walk(
            root,
            &filter,
            options.max_files,
        )?;

        let mut map = self.aggregate(root, &walked.files);
        map.truncated = walked.truncated;

        tracing::info!(
            "Mapped {} files, {} symbols{}",
            map.statistics.total_files,
            map.statistics.total_symbols,
            if map.truncated { " (partial)" } else { "" }
        );
        Ok(map)
    }

    /// Extract every walked file. Files that cannot be read or parsed are
    /// left out of both `files` and the statistics.
    pub fn aggregate(&self, root: &Path, walked: &[WalkedFile]) -> ProjectMap {
        let mut files = Vec::with_capacity(walked.len());

        for file in walked {
            let content = match std::fs::read_to_string(&file.path) {
                Ok(c) => c,
                Err(e) => {
                    tracing::debug!("Skipping unreadable file {}: {}", file.relative_path, e);
                    continue;
                }
            };

            let symbols = match self.registry.extract(file.language, &content) {
                Ok(symbols) => symbols,
                Err(e) => {
                    tracing::warn!("Failed to extract symbols from {}: {}", file.relative_path, e);
                    continue;
                }
            };

            files.push(FileSymbols {
                path: file.relative_path.clone(),
                language: file.language,
                symbols,
                line_count: line_count(&content),
            });
        }

        ProjectMap::from_files(root.to_string_lossy().into_owned(), files)
    }
}

impl Default for CodebaseMapper {
    fn default() -> Self {
        Self::new(MapperConfig::default())
    }
}

impl ProjectMap {
    /// Build a map and its statistics from already extracted files.
    pub fn from_files(root_path: String, files: Vec<FileSymbols>) -> Self {
        let statistics = ProjectStats::compute(&files);
        let languages = files
            .iter()
            .map(|f| f.language)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            root_path,
            languages,
            files,
            statistics,
            truncated: false,
        }
    }
}

impl ProjectStats {
    pub fn compute(files: &[FileSymbols]) -> Self {
        let mut stats = Self::default();

        for file in files {
            stats.total_files += 1;
            stats.total_lines += file.line_count;
            *stats.by_language.entry(file.language).or_default() += 1;

            for sym in &file.symbols {
                stats.count(sym);
                for child in &sym.children {
                    stats.count(child);
                }
            }
        }

        stats
    }

    fn count(&mut self, sym: &Symbol) {
        self.total_symbols += 1;
        *self.by_symbol_kind.entry(sym.kind).or_default() += 1;
    }
}

/// Resolve a user supplied directory against the working directory so the
/// map always reports an absolute `root_path`.
pub fn absolute_root(dir: &Path) -> std::io::Result<PathBuf> {
    Ok(resolve_against(&std::env::current_dir()?, dir))
}

fn resolve_against(base: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    let mut resolved = base.to_path_buf();
    for component in dir.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    resolved
}

/// Newline count plus one, so an empty file has one line.
fn line_count(content: &str) -> usize {
    content.bytes().filter(|&b| b == b'\n').count() + 1
}
