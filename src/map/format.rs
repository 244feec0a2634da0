//! Renderers for [`ProjectMap`]: JSON, full and compact markdown outlines, and
//! a short plain-text summary.

use super::{FileSymbols, ProjectMap};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

/// Maximum symbols listed in a summary before the truncation marker.
pub const SUMMARY_SYMBOL_LIMIT: usize = 50;

pub const TRUNCATION_MARKER: &str = "  ... (truncated)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Summary,
    Markdown { compact: bool },
}

impl OutputFormat {
    /// Case-insensitive selector. Unknown names give the full markdown outline;
    /// `compact` only applies when markdown is asked for by name.
    pub fn parse(name: &str, compact: bool) -> Self {
        match name.trim().to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "summary" => OutputFormat::Summary,
            "markdown" | "md" => OutputFormat::Markdown { compact },
            other => {
                tracing::debug!("Unknown output format {:?}, using markdown", other);
                OutputFormat::Markdown { compact: false }
            }
        }
    }

    pub fn render(&self, map: &ProjectMap) -> serde_json::Result<String> {
        Ok(match self {
            OutputFormat::Json => format_json(map)?,
            OutputFormat::Summary => format_summary(map),
            OutputFormat::Markdown { compact } => format_markdown(map, *compact),
        })
    }
}

pub fn format_json(map: &ProjectMap) -> serde_json::Result<String> {
    serde_json::to_string_pretty(map)
}

/// Outline grouped by directory. Files without symbols are left out of the
/// listing but still counted in the header.
pub fn format_markdown(map: &ProjectMap, compact: bool) -> String {
    let mut out = String::new();

    let _ = write!(out, "# Project: {}", project_name(&map.root_path));
    if compact {
        out.push_str(" (Compact)");
    }
    out.push_str("\n\n");
    let _ = writeln!(out, "**Languages**: {}", language_list(map));
    let _ = writeln!(
        out,
        "**Files**: {} | **Lines**: {} | **Symbols**: {}\n",
        map.statistics.total_files, map.statistics.total_lines, map.statistics.total_symbols
    );
    out.push_str("---\n\n");

    for (dir, files) in group_by_directory(&map.files) {
        let _ = writeln!(out, "## {}\n", dir);

        for file in files.into_iter().filter(|f| !f.symbols.is_empty()) {
            let _ = writeln!(out, "### {} ({} lines)\n", file_name(&file.path), file.line_count);

            for sym in &file.symbols {
                let _ = writeln!(out, "- `{}` :{}", sym.label(), sym.start_line);
                if compact {
                    continue;
                }
                for child in &sym.children {
                    let _ = writeln!(out, "  - `{}` :{}", child.label(), child.start_line);
                }
            }
            out.push('\n');
        }
    }

    out
}

pub fn format_summary(map: &ProjectMap) -> String {
    let mut out = String::new();
    let stats = &map.statistics;

    let _ = writeln!(out, "Project: {}", project_name(&map.root_path));
    let _ = writeln!(out, "Languages: {}", language_list(map));
    let _ = writeln!(
        out,
        "Files: {}, Lines: {}, Symbols: {}\n",
        stats.total_files, stats.total_lines, stats.total_symbols
    );

    out.push_str("Symbol breakdown:\n");
    let mut kinds: Vec<_> = stats.by_symbol_kind.iter().collect();
    kinds.sort_by_key(|(kind, _)| kind.as_str());
    for (kind, count) in kinds {
        let _ = writeln!(out, "  {}: {}", kind.as_str(), count);
    }

    out.push_str("\nKey symbols:\n");
    let mut listed = 0;
    for file in &map.files {
        for sym in &file.symbols {
            if listed == SUMMARY_SYMBOL_LIMIT {
                out.push_str(TRUNCATION_MARKER);
                out.push('\n');
                return out;
            }
            let _ = writeln!(
                out,
                "  {}.{} ({})",
                file_name(&file.path),
                sym.name,
                sym.kind.as_str()
            );
            listed += 1;
        }
    }

    out
}

fn group_by_directory(files: &[FileSymbols]) -> BTreeMap<String, Vec<&FileSymbols>> {
    let mut dirs: BTreeMap<String, Vec<&FileSymbols>> = BTreeMap::new();
    for file in files {
        let dir = match file.path.rfind('/') {
            Some(idx) => file.path[..idx].to_string(),
            None => "/".to_string(),
        };
        dirs.entry(dir).or_default().push(file);
    }
    dirs
}

fn project_name(root_path: &str) -> String {
    Path::new(root_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root_path.to_string())
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn language_list(map: &ProjectMap) -> String {
    map.languages
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Language, Symbol, SymbolKind};

    fn sample_map() -> ProjectMap {
        let mut store = Symbol::at_line("Store", SymbolKind::Interface, 3);
        store.signature = Some("interface Store".to_string());
        store.end_line = 6;
        store.children = vec![Symbol::at_line("Get", SymbolKind::Method, 4)];

        ProjectMap::from_files(
            "/test/project".to_string(),
            vec![
                FileSymbols {
                    path: "main.go".to_string(),
                    language: Language::Go,
                    symbols: vec![store],
                    line_count: 100,
                },
                FileSymbols {
                    path: "web/app.ts".to_string(),
                    language: Language::TypeScript,
                    symbols: vec![Symbol::at_line("App", SymbolKind::Class, 1)],
                    line_count: 50,
                },
                FileSymbols {
                    path: "web/empty.ts".to_string(),
                    language: Language::TypeScript,
                    symbols: vec![],
                    line_count: 2,
                },
            ],
        )
    }

    #[test]
    fn test_format_markdown() {
        let md = format_markdown(&sample_map(), false);

        assert!(md.starts_with("# Project: project\n"));
        assert!(md.contains("**Languages**: go, typescript"));
        assert!(md.contains("**Files**: 3 | **Lines**: 152 | **Symbols**: 3"));
        assert!(md.contains("## /\n\n### main.go (100 lines)\n\n- `interface Store` :3\n  - `method Get` :4\n"));
        assert!(md.contains("## web\n\n### app.ts (50 lines)\n\n- `class App` :1\n"));
        assert!(!md.contains("empty.ts"));
        assert!(md.find("## /").unwrap() < md.find("## web").unwrap());
    }

    #[test]
    fn test_format_compact_markdown_hides_children() {
        let md = format_markdown(&sample_map(), true);

        assert!(md.starts_with("# Project: project (Compact)\n"));
        assert!(md.contains("- `interface Store` :3\n"));
        assert!(!md.contains("method Get"));
    }

    #[test]
    fn test_format_summary() {
        let summary = format_summary(&sample_map());

        assert!(summary.contains("Files: 3, Lines: 152, Symbols: 3"));
        assert!(summary.contains("Symbol breakdown:\n  class: 1\n  interface: 1\n  method: 1\n"));
        assert!(summary.contains("  main.go.Store (interface)\n"));
        assert!(summary.contains("  app.ts.App (class)\n"));
        assert!(!summary.contains("truncated"));
    }

    #[test]
    fn test_format_summary_truncates() {
        let symbols = (1..=60)
            .map(|i| Symbol::at_line(format!("f{}", i), SymbolKind::Function, i))
            .collect();
        let map = ProjectMap::from_files(
            "/p".to_string(),
            vec![FileSymbols {
                path: "lib.py".to_string(),
                language: Language::Python,
                symbols,
                line_count: 60,
            }],
        );

        let summary = format_summary(&map);
        let key_symbols: Vec<_> = summary
            .split("Key symbols:\n")
            .nth(1)
            .unwrap()
            .lines()
            .collect();

        assert_eq!(key_symbols.len(), 51);
        assert_eq!(key_symbols[49], "  lib.py.f50 (function)");
        assert_eq!(key_symbols[50], TRUNCATION_MARKER);
    }

    #[test]
    fn test_output_format_selector() {
        assert_eq!(OutputFormat::parse("JSON", false), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("Summary", true), OutputFormat::Summary);
        assert_eq!(OutputFormat::parse("md", true), OutputFormat::Markdown { compact: true });
        assert_eq!(
            OutputFormat::parse("markdown", false),
            OutputFormat::Markdown { compact: false }
        );
        assert_eq!(OutputFormat::parse("yaml", true), OutputFormat::Markdown { compact: false });
    }

    #[test]
    fn test_render_json() {
        let json = OutputFormat::Json.render(&sample_map()).unwrap();
        assert!(json.contains("\"root_path\": \"/test/project\""));
        assert!(json.contains("\"line_count\": 100"));
    }
}
