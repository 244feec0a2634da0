//! Engine configuration.
//!
//! The skip tables live here rather than in statics so that several mappers
//! with different rules can coexist (tests use trimmed-down tables).

use std::collections::HashSet;

/// Directories that are never descended into, whatever the ignore files say.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    ".git",
    "dist",
    "build",
    ".next",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".cache",
    ".idea",
    ".vscode",
    "coverage",
    ".nyc_output",
    "target",
    "bin",
    "obj",
];

/// Dot-directories that survive the hidden-directory rule.
pub const DEFAULT_ALLOWED_HIDDEN_DIRS: &[&str] = &[".agent", ".github", ".codebase-map"];

/// OS metadata files skipped regardless of extension.
pub const DEFAULT_IGNORED_FILE_NAMES: &[&str] = &[".DS_Store", "Thumbs.db"];

pub const DEFAULT_IGNORE_FILE_NAME: &str = ".gitignore";

/// File cap used by the command line.
pub const DEFAULT_MAX_FILES: usize = 2000;

/// File cap used when serving whole-codebase requests over MCP.
pub const DEFAULT_SERVER_MAX_FILES: usize = 5000;

#[derive(Debug, Clone)]
pub struct MapperConfig {
    pub skip_dirs: HashSet<String>,
    pub allowed_hidden_dirs: HashSet<String>,
    pub ignored_file_names: HashSet<String>,
    pub ignore_file_name: String,
    pub max_files: usize,
    pub server_max_files: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            skip_dirs: to_set(DEFAULT_SKIP_DIRS),
            allowed_hidden_dirs: to_set(DEFAULT_ALLOWED_HIDDEN_DIRS),
            ignored_file_names: to_set(DEFAULT_IGNORED_FILE_NAMES),
            ignore_file_name: DEFAULT_IGNORE_FILE_NAME.to_string(),
            max_files: DEFAULT_MAX_FILES,
            server_max_files: DEFAULT_SERVER_MAX_FILES,
        }
    }
}

impl MapperConfig {
    /// Defaults overridden by `CODEBASE_MAP_*` environment variables.
    ///
    /// Unparseable numbers are ignored with a warning rather than failing startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(max) = env_usize("CODEBASE_MAP_MAX_FILES") {
            config.max_files = max;
        }
        if let Some(max) = env_usize("CODEBASE_MAP_SERVER_MAX_FILES") {
            config.server_max_files = max;
        }
        if let Ok(name) = std::env::var("CODEBASE_MAP_IGNORE_FILE") {
            if !name.trim().is_empty() {
                config.ignore_file_name = name.trim().to_string();
            }
        }
        if let Ok(extra) = std::env::var("CODEBASE_MAP_SKIP_DIRS") {
            config.skip_dirs.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }

        config
    }

    pub fn with_skip_dirs(mut self, dirs: &[&str]) -> Self {
        self.skip_dirs = to_set(dirs);
        self
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

fn to_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapperConfig::default();
        assert!(config.skip_dirs.contains("node_modules"));
        assert!(config.skip_dirs.contains(".git"));
        assert!(config.allowed_hidden_dirs.contains(".github"));
        assert_eq!(config.ignore_file_name, ".gitignore");
        assert_eq!(config.max_files, 2000);
        assert_eq!(config.server_max_files, 5000);
    }

    #[test]
    fn test_with_skip_dirs_replaces_table() {
        let config = MapperConfig::default().with_skip_dirs(&["generated"]);
        assert!(config.skip_dirs.contains("generated"));
        assert!(!config.skip_dirs.contains("node_modules"));
    }
}
