use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole scan.
///
/// Everything below the root (unreadable entries, files that fail to parse) is
/// skipped instead of being reported here.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("Root directory does not exist: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("Root path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Failed to read root directory {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from a single file's symbol extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to load grammar: {0}")]
    Language(String),

    #[error("Parser produced no syntax tree")]
    Parse,

    #[error("Syntax error at line {line}")]
    Syntax { line: usize },
}
