//! Compressed structural maps of source trees.
//!
//! A scan walks a workspace (honouring default skip directories, hidden
//! directories and nested `.gitignore` files), extracts per-file symbol
//! outlines and aggregates them into a [`ProjectMap`] that can be rendered as
//! JSON, a markdown outline or a short summary.
//!
//! ```no_run
//! use codebase_map::{generate_map, MapOptions, OutputFormat};
//! use std::path::Path;
//!
//! let map = generate_map(Path::new("."), &MapOptions::default()).unwrap();
//! println!("{}", OutputFormat::Summary.render(&map).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod map;
pub mod mcp;
pub mod parser;
pub mod walker;

pub use config::MapperConfig;
pub use error::{ExtractError, MapError};
pub use map::{CodebaseMapper, FileSymbols, MapOptions, OutputFormat, ProjectMap, ProjectStats};
pub use parser::{Language, Symbol, SymbolKind};

/// Map `root` with the default configuration
pub fn generate_map(root: &std::path::Path, options: &MapOptions) -> Result<ProjectMap, MapError> {
    CodebaseMapper::default().map(root, options)
}
