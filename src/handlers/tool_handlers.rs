use crate::map::{absolute_root, CodebaseMapper, MapOptions, OutputFormat};
use crate::mcp::types::Content;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Tool handlers for MCP server
pub struct ToolHandlers {
    mapper: Arc<CodebaseMapper>,
}

/// Arguments of the `map_codebase` tool after defaults are applied
#[derive(Debug, Clone, PartialEq)]
pub struct MapRequest {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub max_files: usize,
}

impl MapRequest {
    pub fn from_args(args: &Value, default_max_files: usize) -> Result<Self> {
        let path = args
            .get("path")
            .and_then(|v| v.as_str())
            .context("Missing 'path' argument")?;

        let format = args.get("format").and_then(|v| v.as_str()).unwrap_or("markdown");
        let compact = args.get("compact").and_then(|v| v.as_bool()).unwrap_or(false);
        let max_files = match args.get("max_files") {
            None | Some(Value::Null) => default_max_files,
            Some(v) => v
                .as_u64()
                .context("'max_files' must be a non-negative integer")? as usize,
        };

        let path = absolute_root(Path::new(path)).context("Failed to resolve current directory")?;

        Ok(Self {
            path,
            format: OutputFormat::parse(format, compact),
            include: string_list(args, "include")?,
            exclude: string_list(args, "exclude")?,
            max_files,
        })
    }
}

/// Accepts an array of strings or a single comma-separated string.
fn string_list(args: &Value, key: &str) -> Result<Vec<String>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .with_context(|| format!("'{}' must contain only strings", key))
            })
            .collect(),
        Some(_) => anyhow::bail!("'{}' must be a string or an array of strings", key),
    }
}

impl ToolHandlers {
    pub fn new(mapper: Arc<CodebaseMapper>) -> Self {
        Self { mapper }
    }

    /// Handle map_codebase tool
    pub async fn handle_map_codebase(&self, args: &Value) -> Result<Vec<Content>> {
        let request = MapRequest::from_args(args, self.mapper.config().server_max_files)?;
        tracing::info!("map_codebase: {}", request.path.display());

        let mapper = Arc::clone(&self.mapper);
        let options = MapOptions {
            include: request.include.clone(),
            exclude: request.exclude.clone(),
            max_files: request.max_files,
        };
        let root = request.path.clone();

        let map = tokio::task::spawn_blocking(move || mapper.map(&root, &options))
            .await
            .context("Mapping task panicked")??;

        let mut content = vec![Content::text(
            request.format.render(&map).context("Failed to format map")?,
        )];
        if map.truncated {
            content.push(Content::text(format!(
                "Note: partial map, stopped after {} files. Narrow the path or raise max_files.",
                request.max_files
            )));
        }
        Ok(content)
    }
}
