use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codebase_map::mcp::McpServer;
use codebase_map::map::absolute_root;
use codebase_map::{CodebaseMapper, MapOptions, MapperConfig, OutputFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate compressed symbol maps of a codebase", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Map a directory's functions, types, classes and interfaces without the full source
    Map {
        /// Directory to map (default: current directory)
        dir: Option<PathBuf>,

        /// Output format: json, markdown, md, summary
        #[arg(short, long, default_value = "markdown")]
        format: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include patterns (glob or substring)
        #[arg(long, value_delimiter = ',')]
        include: Vec<String>,

        /// Exclude patterns (glob or substring)
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Maximum number of files to process, 0 for no limit
        #[arg(long)]
        max_files: Option<usize>,

        /// Hide child symbols
        #[arg(short, long)]
        compact: bool,
    },
    /// Serve the map over the Model Context Protocol on stdio
    Mcp,
}

/// Load .env files from multiple locations with priority order:
/// 1. Current working directory (project-specific config)
/// 2. XDG config directory ~/.config/codebase-map/.env (global default config)
///
/// Environment variables set directly in the shell always take highest priority.
fn load_env_files() {
    let cwd_env = std::env::current_dir().map(|p| p.join(".env")).ok();
    if let Some(path) = cwd_env {
        if path.exists() && dotenv::from_path(&path).is_ok() {
            tracing::debug!("Loaded .env from: {}", path.display());
            return;
        }
    }

    if let Some(config_dir) = get_xdg_config_dir() {
        let xdg_env = config_dir.join("codebase-map").join(".env");
        if xdg_env.exists() && dotenv::from_path(&xdg_env).is_ok() {
            tracing::debug!("Loaded .env from: {}", xdg_env.display());
            return;
        }
    }

    tracing::debug!("No .env file found, using environment variables only");
}

/// Get XDG config directory, fallback to ~/.config
fn get_xdg_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_files();

    // Logs go to stderr: stdout carries the map or the MCP stream
    let env_filter =
        EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    let cli = Cli::parse();
    let mapper = Arc::new(CodebaseMapper::new(MapperConfig::from_env()));

    match cli.command {
        Command::Map {
            dir,
            format,
            output,
            include,
            exclude,
            max_files,
            compact,
        } => {
            let root = absolute_root(dir.as_deref().unwrap_or_else(|| Path::new(".")))
                .context("Failed to resolve current directory")?;
            let options = MapOptions {
                include,
                exclude,
                max_files: max_files.unwrap_or(mapper.config().max_files),
            };

            let map = tokio::task::spawn_blocking({
                let mapper = Arc::clone(&mapper);
                move || mapper.map(&root, &options)
            })
            .await
            .context("Mapping task panicked")?
            .context("Failed to generate map")?;

            if map.truncated {
                tracing::warn!("File cap reached, the map is partial");
            }

            let rendered = OutputFormat::parse(&format, compact)
                .render(&map)
                .context("Failed to format map")?;

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Codebase map written to: {}", path.display());
                    println!(
                        "Files: {} | Symbols: {} | Languages: {}",
                        map.statistics.total_files,
                        map.statistics.total_symbols,
                        map.languages
                            .iter()
                            .map(|l| l.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
                None => println!("{}", rendered),
            }
        }
        Command::Mcp => {
            tracing::info!("Starting codebase-map MCP server...");
            McpServer::new(mapper).start().await?;
        }
    }

    Ok(())
}
