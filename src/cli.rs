//! Command-line interface parsing for Genreshelf
//!
//! This module handles parsing of CLI arguments using clap: config overrides
//! for the terminal UI, the `--genre` preselection, and the one-shot catalog
//! subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::cache::parse_limit;
use crate::config::Config;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The requested genre is not one of the configured categories
    #[error("Unknown genre: '{name}'. Configured genres: {available}")]
    UnknownGenre { name: String, available: String },
}

/// Genreshelf - Browse books by genre from a rolling cache of catalog results
#[derive(Parser, Debug)]
#[command(name = "genreshelf")]
#[command(about = "Browse books by genre from a rolling cache of catalog results")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults to the XDG config directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Books fetched per genre when warming or extending the cache
    #[arg(long, value_name = "N", value_parser = parse_limit)]
    pub limit: Option<u32>,

    /// Books handed out per drain
    #[arg(long, value_name = "N", value_parser = parse_limit)]
    pub drain: Option<u32>,

    /// Start without warming the cache
    #[arg(long)]
    pub no_warm: bool,

    /// Open with this genre selected
    #[arg(long, value_name = "GENRE")]
    pub genre: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One-shot catalog queries that print JSON and exit
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch one page of a genre straight from the catalog
    Browse {
        genre: String,
        #[arg(long, default_value = "7", value_parser = parse_limit)]
        limit: u32,
    },
    /// Search by title, author, or ISBN
    Search {
        query: String,
        #[arg(long, default_value = "5", value_parser = parse_limit)]
        limit: u32,
    },
    /// Find books by the same authors in the same categories
    Similar {
        #[arg(long = "author", required = true)]
        authors: Vec<String>,
        #[arg(long = "category", required = true)]
        categories: Vec<String>,
        #[arg(long)]
        language: String,
        #[arg(long, default_value = "7", value_parser = parse_limit)]
        limit: u32,
    },
    /// Look up an author's biography
    Author { name: String },
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Whether to warm the cache before showing the genre list
    pub warm_on_start: bool,
    /// Genre to select initially (if specified)
    pub initial_genre: Option<String>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            warm_on_start: true,
            initial_genre: None,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if `--genre` names a genre that is not configured
    pub fn from_cli(cli: &Cli, config: &Config) -> Result<Self, CliError> {
        let initial_genre = match &cli.genre {
            None => None,
            Some(name) if config.has_category(name) => Some(name.clone()),
            Some(name) => {
                let available = config
                    .cache
                    .categories
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(CliError::UnknownGenre {
                    name: name.clone(),
                    available,
                });
            }
        };

        Ok(StartupConfig {
            warm_on_start: !cli.no_warm,
            initial_genre,
        })
    }
}

/// Applies the cache flags on top of file configuration
pub fn apply_overrides(cli: &Cli, mut config: Config) -> Config {
    if let Some(limit) = cli.limit {
        config.cache.warm_limit = limit;
    }
    if let Some(drain) = cli.drain {
        config.cache.drain_size = drain as usize;
    }
    config
}
