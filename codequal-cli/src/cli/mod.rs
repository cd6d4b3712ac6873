//! CLI command definitions and handlers

mod check;
mod config;
mod metrics;
mod vocabulary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate a batch size (at least 1)
fn parse_batch_size(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("batch size must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

/// codequal - maintainability scores for Python classes and functions
#[derive(Parser, Debug)]
#[command(name = "codequal")]
#[command(
    version,
    about = "Score Python classes and functions for maintainability, code smells and naming quality",
    long_about = "codequal extracts every class and function from Python files, computes size, \
Halstead and McCabe metrics, runs pretrained large-class / long-method smell models and scores \
identifier names against an English vocabulary index.\n\n\
Each entity gets a general quality score on a /10 scale.",
    after_help = "\
Examples:
  codequal check app/models.py                 Score every class and function
  codequal check src/*.py --format json        JSON output for scripting
  codequal metrics app/models.py               Print raw metric vectors (no models needed)
  codequal vocabulary upload --dataset words.csv
  codequal config init                         Write an example user config"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (replaces ./codequal.toml)
    #[arg(long, global = true, env = "CODEQUAL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score classes and functions in Python files
    #[command(after_help = "\
Examples:
  codequal check app/models.py
  codequal check a.py b.py --format json -o scores.json")]
    Check {
        /// Python files to score
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Write the report to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Print the metric vector of every class and function as JSON
    Metrics {
        /// Python files to measure
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Manage the vocabulary stored in the vector index
    Vocabulary {
        #[command(subcommand)]
        action: VocabularyAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum VocabularyAction {
    /// Embed dictionary words and upsert them into the index
    Upload {
        /// `;`-delimited word-frequency file (word in the first column)
        #[arg(long)]
        dataset: PathBuf,

        /// Words per request
        #[arg(long, default_value = "500", value_parser = parse_batch_size)]
        batch_size: usize,

        /// File that collects uploaded words
        #[arg(long, default_value = crate::naming::vocabulary::HANDLED_WORDS_FILE)]
        handled_file: PathBuf,

        /// File that collects words from failed batches
        #[arg(long, default_value = crate::naming::vocabulary::NOT_HANDLED_WORDS_FILE)]
        not_handled_file: PathBuf,
    },

    /// Delete dictionary words from the index
    Delete {
        /// `;`-delimited word-frequency file (word in the first column)
        #[arg(long)]
        dataset: PathBuf,

        /// Ids per request
        #[arg(long, default_value = "500", value_parser = parse_batch_size)]
        batch_size: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example config file (user config by default)
    Init {
        /// Where to write the file
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Print the resolved configuration with secrets masked
    Show,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let config_file = cli.config.as_deref();
    match cli.command {
        Commands::Check {
            files,
            format,
            output,
        } => check::run(config_file, &files, &format, output.as_deref()),

        Commands::Metrics { files } => metrics::run(&files),

        Commands::Vocabulary { action } => match action {
            VocabularyAction::Upload {
                dataset,
                batch_size,
                handled_file,
                not_handled_file,
            } => vocabulary::upload(
                config_file,
                &dataset,
                batch_size,
                handled_file,
                not_handled_file,
            ),
            VocabularyAction::Delete {
                dataset,
                batch_size,
            } => vocabulary::delete(config_file, &dataset, batch_size),
        },

        Commands::Config { action } => match action {
            ConfigAction::Init { path } => config::init(path),
            ConfigAction::Show => config::show(config_file),
        },
    }
}
