use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::commands::batch::BatchAction;

#[derive(Parser)]
#[command(
    name = "kanuni",
    author = "V-Lawyer Team",
    version,
    about = "AI-powered legal document classification CLI - The Ottoman Edition",
    long_about = "Kanuni brings the wisdom of Suleiman the Lawgiver to your terminal.\nClassify legal documents against a fixed taxonomy, extract their dates, and drive remote batch classification runs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a document against the legal taxonomy
    Classify {
        /// Path to the document to classify
        #[arg(value_name = "FILE")]
        file: String,

        /// Output format (text, json, markdown)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Extract dates and deadlines from a document or directory
    Extract {
        /// Path to document or directory
        #[arg(value_name = "PATH")]
        path: String,

        /// Output format (ical, json, csv)
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Drive classification of a remote document population
    Batch {
        #[command(subcommand)]
        action: BatchAction,
    },

    /// Configure Kanuni settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
    /// Reset configuration to defaults
    Reset,
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Classify { file, format } => commands::classify::execute(file, format).await,
            Commands::Extract { path, format } => commands::extract::execute(path, format).await,
            Commands::Batch { action } => commands::batch::execute(action).await,
            Commands::Config { action } => commands::config::execute(action).await,
            Commands::Completions { shell } => commands::completions::execute(*shell),
        }
    }
}
