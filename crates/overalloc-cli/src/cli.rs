//! CLI command definitions using clap

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// overalloc - inspect node over-allocation headroom
#[derive(Parser)]
#[command(name = "overalloc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Configuration file path (may be repeated; later files override earlier ones)
    #[arg(short = 'c', long = "config", global = true, env = "OVERALLOC_CONFIG")]
    pub config: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate configuration, then print the resolved settings
    Check,

    /// Sample this host and print the over-allocation headroom
    Probe {
        /// Number of readings to print
        #[arg(short = 'n', long, default_value_t = 5)]
        samples: u32,

        /// Sampling interval in milliseconds (overrides configuration)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}
