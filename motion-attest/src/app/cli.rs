//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Motion Attest - Server-side human movement verification
#[derive(Parser, Debug)]
#[command(name = "motion-attest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the verification HTTP server
    Serve {
        /// Listen address, overrides server.bind_addr
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Classify a recorded movement file offline
    Analyze {
        /// JSON file shaped like a /api/verify request body
        #[arg(short, long)]
        input: PathBuf,

        /// Override the file's targetHits
        #[arg(short, long)]
        target_hits: Option<u32>,
    },

    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "session.ttl_secs", "thresholds.curves.min_ratio")
        key: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
