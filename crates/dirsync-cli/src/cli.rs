//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// dirsync - Keep a client and a dev folder in step by modification time
#[derive(Parser, Debug)]
#[command(name = "dirsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(
        short,
        long,
        global = true,
        env = "DIRSYNC_CONFIG",
        default_value = "dirsync.toml"
    )]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Scan both folders, write the snapshot report and copy newer files
    Run {
        /// Show the copies without writing the report or touching any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the reconciliation table without side effects
    Plan {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
