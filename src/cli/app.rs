use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "memtier-config")]
#[command(about = "Inspect and validate memtier policy configuration")]
pub struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the default memtier options
    Defaults,
    /// Load a configuration file and print the effective configuration
    Check {
        /// File to check; overrides --config
        file: Option<PathBuf>,
    },
    /// List registered configuration sections
    Sections,
}
