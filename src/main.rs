use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use memtier_config::config::options::{ConfigRegistry, registrations};
use std::sync::Arc;

mod cli;

use cli::{Cli, Commands};
use cli::commands::{check_command, defaults_command, sections_command};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();
    info!("Starting memtier-config");

    let registry = Arc::new(ConfigRegistry::new());
    registrations::register_all(&registry)?;
    debug!("Initialized configuration registry with {} sections", registry.count());

    match cli.command {
        Commands::Defaults => defaults_command(),
        Commands::Check { file } => check_command(registry, file.or(cli.config)),
        Commands::Sections => sections_command(&registry),
    }
}
