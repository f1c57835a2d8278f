use anyhow::Result;
use log::info;
use memtier_config::config::options::{ConfigRegistry, ConfigStore, default_config_path};
use memtier_config::policy::memtier;
use std::path::PathBuf;
use std::sync::Arc;

/// Print the default memtier options as JSON
pub fn defaults_command() -> Result<()> {
    let json = serde_json::to_string_pretty(&memtier::default_options())?;
    println!("{}", json);
    Ok(())
}

/// Load a configuration file and print the effective configuration
///
/// Falls back to the default config path when no file is given. Fails if
/// any section of the file is invalid.
pub fn check_command(registry: Arc<ConfigRegistry>, file: Option<PathBuf>) -> Result<()> {
    let path = match file {
        Some(path) => path,
        None => default_config_path()?,
    };
    info!("Checking configuration file: {:?}", path);

    let store = ConfigStore::new(registry.clone());
    store.load_file(&path)?;

    println!("{}", serde_json::to_string_pretty(&registry.dump()?)?);
    Ok(())
}

/// List registered configuration sections
pub fn sections_command(registry: &ConfigRegistry) -> Result<()> {
    for section in registry.describe() {
        println!("{:<24} {}", section.path, section.description);
    }
    Ok(())
}

