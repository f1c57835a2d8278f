//! File-backed configuration documents

use super::registry::ConfigRegistry;
use anyhow::{Context, Result};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Serialization format of a configuration document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
}

impl DocumentFormat {
    /// JSON for `.json` files, TOML for anything else
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Toml,
        }
    }
}

/// Parse a document into the tree the registry consumes
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Toml => toml::from_str(text).context("Failed to parse TOML document"),
        DocumentFormat::Json => serde_json::from_str(text).context("Failed to parse JSON document"),
    }
}

/// Default location of the configuration file
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = if cfg!(target_os = "linux") {
        // Use XDG config directory on Linux
        dirs::config_dir()
            .context("Failed to get XDG config directory")?
            .join("memtier")
    } else {
        dirs::home_dir()
            .context("Failed to get home directory")?
            .join(".memtier")
    };

    Ok(config_dir.join("config.toml"))
}

/// Feeds configuration documents into a registry
pub struct ConfigStore {
    registry: Arc<ConfigRegistry>,
}

impl ConfigStore {
    pub fn new(registry: Arc<ConfigRegistry>) -> Self {
        Self { registry }
    }

    /// Parse `text` and apply it to every registered section
    pub fn load_str(&self, text: &str, format: DocumentFormat) -> Result<()> {
        let document = parse_document(text, format)?;
        self.registry.load(&document)
    }

    /// Read, parse and apply a configuration file
    pub fn load_file(&self, path: &Path) -> Result<()> {
        debug!("Loading config from: {:?}", path);

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        self.load_str(&content, DocumentFormat::from_path(path))
            .with_context(|| format!("Failed to load config file: {:?}", path))?;

        info!("Loaded configuration from {:?}", path);
        Ok(())
    }

    /// Like [`ConfigStore::load_file`], but a missing file means defaults
    pub fn load_file_or_defaults(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            info!("Config file {:?} doesn't exist, using defaults", path);
            self.registry.reset();
            return Ok(());
        }
        self.load_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::ConfigSlot;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Flags {
        #[serde(rename = "Verbose")]
        verbose: bool,
    }

    fn setup_test_store() -> (ConfigStore, Arc<ConfigSlot<Flags>>) {
        let registry = Arc::new(ConfigRegistry::new());
        let slot = Arc::new(ConfigSlot::default());
        registry
            .register("test.flags", "test flags", slot.clone(), Flags::default)
            .unwrap();

        (ConfigStore::new(registry), slot)
    }

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("memtier-store-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a.JSON")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("a.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("config")), DocumentFormat::Toml);
    }

    #[test]
    fn test_parse_toml_tables() {
        let doc = parse_document("[test.flags]\nVerbose = true\n", DocumentFormat::Toml).unwrap();
        assert_eq!(doc, json!({"test": {"flags": {"Verbose": true}}}));
    }

    #[test]
    fn test_load_str_json() {
        let (store, slot) = setup_test_store();

        store
            .load_str(r#"{"test": {"flags": {"Verbose": true}}}"#, DocumentFormat::Json)
            .unwrap();
        assert!(slot.load().verbose);
    }

    #[test]
    fn test_load_file() {
        let (store, slot) = setup_test_store();
        let path = temp_file("flags.toml", "[test.flags]\nVerbose = true\n");

        store.load_file(&path).unwrap();
        assert!(slot.load().verbose);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_file_reports_path() {
        let (store, _) = setup_test_store();
        let path = temp_file("broken.toml", "[test.flags\n");

        let err = store.load_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.toml"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let (store, slot) = setup_test_store();
        slot.store(Flags { verbose: true });

        let path = std::env::temp_dir().join("memtier-store-does-not-exist.toml");
        store.load_file_or_defaults(&path).unwrap();

        assert_eq!(*slot.load(), Flags::default());
    }
}
