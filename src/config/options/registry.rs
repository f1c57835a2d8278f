//! Registry of configuration sections
//!
//! Each section is a typed value living at a dot-separated path
//! (e.g. `policy.memtier`) in the configuration document. Loading a document
//! deserializes every section over its defaults and swaps the results into
//! the sections' live slots, all or nothing.

use super::slot::ConfigSlot;
use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Path and help text of a registered section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub path: String,
    pub description: String,
}

/// Installs a parsed value into its slot
type Commit = Box<dyn FnOnce() + Send>;

trait Section: Send + Sync {
    fn description(&self) -> &str;

    /// Parse the section's document fragment without touching the live value
    fn prepare(&self, fragment: Option<&Value>) -> Result<Commit>;

    fn reset(&self);

    fn current(&self) -> Result<Value>;
}

struct TypedSection<T> {
    description: String,
    live: Arc<ConfigSlot<T>>,
    factory: fn() -> T,
}

impl<T> TypedSection<T>
where
    T: Send + Sync + 'static,
{
    fn commit(&self, value: T) -> Commit {
        let live = self.live.clone();
        Box::new(move || live.store(value))
    }
}

impl<T> Section for TypedSection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn description(&self) -> &str {
        &self.description
    }

    fn prepare(&self, fragment: Option<&Value>) -> Result<Commit> {
        let Some(fragment) = fragment else {
            return Ok(self.commit((self.factory)()));
        };
        let overrides = fragment
            .as_object()
            .context("Configuration section must be a table of fields")?;

        // Fields missing from the fragment keep the factory defaults.
        let mut fields = match serde_json::to_value((self.factory)())? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        for (key, value) in overrides {
            fields.insert(key.clone(), value.clone());
        }

        let value = serde_json::from_value(Value::Object(fields))?;
        Ok(self.commit(value))
    }

    fn reset(&self) {
        self.live.store((self.factory)());
    }

    fn current(&self) -> Result<Value> {
        Ok(serde_json::to_value(&*self.live.load())?)
    }
}

/// Thread-safe registry of configuration sections
pub struct ConfigRegistry {
    sections: RwLock<BTreeMap<String, Box<dyn Section>>>,
}

impl ConfigRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            sections: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Box<dyn Section>>> {
        self.sections.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Box<dyn Section>>> {
        self.sections.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a configuration section.
    ///
    /// Future loads populate `live` in place; `factory` supplies the value
    /// for fields (or whole sections) a document leaves unset. Returns an
    /// error if `path` is malformed or overlaps an already registered path.
    pub fn register<T>(
        &self,
        path: &str,
        description: &str,
        live: Arc<ConfigSlot<T>>,
        factory: fn() -> T,
    ) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            anyhow::bail!("Invalid configuration path '{}'", path);
        }

        let mut sections = self.write();
        if sections.contains_key(path) {
            anyhow::bail!("Configuration path '{}' is already registered", path);
        }
        if let Some(other) = sections.keys().find(|other| nested(path, other)) {
            anyhow::bail!(
                "Configuration path '{}' overlaps registered path '{}'",
                path,
                other
            );
        }

        log::debug!("Registered configuration section: {} ({})", path, description);
        sections.insert(
            path.to_string(),
            Box::new(TypedSection {
                description: description.to_string(),
                live,
                factory,
            }),
        );
        Ok(())
    }

    /// Apply a configuration document to every registered section.
    ///
    /// Sections absent from the document are reset to their defaults. If any
    /// section fails to parse, no live value is changed.
    pub fn load(&self, document: &Value) -> Result<()> {
        let sections = self.read();
        let mut commits = Vec::with_capacity(sections.len());

        for (path, section) in sections.iter() {
            let fragment = lookup(document, path);
            if fragment.is_none() {
                log::warn!("No configuration for '{}', using defaults", path);
            }
            let commit = section
                .prepare(fragment)
                .with_context(|| format!("Invalid configuration for '{}'", path))?;
            log::debug!("Parsed configuration for '{}'", path);
            commits.push(commit);
        }

        for commit in commits {
            commit();
        }
        log::info!("Applied configuration to {} sections", sections.len());
        Ok(())
    }

    /// Reset every section to its defaults
    pub fn reset(&self) {
        for (path, section) in self.read().iter() {
            log::debug!("Resetting configuration for '{}'", path);
            section.reset();
        }
    }

    /// Effective configuration of every section as one nested document
    pub fn dump(&self) -> Result<Value> {
        let mut root = Map::new();
        for (path, section) in self.read().iter() {
            let value = section
                .current()
                .with_context(|| format!("Failed to serialize configuration for '{}'", path))?;
            merge_tables(&mut root, nest(path, value));
        }
        Ok(Value::Object(root))
    }

    /// List all sections, sorted by path
    pub fn describe(&self) -> Vec<SectionInfo> {
        self.read()
            .iter()
            .map(|(path, section)| SectionInfo {
                path: path.clone(),
                description: section.description().to_string(),
            })
            .collect()
    }

    /// Check if a section is registered
    pub fn contains(&self, path: &str) -> bool {
        self.read().contains_key(path)
    }

    /// Get total number of registered sections
    pub fn count(&self) -> usize {
        self.read().len()
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// True if one path is a proper prefix of the other (`a` vs `a.b`)
fn nested(path: &str, other: &str) -> bool {
    let (short, long) = if path.len() < other.len() {
        (path, other)
    } else {
        (other, path)
    };
    long.strip_prefix(short)
        .is_some_and(|rest| rest.starts_with('.'))
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |node, key| node.get(key))
}

/// Wrap `value` in one table per path segment
fn nest(path: &str, value: Value) -> Map<String, Value> {
    let mut segments = path.rsplit('.');
    let mut table = Map::new();
    let innermost = segments.next().unwrap_or(path);
    table.insert(innermost.to_string(), value);
    for segment in segments {
        let mut outer = Map::new();
        outer.insert(segment.to_string(), Value::Object(table));
        table = outer;
    }
    table
}

fn merge_tables(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(&key) {
            Some(Value::Object(existing)) if value.is_object() => {
                if let Value::Object(incoming) = value {
                    merge_tables(existing, incoming);
                }
            }
            _ => {
                target.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Limits {
        #[serde(rename = "Enabled")]
        enabled: bool,
        #[serde(rename = "Max")]
        max: u32,
    }

    fn default_limits() -> Limits {
        Limits {
            enabled: true,
            max: 10,
        }
    }

    fn registry_with(paths: &[&str]) -> (ConfigRegistry, Vec<Arc<ConfigSlot<Limits>>>) {
        let registry = ConfigRegistry::new();
        let slots = paths
            .iter()
            .map(|path| {
                let slot = Arc::new(ConfigSlot::new(default_limits()));
                registry
                    .register(path, "test limits", slot.clone(), default_limits)
                    .unwrap();
                slot
            })
            .collect();
        (registry, slots)
    }

    #[test]
    fn test_register_and_describe() {
        let (registry, _) = registry_with(&["b.limits", "a.limits"]);

        assert_eq!(registry.count(), 2);
        assert!(registry.contains("a.limits"));
        assert!(!registry.contains("a"));

        let info = registry.describe();
        assert_eq!(info[0].path, "a.limits");
        assert_eq!(info[1].path, "b.limits");
        assert_eq!(info[0].description, "test limits");
    }

    #[test]
    fn test_duplicate_registration() {
        let (registry, _) = registry_with(&["test.limits"]);
        let slot = Arc::new(ConfigSlot::new(default_limits()));

        let result = registry.register("test.limits", "again", slot, default_limits);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_and_overlapping_paths() {
        let (registry, _) = registry_with(&["test.limits"]);
        let slot = Arc::new(ConfigSlot::new(default_limits()));

        assert!(registry.register("", "", slot.clone(), default_limits).is_err());
        assert!(registry.register("a..b", "", slot.clone(), default_limits).is_err());
        assert!(registry.register("test", "", slot.clone(), default_limits).is_err());
        assert!(registry.register("test.limits.inner", "", slot.clone(), default_limits).is_err());
        assert!(registry.register("test.limitsx", "", slot, default_limits).is_ok());
    }

    #[test]
    fn test_load_overlays_defaults() {
        let (registry, slots) = registry_with(&["test.limits"]);

        registry
            .load(&json!({"test": {"limits": {"Max": 42}}}))
            .unwrap();

        assert_eq!(
            *slots[0].load(),
            Limits {
                enabled: true,
                max: 42
            }
        );
    }

    #[test]
    fn test_load_missing_section_resets() {
        let (registry, slots) = registry_with(&["test.limits"]);
        slots[0].store(Limits {
            enabled: false,
            max: 1,
        });

        registry.load(&json!({})).unwrap();

        assert_eq!(*slots[0].load(), default_limits());
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let (registry, slots) = registry_with(&["a.limits", "b.limits"]);

        let result = registry.load(&json!({
            "a": {"limits": {"Max": 5}},
            "b": {"limits": {"Max": "many"}}
        }));

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("b.limits"));
        assert_eq!(*slots[0].load(), default_limits());
        assert_eq!(*slots[1].load(), default_limits());
    }

    #[test]
    fn test_load_rejects_non_table_section() {
        let (registry, _) = registry_with(&["test.limits"]);

        let result = registry.load(&json!({"test": {"limits": 3}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_reset() {
        let (registry, slots) = registry_with(&["test.limits"]);
        registry
            .load(&json!({"test": {"limits": {"Enabled": false}}}))
            .unwrap();
        assert!(!slots[0].load().enabled);

        registry.reset();
        assert_eq!(*slots[0].load(), default_limits());
    }

    #[test]
    fn test_dump_nests_paths() {
        let (registry, _) = registry_with(&["policy.a", "policy.b", "other"]);

        let dump = registry.dump().unwrap();
        assert_eq!(
            dump,
            json!({
                "other": {"Enabled": true, "Max": 10},
                "policy": {
                    "a": {"Enabled": true, "Max": 10},
                    "b": {"Enabled": true, "Max": 10}
                }
            })
        );
    }
}
