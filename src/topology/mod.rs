//! Topology hint values
//!
//! A hint describes the CPU, NUMA node and socket affinity a resource
//! provider (a device, a volume, ...) would like a container to have.
//! The memtier options only store hints; they never interpret them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Affinity hint published by a single provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyHint {
    #[serde(rename = "Provider", default, skip_serializing_if = "String::is_empty")]
    pub provider: String,
    #[serde(rename = "CPUs", default, skip_serializing_if = "String::is_empty")]
    pub cpus: String,
    #[serde(rename = "NUMAs", default, skip_serializing_if = "String::is_empty")]
    pub numas: String,
    #[serde(rename = "Sockets", default, skip_serializing_if = "String::is_empty")]
    pub sockets: String,
}

/// Hints for one container, keyed by provider
pub type TopologyHints = HashMap<String, TopologyHint>;

impl TopologyHint {
    pub fn new(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            ..Self::default()
        }
    }

    pub fn with_cpus(mut self, cpus: &str) -> Self {
        self.cpus = cpus.to_string();
        self
    }

    pub fn with_numas(mut self, numas: &str) -> Self {
        self.numas = numas.to_string();
        self
    }

    pub fn with_sockets(mut self, sockets: &str) -> Self {
        self.sockets = sockets.to_string();
        self
    }

    /// Collect hints into a provider-keyed set
    pub fn into_hints(hints: impl IntoIterator<Item = TopologyHint>) -> TopologyHints {
        hints
            .into_iter()
            .map(|hint| (hint.provider.clone(), hint))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_are_omitted() {
        let hint = TopologyHint::new("gpu").with_numas("1");
        let json = serde_json::to_value(&hint).unwrap();

        assert_eq!(json, serde_json::json!({"Provider": "gpu", "NUMAs": "1"}));
    }

    #[test]
    fn test_into_hints_keys_by_provider() {
        let hints = TopologyHint::into_hints(vec![
            TopologyHint::new("gpu").with_cpus("0-3"),
            TopologyHint::new("nic").with_sockets("1"),
        ]);

        assert_eq!(hints.len(), 2);
        assert_eq!(hints["gpu"].cpus, "0-3");
        assert_eq!(hints["nic"].sockets, "1");
    }
}
