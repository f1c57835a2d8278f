//! Forced topology hints for testing
//!
//! Lets a test setup pin the hints seen for a given pod or container
//! instead of the ones the topology subsystem would compute.

use crate::topology::TopologyHints;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Deref;

/// Per-pod or per-container topology hint overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HintOverrideMap(HashMap<String, TopologyHints>);

impl HintOverrideMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Set the hints for `id`, returning any hints it replaced
    pub fn insert(&mut self, id: impl Into<String>, hints: TopologyHints) -> Option<TopologyHints> {
        self.0.insert(id.into(), hints)
    }

    /// Copy every entry of `hints` into this map, overwriting existing ids
    pub fn merge(&mut self, hints: HintOverrideMap) {
        for (id, hints) in hints.0 {
            log::trace!("Overriding topology hints for {}", id);
            self.0.insert(id, hints);
        }
    }
}

impl Deref for HintOverrideMap {
    type Target = HashMap<String, TopologyHints>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<(String, TopologyHints)> for HintOverrideMap {
    fn from_iter<I: IntoIterator<Item = (String, TopologyHints)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for HintOverrideMap {
    type Item = (String, TopologyHints);
    type IntoIter = std::collections::hash_map::IntoIter<String, TopologyHints>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Merge `hints` into `target`, creating the target map if it is unset
pub fn merge_hints(target: &mut Option<HintOverrideMap>, hints: HintOverrideMap) {
    target.get_or_insert_with(HintOverrideMap::new).merge(hints);
}
