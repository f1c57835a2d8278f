//! Memory tiering policy configuration
//!
//! Holds the options the memtier placement policy reads on every decision.
//! The live options sit in a [`ConfigSlot`] that the configuration registry
//! replaces on each (re)load; policy code only ever reads snapshots.

pub mod hints;
pub mod interval;
pub mod options;

pub use hints::{HintOverrideMap, merge_hints};
pub use interval::{Interval, MalformedInterval};
pub use options::{PolicyOptions, default_options};

use crate::config::options::{ConfigRegistry, ConfigSlot};
use anyhow::Result;
use once_cell::sync::Lazy;
use std::sync::Arc;

pub const POLICY_NAME: &str = "memtier";
pub const POLICY_PATH: &str = "policy.memtier";
pub const POLICY_DESCRIPTION: &str =
    "Topology-aware CPU and memory placement with memory tier awareness";

// Process-wide memtier options
static LIVE_OPTIONS: Lazy<Arc<ConfigSlot<PolicyOptions>>> =
    Lazy::new(|| Arc::new(ConfigSlot::new(default_options())));

/// The shared slot holding the process-wide options
pub fn live_options() -> Arc<ConfigSlot<PolicyOptions>> {
    LIVE_OPTIONS.clone()
}

/// Snapshot of the current process-wide options
pub fn options() -> Arc<PolicyOptions> {
    LIVE_OPTIONS.load()
}

/// Register the process-wide options with `registry`
pub fn register(registry: &ConfigRegistry) -> Result<()> {
    register_slot(registry, live_options())
}

/// Register an explicit options slot, e.g. one owned by a test or an
/// embedding policy engine
pub fn register_slot(registry: &ConfigRegistry, slot: Arc<ConfigSlot<PolicyOptions>>) -> Result<()> {
    registry.register(POLICY_PATH, POLICY_DESCRIPTION, slot, default_options)
}
