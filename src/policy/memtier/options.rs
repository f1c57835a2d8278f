//! Tunable parameters of the memtier policy

use super::hints::HintOverrideMap;
use super::interval::Interval;
use serde::{Deserialize, Serialize};

/// Configurable memtier policy parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOptions {
    /// Pin containers to the CPUs of their allocated pool
    #[serde(rename = "PinCPU")]
    pub pin_cpu: bool,

    /// Pin containers to the memory nodes of their allocated pool
    #[serde(rename = "PinMemory")]
    pub pin_memory: bool,

    /// Prefer isolated CPUs for isolated allocations
    #[serde(rename = "PreferIsolatedCPUs")]
    pub prefer_isolated: bool,

    /// Prefer shared CPU allocation by default
    #[serde(rename = "PreferSharedCPUs")]
    pub prefer_shared: bool,

    /// Fake topology hints, for testing only
    #[serde(rename = "FakeHints", skip_serializing_if = "HintOverrideMap::is_empty")]
    pub fake_hints: HintOverrideMap,

    #[serde(rename = "DirtyBitScanPeriod")]
    pub dirty_bit_scan_period: Interval,

    #[serde(rename = "PageMovePeriod")]
    pub page_move_period: Interval,

    /// Pages moved per migration pass
    #[serde(rename = "PageMoveCount")]
    pub page_move_count: u64,
}

/// A new options instance with every field at its default
pub fn default_options() -> PolicyOptions {
    PolicyOptions {
        pin_cpu: true,
        pin_memory: true,
        prefer_isolated: true,
        prefer_shared: false,
        fake_hints: HintOverrideMap::new(),
        dirty_bit_scan_period: Interval::DISABLED,
        page_move_period: Interval::DISABLED,
        page_move_count: 0,
    }
}

impl Default for PolicyOptions {
    fn default() -> Self {
        default_options()
    }
}

impl PolicyOptions {
    /// Whether periodic page migration should run at all
    pub fn page_moving_enabled(&self) -> bool {
        !self.page_move_period.is_disabled() && self.page_move_count > 0
    }
}
