//! Options system for typed, hot-reloadable configuration
//!
//! The options system provides:
//! - Typed sections registered under dot-separated paths
//! - Field-level defaults from each section's factory
//! - All-or-nothing document loads with atomic snapshot swaps
//! - TOML and JSON file loading

pub mod registrations;
pub mod registry;
pub mod slot;
pub mod store;

pub use registry::{ConfigRegistry, SectionInfo};
pub use slot::ConfigSlot;
pub use store::{ConfigStore, DocumentFormat, default_config_path, parse_document};
