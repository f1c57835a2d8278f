//! Configuration loading and registration

pub mod options;

pub use options::{ConfigRegistry, ConfigSlot, ConfigStore, DocumentFormat};
