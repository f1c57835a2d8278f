//! Registration of all configuration sections

use super::ConfigRegistry;
use crate::policy;
use anyhow::Result;

/// Register every section with the process-wide live slots
pub fn register_all(registry: &ConfigRegistry) -> Result<()> {
    policy::memtier::register(registry)?;
    log::info!("Registered {} configuration sections", registry.count());
    Ok(())
}
