pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::ports::InventoryProvider;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "port-orchestrator")]
#[command(about = "Docker port configuration manager for the 526-entity ecosystem")]
pub struct CliConfig {
    /// Directory where compose files and reports are written
    #[arg(long, default_value = "./output")]
    pub base_path: String,

    /// Optional TOML inventory file merged on top of the built-in inventory
    #[arg(long)]
    pub inventory: Option<String>,

    /// Bundle compose files and reports into a single zip
    #[arg(long)]
    pub archive: bool,

    /// Skip the OS-level port probe (duplicate detection only)
    #[arg(long)]
    pub no_probe: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl InventoryProvider for CliConfig {
    fn base_path(&self) -> &str {
        &self.base_path
    }

    fn archive_outputs(&self) -> bool {
        self.archive
    }
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        crate::utils::validation::validate_path("base_path", &self.base_path)?;
        if let Some(inventory) = &self.inventory {
            crate::utils::validation::validate_path("inventory", inventory)?;
        }
        Ok(())
    }
}
