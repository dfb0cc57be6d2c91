pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::cli::LocalStorage;

pub use core::allocator::PortAllocator;
pub use core::deployment::{BlueGreen, DeployState, Deployment, Slot};
pub use core::engine::OrchestratorEngine;
pub use core::health::{HealthSupervisor, HttpHealthProbe, ProbeSettings, RolloutOutcome};
pub use core::inventory::builtin_inventory;
pub use core::scanner::{ConflictScanner, TcpProbe};
pub use utils::error::{OrchestratorError, Result};
