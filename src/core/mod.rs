pub mod allocator;
pub mod compose;
pub mod deployment;
pub mod engine;
pub mod health;
pub mod inventory;
pub mod report;
pub mod scanner;

pub use crate::domain::model::{Component, PortConfig, PortStatus, Protocol, ServicePorts};
pub use crate::domain::ports::{HealthProbe, HealthState, InventoryProvider, PortProbe, Storage};
pub use crate::utils::error::Result;
