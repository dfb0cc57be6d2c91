use crate::domain::model::{Component, ServicePorts};
use crate::utils::error::{OrchestratorError, Result};
use std::collections::HashMap;

/// 固定區間的埠號配置器：清冊埠為靜態持有，執行期配置可釋放
pub struct PortAllocator {
    holders: HashMap<u16, Holder>,
}

#[derive(Debug, Clone)]
struct Holder {
    service: String,
    runtime: bool,
}

impl PortAllocator {
    pub fn new() -> Self {
        Self {
            holders: HashMap::new(),
        }
    }

    /// 以清冊內容預載靜態持有
    pub fn from_inventory(services: &[ServicePorts]) -> Self {
        let mut allocator = Self::new();
        for svc in services {
            for pc in &svc.ports {
                allocator.holders.insert(
                    pc.port,
                    Holder {
                        service: pc.service.clone(),
                        runtime: false,
                    },
                );
            }
        }
        allocator
    }

    /// 配置元件區間內最小的可用埠
    pub fn allocate(&mut self, component: Component, service: &str) -> Result<u16> {
        let (start, end) = component.port_range();
        for port in start..=end {
            if !self.holders.contains_key(&port) {
                self.holders.insert(
                    port,
                    Holder {
                        service: service.to_string(),
                        runtime: true,
                    },
                );
                tracing::debug!("🔌 Allocated port {} to '{}' ({})", port, service, component);
                return Ok(port);
            }
        }
        Err(OrchestratorError::RangeExhausted {
            component: component.to_string(),
        })
    }

    /// 明確指定埠號的配置；埠必須落在元件區間內且未被持有
    pub fn reserve(&mut self, component: Component, port: u16, service: &str) -> Result<()> {
        let (start, end) = component.port_range();
        if !component.contains(port) {
            return Err(OrchestratorError::OutOfRange {
                port,
                component: component.to_string(),
                start,
                end,
            });
        }
        if let Some(holder) = self.holders.get(&port) {
            return Err(OrchestratorError::PortTaken {
                port,
                holder: holder.service.clone(),
            });
        }
        self.holders.insert(
            port,
            Holder {
                service: service.to_string(),
                runtime: true,
            },
        );
        Ok(())
    }

    /// 釋放執行期配置；靜態清冊埠不可釋放
    pub fn release(&mut self, port: u16) -> Result<()> {
        match self.holders.get(&port) {
            Some(holder) if holder.runtime => {
                self.holders.remove(&port);
                tracing::debug!("🔌 Released port {}", port);
                Ok(())
            }
            _ => Err(OrchestratorError::NotAllocated { port }),
        }
    }

    pub fn holder(&self, port: u16) -> Option<&str> {
        self.holders.get(&port).map(|h| h.service.as_str())
    }

    pub fn free_count(&self, component: Component) -> usize {
        let (start, end) = component.port_range();
        (start..=end)
            .filter(|p| !self.holders.contains_key(p))
            .count()
    }
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new()
    }
}
