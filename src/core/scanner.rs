use crate::domain::model::{ConflictType, PortConflict, PortStatus, ServicePorts};
use crate::domain::ports::PortProbe;
use std::collections::HashMap;
use std::net::TcpListener;

/// 以 TCP bind 探測本機埠號是否可用
pub struct TcpProbe;

impl PortProbe for TcpProbe {
    fn is_free(&self, port: u16) -> bool {
        TcpListener::bind(("127.0.0.1", port)).is_ok()
    }
}

/// 略過 OS 探測，一律視為可用（只做清冊內重複偵測）
pub struct NullProbe;

impl PortProbe for NullProbe {
    fn is_free(&self, _port: u16) -> bool {
        true
    }
}

impl PortProbe for Box<dyn PortProbe> {
    fn is_free(&self, port: u16) -> bool {
        self.as_ref().is_free(port)
    }
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub conflicts: Vec<PortConflict>,
    pub available: usize,
    pub checked: usize,
}

/// 埠號衝突掃描器：偵測清冊內重複配置與 OS 層已佔用的埠
pub struct ConflictScanner<P: PortProbe> {
    probe: P,
}

impl<P: PortProbe> ConflictScanner<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    /// 掃描所有服務的埠號，就地改寫狀態並回傳衝突清單
    pub fn scan(&self, services: &mut [ServicePorts]) -> ScanOutcome {
        tracing::info!("🔍 Scanning for port conflicts...");

        let mut conflicts = Vec::new();
        let mut seen: HashMap<u16, String> = HashMap::new();
        let mut available = 0;
        let mut checked = 0;

        for svc in services.iter_mut() {
            for pc in svc.ports.iter_mut() {
                checked += 1;

                // 清冊內同一埠號出現兩次
                if let Some(first) = seen.get(&pc.port) {
                    pc.status = PortStatus::Conflict;
                    conflicts.push(PortConflict {
                        port: pc.port,
                        services: vec![first.clone(), pc.service.clone()],
                        conflict_type: ConflictType::DuplicateAllocation,
                    });
                    continue;
                }
                seen.insert(pc.port, pc.service.clone());

                if self.probe.is_free(pc.port) {
                    pc.status = PortStatus::Available;
                    available += 1;
                } else {
                    pc.status = PortStatus::Conflict;
                    conflicts.push(PortConflict {
                        port: pc.port,
                        services: vec![pc.service.clone()],
                        conflict_type: ConflictType::PortAlreadyUsed,
                    });
                }
            }
        }

        if conflicts.is_empty() {
            tracing::info!("✅ No port conflicts found");
        } else {
            tracing::warn!("⚠️ Found {} port conflicts", conflicts.len());
            for conflict in &conflicts {
                tracing::warn!("  Port {}: {:?}", conflict.port, conflict.services);
            }
        }

        ScanOutcome {
            conflicts,
            available,
            checked,
        }
    }
}
