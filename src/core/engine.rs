use crate::core::compose;
use crate::core::report::{self, PortReport};
use crate::core::scanner::ConflictScanner;
use crate::domain::model::ServicePorts;
use crate::domain::ports::{PortProbe, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 協調整個流程：衝突掃描 → compose 產生 → 報告輸出
pub struct OrchestratorEngine<S: Storage, P: PortProbe> {
    storage: S,
    scanner: ConflictScanner<P>,
    services: Vec<ServicePorts>,
    monitor: SystemMonitor,
    archive: bool,
}

impl<S: Storage, P: PortProbe> OrchestratorEngine<S, P> {
    pub fn new(storage: S, probe: P, services: Vec<ServicePorts>) -> Self {
        Self {
            storage,
            scanner: ConflictScanner::new(probe),
            services,
            monitor: SystemMonitor::new(false),
            archive: false,
        }
    }

    pub fn new_with_monitoring(
        storage: S,
        probe: P,
        services: Vec<ServicePorts>,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            storage,
            scanner: ConflictScanner::new(probe),
            services,
            monitor: SystemMonitor::new(monitor_enabled),
            archive: false,
        }
    }

    pub fn with_archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }

    /// 執行完整流程並回傳報告檔名與報告內容
    pub async fn run(&mut self) -> Result<(String, PortReport)> {
        tracing::info!(
            "🔌 Initialized {} port configurations across {} services",
            self.services.iter().map(|s| s.ports.len()).sum::<usize>(),
            self.services.len()
        );

        // 衝突掃描
        let outcome = self.scanner.scan(&mut self.services);
        self.monitor.log_stats("Scan");

        // 產生 compose 檔
        let compose_files = compose::write_compose_files(&self.storage, &self.services).await?;
        self.monitor.log_stats("Compose");

        // 建立並輸出報告
        let port_report = report::build_report(&self.services, &outcome.conflicts);
        let report_path = report::write_report(&self.storage, &port_report).await?;

        let port_table = report::render_port_table(&self.services)?;
        self.storage
            .write_file(report::PORT_TABLE_FILENAME, port_table.as_bytes())
            .await?;

        if self.archive {
            let archive_path =
                report::write_archive(&self.storage, &port_report, &port_table, &compose_files)
                    .await?;
            tracing::info!("📦 Bundle written to {}", archive_path);
        }

        self.monitor.log_stats("Report");
        self.monitor.log_final_stats();

        Ok((report_path, port_report))
    }

    pub fn services(&self) -> &[ServicePorts] {
        &self.services
    }
}
