use clap::Parser;
use port_orchestrator::config::toml_config::TomlInventory;
use port_orchestrator::core::inventory::builtin_inventory;
use port_orchestrator::core::scanner::NullProbe;
use port_orchestrator::domain::model::Component;
use port_orchestrator::domain::ports::{InventoryProvider, PortProbe};
use port_orchestrator::utils::{logger, validation::Validate};
use port_orchestrator::{CliConfig, LocalStorage, OrchestratorEngine, TcpProbe};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("🔌 Initializing Docker port configurations...");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 內建清冊 + 可選的 TOML 疊加
    let mut services = builtin_inventory();
    if let Some(path) = &config.inventory {
        let overlay = match TomlInventory::from_file(path) {
            Ok(inventory) => inventory,
            Err(e) => {
                eprintln!("❌ Failed to load inventory file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        };
        if let Err(e) = overlay.validate() {
            tracing::error!("❌ Inventory validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
        let extra = overlay.to_service_ports();
        tracing::info!("📁 Merged {} extra services from {}", extra.len(), path);
        services.extend(extra);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲與引擎
    let storage = LocalStorage::new(config.base_path().to_string());
    let probe: Box<dyn PortProbe> = if config.no_probe {
        Box::new(NullProbe)
    } else {
        Box::new(TcpProbe)
    };

    let mut engine = OrchestratorEngine::new_with_monitoring(storage, probe, services, monitor_enabled)
        .with_archive(config.archive_outputs());

    match engine.run().await {
        Ok((report_path, report)) => {
            tracing::info!("✅ Port configuration report generated: {}", report_path);

            println!("\nDOCKER PORT CONFIGURATION SYSTEM");
            println!("{}", "=".repeat(70));
            let summary = &report.port_mapping_summary;
            println!("Total Ports: {}", summary.total_ports);
            println!("Available Ports: {}", summary.available_ports);
            println!("Conflict Ports: {}", summary.conflict_ports);
            println!("Availability: {:.1}%", summary.availability_percentage);
            println!("Total Services: {}", summary.total_services);

            println!("\nComponent Port Ranges:");
            for component in Component::ALL {
                let (start, end) = component.port_range();
                println!("  {}: {}-{}", component, start, end);
            }

            if report.port_conflicts.is_empty() {
                println!("\n✅ No port conflicts detected");
            } else {
                println!("\nPort Conflicts:");
                for conflict in &report.port_conflicts {
                    println!("  Port {}: {:?}", conflict.port, conflict.services);
                }
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Port configuration report generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                port_orchestrator::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                port_orchestrator::utils::error::ErrorSeverity::Medium => 2, // 重試錯誤
                port_orchestrator::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                port_orchestrator::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
