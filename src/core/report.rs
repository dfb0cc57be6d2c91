use crate::domain::model::{Component, PortConflict, PortStatus, ServicePorts};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_FILENAME: &str = "docker_port_configuration_report.json";
pub const PORT_TABLE_FILENAME: &str = "port_table.csv";
pub const ARCHIVE_FILENAME: &str = "port_configuration_bundle.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortMappingSummary {
    pub total_ports: usize,
    pub available_ports: usize,
    pub conflict_ports: usize,
    pub availability_percentage: f64,
    pub total_services: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortEntry {
    pub port: u16,
    pub service: String,
    pub protocol: String,
    pub description: String,
    pub status: PortStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfiguration {
    pub service_name: String,
    pub component: Component,
    pub port_count: usize,
    pub docker_compose: Option<String>,
    pub ports: Vec<PortEntry>,
}

/// 完整的埠號對映報告，結構對應 docker_port_configuration_report.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortReport {
    pub generated_at: DateTime<Utc>,
    pub port_mapping_summary: PortMappingSummary,
    pub component_ports: BTreeMap<String, Vec<PortEntry>>,
    pub port_conflicts: Vec<PortConflict>,
    pub service_configurations: Vec<ServiceConfiguration>,
    pub port_ranges: BTreeMap<String, (u16, u16)>,
    pub recommendations: Vec<String>,
}

fn entry(pc: &crate::domain::model::PortConfig) -> PortEntry {
    PortEntry {
        port: pc.port,
        service: pc.service.clone(),
        protocol: pc.protocol.to_string(),
        description: pc.description.clone(),
        status: pc.status,
    }
}

pub fn build_report(services: &[ServicePorts], conflicts: &[PortConflict]) -> PortReport {
    let mut total_ports = 0;
    let mut available_ports = 0;
    let mut conflict_ports = 0;
    let mut component_ports: BTreeMap<String, Vec<PortEntry>> = BTreeMap::new();

    for svc in services {
        for pc in &svc.ports {
            total_ports += 1;
            match pc.status {
                PortStatus::Conflict => conflict_ports += 1,
                _ => available_ports += 1,
            }
            component_ports
                .entry(pc.component.to_string())
                .or_default()
                .push(entry(pc));
        }
    }

    let availability_percentage = if total_ports > 0 {
        (available_ports as f64 / total_ports as f64) * 100.0
    } else {
        0.0
    };

    let service_configurations = services
        .iter()
        .map(|svc| ServiceConfiguration {
            service_name: svc.service_name.clone(),
            component: svc.component,
            port_count: svc.ports.len(),
            docker_compose: svc.docker_compose.clone(),
            ports: svc.ports.iter().map(entry).collect(),
        })
        .collect();

    let port_ranges = Component::ALL
        .iter()
        .map(|c| (c.to_string(), c.port_range()))
        .collect();

    let recommendations = if conflicts.is_empty() {
        vec![
            "All ports are properly allocated across components".to_string(),
            "No port conflicts detected".to_string(),
            "Docker Compose files generated for all services".to_string(),
            "Health checks configured for all services".to_string(),
            "Network isolation implemented per component".to_string(),
        ]
    } else {
        conflicts
            .iter()
            .map(|c| {
                format!(
                    "Resolve conflict on port {} ({})",
                    c.port,
                    c.services.join(", ")
                )
            })
            .collect()
    };

    PortReport {
        generated_at: Utc::now(),
        port_mapping_summary: PortMappingSummary {
            total_ports,
            available_ports,
            conflict_ports,
            availability_percentage,
            total_services: services.len(),
        },
        component_ports,
        port_conflicts: conflicts.to_vec(),
        service_configurations,
        port_ranges,
        recommendations,
    }
}

/// 將報告寫為 JSON 檔，回傳檔名
pub async fn write_report<S: Storage>(storage: &S, report: &PortReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    storage.write_file(REPORT_FILENAME, json.as_bytes()).await?;
    tracing::info!("📊 Port configuration report generated: {}", REPORT_FILENAME);
    Ok(REPORT_FILENAME.to_string())
}

/// 產生埠號總表 CSV
pub fn render_port_table(services: &[ServicePorts]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["port", "service", "component", "protocol", "status"])?;

    for svc in services {
        for pc in &svc.ports {
            writer.write_record([
                pc.port.to_string(),
                pc.service.clone(),
                pc.component.to_string(),
                pc.protocol.to_string(),
                format!("{:?}", pc.status).to_lowercase(),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// 將報告、埠號總表與 compose 檔打包成單一 zip
pub async fn write_archive<S: Storage>(
    storage: &S,
    report: &PortReport,
    port_table_csv: &str,
    compose_files: &[String],
) -> Result<String> {
    let zip_data = {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        zip.start_file::<_, ()>(REPORT_FILENAME, FileOptions::default())?;
        let json = serde_json::to_string_pretty(report)?;
        zip.write_all(json.as_bytes())?;

        zip.start_file::<_, ()>(PORT_TABLE_FILENAME, FileOptions::default())?;
        zip.write_all(port_table_csv.as_bytes())?;

        for filename in compose_files {
            let content = storage.read_file(filename).await?;
            zip.start_file::<_, ()>(filename.as_str(), FileOptions::default())?;
            zip.write_all(&content)?;
        }

        let cursor = zip.finish()?;
        cursor.into_inner()
    };

    tracing::debug!("Writing archive ({} bytes) to storage", zip_data.len());
    storage.write_file(ARCHIVE_FILENAME, &zip_data).await?;

    Ok(ARCHIVE_FILENAME.to_string())
}
