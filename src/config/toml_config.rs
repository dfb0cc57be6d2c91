use crate::core::health::ProbeSettings;
use crate::domain::model::{Component, PortConfig, PortStatus, Protocol, ServicePorts};
use crate::utils::error::{OrchestratorError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// 替換環境變數 (例如 ${API_KEY})
fn substitute_env_vars(content: &str) -> Result<String> {
    use regex::Regex;
    // 使用正規表達式匹配 ${VAR_NAME} 格式
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

fn parse_toml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T> {
    let processed = substitute_env_vars(content)?;
    toml::from_str(&processed).map_err(|e| OrchestratorError::ConfigValidationError {
        field: "toml_parsing".to_string(),
        message: format!("TOML parsing error: {}", e),
    })
}

/// 從 TOML 檔案載入的清冊補充（疊加在內建清冊之上）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlInventory {
    pub inventory: InventorySection,
    /// 覆寫元件的埠號區間，例如 `apis = [4000, 4499]`
    #[serde(default)]
    pub ranges: Option<HashMap<Component, (u16, u16)>>,
    #[serde(default, rename = "service")]
    pub services: Vec<ServiceDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySection {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDef {
    pub name: String,
    pub component: Component,
    pub docker_compose: Option<String>,
    #[serde(default, rename = "port")]
    pub ports: Vec<PortDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDef {
    pub port: u16,
    pub service: String,
    pub protocol: Option<Protocol>,
    pub description: Option<String>,
    pub health_check: Option<String>,
}

impl TomlInventory {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OrchestratorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_toml(content)
    }

    /// 轉成 ServicePorts 群組
    pub fn to_service_ports(&self) -> Vec<ServicePorts> {
        self.services
            .iter()
            .map(|svc| ServicePorts {
                service_name: svc.name.clone(),
                component: svc.component,
                ports: svc
                    .ports
                    .iter()
                    .map(|p| PortConfig {
                        port: p.port,
                        service: p.service.clone(),
                        component: svc.component,
                        protocol: p.protocol.unwrap_or(Protocol::Http),
                        description: p.description.clone().unwrap_or_default(),
                        status: PortStatus::Available,
                        container: None,
                        health_check: p.health_check.clone(),
                    })
                    .collect(),
                docker_compose: svc.docker_compose.clone(),
                health_check_url: None,
            })
            .collect()
    }

    /// 元件的有效區間：有覆寫就用覆寫，否則回到內建區間
    pub fn effective_range(&self, component: Component) -> (u16, u16) {
        self.ranges
            .as_ref()
            .and_then(|r| r.get(&component).copied())
            .unwrap_or_else(|| component.port_range())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("inventory.name", &self.inventory.name)?;

        if let Some(ranges) = &self.ranges {
            for (component, &(start, end)) in ranges {
                let field = format!("ranges.{}", component);
                validation::validate_port_range(&field, start, end)?;
            }
        }

        // 所有有效區間兩兩不得重疊
        for (i, &a) in Component::ALL.iter().enumerate() {
            let (a_start, a_end) = self.effective_range(a);
            for &b in &Component::ALL[i + 1..] {
                let (b_start, b_end) = self.effective_range(b);
                if a_start <= b_end && b_start <= a_end {
                    return Err(OrchestratorError::InvalidConfigValueError {
                        field: format!("ranges.{}", b),
                        value: format!("{}-{}", b_start, b_end),
                        reason: format!("Overlaps {} range {}-{}", a, a_start, a_end),
                    });
                }
            }
        }

        for svc in &self.services {
            validation::validate_non_empty_string("service.name", &svc.name)?;
            let (start, end) = self.effective_range(svc.component);
            for p in &svc.ports {
                // 埠號必須落在元件的有效區間
                if p.port < start || p.port > end {
                    return Err(OrchestratorError::OutOfRange {
                        port: p.port,
                        component: svc.component.to_string(),
                        start,
                        end,
                    });
                }
                if let Some(url) = &p.health_check {
                    validation::validate_url("port.health_check", url)?;
                }
            }
        }

        Ok(())
    }
}

impl Validate for TomlInventory {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// 藍綠部署計畫
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployPlan {
    pub plan: PlanSection,
    pub probe: Option<ProbeConfig>,
    #[serde(default, rename = "deploy")]
    pub targets: Vec<DeployTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSection {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub interval_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
    pub retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployTarget {
    pub service: String,
    pub component: Component,
    pub current_port: u16,
    pub image: Option<String>,
    pub host: Option<String>,
    pub health_path: Option<String>,
    pub max_attempts: Option<u32>,
}

impl DeployPlan {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OrchestratorError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_toml(content)
    }

    /// 探測參數；未指定者用 compose healthcheck 的預設值
    pub fn probe_settings(&self) -> ProbeSettings {
        let defaults = ProbeSettings::default();
        match &self.probe {
            Some(p) => ProbeSettings {
                interval: p
                    .interval_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.interval),
                timeout: p
                    .timeout_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
                retries: p.retries.unwrap_or(defaults.retries),
            },
            None => defaults,
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("plan.name", &self.plan.name)?;

        if self.targets.is_empty() {
            return Err(OrchestratorError::MissingConfigError {
                field: "deploy".to_string(),
            });
        }

        for target in &self.targets {
            validation::validate_non_empty_string("deploy.service", &target.service)?;

            if !target.component.contains(target.current_port) {
                let (start, end) = target.component.port_range();
                return Err(OrchestratorError::OutOfRange {
                    port: target.current_port,
                    component: target.component.to_string(),
                    start,
                    end,
                });
            }

            if let Some(path) = &target.health_path {
                if !path.starts_with('/') {
                    return Err(OrchestratorError::InvalidConfigValueError {
                        field: "deploy.health_path".to_string(),
                        value: path.clone(),
                        reason: "Health path must start with '/'".to_string(),
                    });
                }
            }

            if let Some(attempts) = target.max_attempts {
                validation::validate_positive_number(
                    "deploy.max_attempts",
                    attempts as usize,
                    1,
                )?;
            }
        }

        if let Some(probe) = &self.probe {
            if let Some(retries) = probe.retries {
                validation::validate_positive_number("probe.retries", retries as usize, 1)?;
            }
        }

        Ok(())
    }
}

impl DeployTarget {
    /// 新 slot 的健康檢查 URL，路徑預設 /health（同 compose healthcheck）
    pub fn health_url(&self, port: u16) -> String {
        format!(
            "http://{}:{}{}",
            self.host.as_deref().unwrap_or("localhost"),
            port,
            self.health_path.as_deref().unwrap_or("/health"),
        )
    }
}

impl Validate for DeployPlan {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_inventory() {
        let toml_content = r#"
[inventory]
name = "extra-services"
version = "1.0.0"

[[service]]
name = "billing"
component = "apis"
docker_compose = "docker-compose.billing.yml"

[[service.port]]
port = 4010
service = "billing-service"
protocol = "http"
description = "Billing Service"
"#;

        let inventory = TomlInventory::from_toml_str(toml_content).unwrap();
        assert_eq!(inventory.inventory.name, "extra-services");
        assert_eq!(inventory.services.len(), 1);

        let services = inventory.to_service_ports();
        assert_eq!(services[0].ports[0].port, 4010);
        assert_eq!(services[0].ports[0].protocol, Protocol::Http);
        assert!(inventory.validate().is_ok());
    }

    #[test]
    fn test_inventory_rejects_port_outside_component_range() {
        let toml_content = r#"
[inventory]
name = "bad"

[[service]]
name = "billing"
component = "apis"

[[service.port]]
port = 9050
service = "billing-service"
"#;

        let inventory = TomlInventory::from_toml_str(toml_content).unwrap();
        let err = inventory.validate().unwrap_err();
        assert!(matches!(err, OrchestratorError::OutOfRange { port: 9050, .. }));
    }

    #[test]
    fn test_range_overlay_widens_component_range() {
        let toml_content = r#"
[inventory]
name = "wide-apis"

[ranges]
apis = [4000, 4499]

[[service]]
name = "billing"
component = "apis"

[[service.port]]
port = 4250
service = "billing-service"
"#;

        let inventory = TomlInventory::from_toml_str(toml_content).unwrap();
        assert_eq!(inventory.effective_range(Component::Apis), (4000, 4499));
        // 3000-3099 stays untouched for components without an override
        assert_eq!(inventory.effective_range(Component::Frontend), (3000, 3099));
        // port 4250 is outside the builtin 4000-4099 but inside the override
        assert!(inventory.validate().is_ok());
    }

    #[test]
    fn test_range_overlay_rejects_port_outside_override() {
        let toml_content = r#"
[inventory]
name = "narrow-apis"

[ranges]
apis = [4000, 4009]

[[service]]
name = "billing"
component = "apis"

[[service.port]]
port = 4050
service = "billing-service"
"#;

        let inventory = TomlInventory::from_toml_str(toml_content).unwrap();
        let err = inventory.validate().unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::OutOfRange { port: 4050, start: 4000, end: 4009, .. }
        ));
    }

    #[test]
    fn test_range_overlay_rejects_overlapping_ranges() {
        let toml_content = r#"
[inventory]
name = "clashing"

[ranges]
apis = [4000, 5050]
"#;

        let inventory = TomlInventory::from_toml_str(toml_content).unwrap();
        let err = inventory.validate().unwrap_err();
        match err {
            OrchestratorError::InvalidConfigValueError { field, reason, .. } => {
                assert!(field.starts_with("ranges."));
                assert!(reason.contains("Overlaps"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_range_overlay_rejects_inverted_range() {
        let toml_content = r#"
[inventory]
name = "inverted"

[ranges]
monitoring = [9099, 9000]
"#;

        let inventory = TomlInventory::from_toml_str(toml_content).unwrap();
        let err = inventory.validate().unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_INVENTORY_NAME", "from-env");

        let toml_content = r#"
[inventory]
name = "${TEST_INVENTORY_NAME}"
"#;

        let inventory = TomlInventory::from_toml_str(toml_content).unwrap();
        assert_eq!(inventory.inventory.name, "from-env");

        std::env::remove_var("TEST_INVENTORY_NAME");
    }

    #[test]
    fn test_parse_deploy_plan_with_probe_overrides() {
        let toml_content = r#"
[plan]
name = "weekly-rollout"

[probe]
interval_seconds = 5
retries = 2

[[deploy]]
service = "api-gateway"
component = "apis"
current_port = 4001
health_path = "/health"
max_attempts = 4
"#;

        let plan = DeployPlan::from_toml_str(toml_content).unwrap();
        assert!(plan.validate().is_ok());

        let settings = plan.probe_settings();
        assert_eq!(settings.interval, Duration::from_secs(5));
        assert_eq!(settings.timeout, Duration::from_secs(10)); // 預設值
        assert_eq!(settings.retries, 2);

        assert_eq!(plan.targets[0].health_url(4000), "http://localhost:4000/health");
    }

    #[test]
    fn test_deploy_plan_requires_targets() {
        let toml_content = r#"
[plan]
name = "empty"
"#;

        let plan = DeployPlan::from_toml_str(toml_content).unwrap();
        let err = plan.validate().unwrap_err();
        assert!(matches!(err, OrchestratorError::MissingConfigError { .. }));
    }

    #[test]
    fn test_deploy_plan_rejects_bad_health_path() {
        let toml_content = r#"
[plan]
name = "rollout"

[[deploy]]
service = "api-gateway"
component = "apis"
current_port = 4001
health_path = "health"
"#;

        let plan = DeployPlan::from_toml_str(toml_content).unwrap();
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_deploy_plan_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[plan]
name = "file-test"

[[deploy]]
service = "grafana"
component = "monitoring"
current_port = 9002
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let plan = DeployPlan::from_file(temp_file.path()).unwrap();
        assert_eq!(plan.plan.name, "file-test");
        assert!(plan.validate().is_ok());
    }
}
