use serde::{Deserialize, Serialize};

/// 526 實體生態系的八個元件類別，每個類別有固定的埠號區間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    IzaOs,
    Genixbank,
    Traycer,
    McpAgents,
    Frontend,
    Databases,
    Monitoring,
    Apis,
}

impl Component {
    pub const ALL: [Component; 8] = [
        Component::IzaOs,
        Component::Genixbank,
        Component::Traycer,
        Component::McpAgents,
        Component::Frontend,
        Component::Databases,
        Component::Monitoring,
        Component::Apis,
    ];

    /// 元件保留的埠號區間（含端點）
    pub fn port_range(&self) -> (u16, u16) {
        match self {
            Component::IzaOs => (8000, 8099),
            Component::Genixbank => (8100, 8199),
            Component::Traycer => (8200, 8299),
            Component::McpAgents => (8300, 8399),
            Component::Frontend => (3000, 3099),
            Component::Databases => (5000, 5099),
            Component::Monitoring => (9000, 9099),
            Component::Apis => (4000, 4099),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::IzaOs => "iza_os",
            Component::Genixbank => "genixbank",
            Component::Traycer => "traycer",
            Component::McpAgents => "mcp_agents",
            Component::Frontend => "frontend",
            Component::Databases => "databases",
            Component::Monitoring => "monitoring",
            Component::Apis => "apis",
        }
    }

    pub fn contains(&self, port: u16) -> bool {
        let (start, end) = self.port_range();
        (start..=end).contains(&port)
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Tcp,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Http => f.write_str("http"),
            Protocol::Tcp => f.write_str("tcp"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    Available,
    Conflict,
    Allocated,
}

/// 單一埠號配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConfig {
    pub port: u16,
    pub service: String,
    pub component: Component,
    pub protocol: Protocol,
    pub description: String,
    pub status: PortStatus,
    pub container: Option<String>,
    pub health_check: Option<String>,
}

impl PortConfig {
    pub fn new(
        port: u16,
        service: &str,
        component: Component,
        protocol: Protocol,
        description: &str,
    ) -> Self {
        Self {
            port,
            service: service.to_string(),
            component,
            protocol,
            description: description.to_string(),
            status: PortStatus::Available,
            container: None,
            health_check: None,
        }
    }
}

/// 服務的埠號群組配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePorts {
    pub service_name: String,
    pub component: Component,
    pub ports: Vec<PortConfig>,
    pub docker_compose: Option<String>,
    pub health_check_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConflict {
    pub port: u16,
    pub services: Vec<String>,
    pub conflict_type: ConflictType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    PortAlreadyUsed,
    DuplicateAllocation,
}
