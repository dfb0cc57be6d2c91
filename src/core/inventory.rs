use crate::domain::model::{Component, PortConfig, Protocol, ServicePorts};

fn http(port: u16, service: &str, component: Component, description: &str) -> PortConfig {
    PortConfig::new(port, service, component, Protocol::Http, description)
}

fn tcp(port: u16, service: &str, component: Component, description: &str) -> PortConfig {
    PortConfig::new(port, service, component, Protocol::Tcp, description)
}

/// 內建的 526 實體生態系埠號清冊（71 個埠、8 組服務）
pub fn builtin_inventory() -> Vec<ServicePorts> {
    let iza_os_ports = vec![
        http(8001, "iza-memory-core", Component::IzaOs, "Memory Core API"),
        http(8002, "iza-agent-orchestration", Component::IzaOs, "Agent Orchestration API"),
        http(8003, "iza-venture-factory", Component::IzaOs, "Venture Factory API"),
        http(8004, "iza-repository-hub", Component::IzaOs, "Repository Hub API"),
        http(8005, "iza-vercept-intelligence", Component::IzaOs, "Vercept Intelligence API"),
        http(8006, "iza-command-center", Component::IzaOs, "Command Center API"),
        http(8007, "iza-genixbank-financial", Component::IzaOs, "GenixBank Financial API"),
    ];

    let genixbank_ports = vec![
        http(8101, "genixbank-banking-api", Component::Genixbank, "Banking API"),
        http(8102, "genixbank-compliance-api", Component::Genixbank, "Compliance API"),
        http(8103, "genixbank-equity-api", Component::Genixbank, "Equity API"),
        http(8104, "genixbank-transaction-api", Component::Genixbank, "Transaction API"),
        http(8105, "genixbank-payroll-api", Component::Genixbank, "Payroll API"),
        http(8106, "genixbank-dealmaking-api", Component::Genixbank, "Dealmaking API"),
        http(8107, "genixbank-dashboard", Component::Genixbank, "Financial Dashboard"),
        http(8108, "genixbank-reports", Component::Genixbank, "Financial Reports"),
    ];

    let traycer_ports = vec![
        http(8201, "traycer-design-system", Component::Traycer, "Design System API"),
        http(8202, "traycer-component-library", Component::Traycer, "Component Library"),
        http(8203, "traycer-orchestration", Component::Traycer, "Orchestration API"),
        http(8204, "traycer-frontend-proxy", Component::Traycer, "Frontend Proxy"),
        http(8205, "traycer-build-system", Component::Traycer, "Build System API"),
    ];

    let mcp_ports = vec![
        http(8301, "mcp-claude-agents", Component::McpAgents, "Claude Agents MCP"),
        http(8302, "mcp-swarms", Component::McpAgents, "Swarms MCP"),
        http(8303, "mcp-bmad-orchestrator", Component::McpAgents, "BMAD Orchestrator MCP"),
        http(8304, "mcp-traycer-ai", Component::McpAgents, "Traycer AI MCP"),
        http(8305, "mcp-cursor-integration", Component::McpAgents, "Cursor MCP Integration"),
        http(8306, "mcp-github-integration", Component::McpAgents, "GitHub MCP Integration"),
    ];

    // 26 個前端專案
    let frontend_ports: Vec<PortConfig> = (1u16..=26)
        .map(|i| {
            http(
                3000 + i,
                &format!("frontend-project-{:02}", i),
                Component::Frontend,
                &format!("Frontend Project {}", i),
            )
        })
        .collect();

    let database_ports = vec![
        tcp(5001, "postgresql-main", Component::Databases, "Main PostgreSQL Database"),
        tcp(5002, "redis-cache", Component::Databases, "Redis Cache"),
        tcp(5003, "mongodb-documents", Component::Databases, "MongoDB Documents"),
        tcp(5004, "elasticsearch-search", Component::Databases, "Elasticsearch Search"),
        tcp(5005, "influxdb-metrics", Component::Databases, "InfluxDB Metrics"),
        tcp(5006, "neo4j-graph", Component::Databases, "Neo4j Graph Database"),
    ];

    let api_ports = vec![
        http(4001, "api-gateway", Component::Apis, "Main API Gateway"),
        http(4002, "auth-service", Component::Apis, "Authentication Service"),
        http(4003, "user-service", Component::Apis, "User Management Service"),
        http(4004, "notification-service", Component::Apis, "Notification Service"),
        http(4005, "file-service", Component::Apis, "File Management Service"),
        http(4006, "email-service", Component::Apis, "Email Service"),
        http(4007, "sms-service", Component::Apis, "SMS Service"),
    ];

    let monitoring_ports = vec![
        http(9001, "prometheus", Component::Monitoring, "Prometheus Metrics"),
        http(9002, "grafana", Component::Monitoring, "Grafana Dashboard"),
        http(9003, "jaeger", Component::Monitoring, "Jaeger Tracing"),
        http(9004, "kibana", Component::Monitoring, "Kibana Logs"),
        http(9005, "alertmanager", Component::Monitoring, "Alert Manager"),
        http(9006, "node-exporter", Component::Monitoring, "Node Exporter"),
    ];

    vec![
        service("iza-os", Component::IzaOs, iza_os_ports, "docker-compose.iza-os.yml"),
        service("genixbank", Component::Genixbank, genixbank_ports, "docker-compose.genixbank.yml"),
        service("traycer", Component::Traycer, traycer_ports, "docker-compose.traycer.yml"),
        service("mcp-agents", Component::McpAgents, mcp_ports, "docker-compose.mcp.yml"),
        service("frontend-projects", Component::Frontend, frontend_ports, "docker-compose.frontend.yml"),
        service("databases", Component::Databases, database_ports, "docker-compose.databases.yml"),
        service("apis", Component::Apis, api_ports, "docker-compose.apis.yml"),
        service("monitoring", Component::Monitoring, monitoring_ports, "docker-compose.monitoring.yml"),
    ]
}

fn service(
    name: &str,
    component: Component,
    ports: Vec<PortConfig>,
    compose: &str,
) -> ServicePorts {
    ServicePorts {
        service_name: name.to_string(),
        component,
        ports,
        docker_compose: Some(compose.to_string()),
        health_check_url: None,
    }
}

/// 清冊內所有埠號配置的展平檢視
pub fn all_port_configs(services: &[ServicePorts]) -> Vec<PortConfig> {
    services.iter().flat_map(|s| s.ports.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_inventory_totals() {
        let services = builtin_inventory();
        assert_eq!(services.len(), 8);
        assert_eq!(all_port_configs(&services).len(), 71);
    }

    #[test]
    fn test_every_port_sits_in_its_component_range() {
        for svc in builtin_inventory() {
            for pc in &svc.ports {
                assert!(
                    pc.component.contains(pc.port),
                    "{} port {} outside {} range",
                    pc.service,
                    pc.port,
                    pc.component
                );
            }
        }
    }

    #[test]
    fn test_frontend_projects_are_numbered() {
        let services = builtin_inventory();
        let frontend = services
            .iter()
            .find(|s| s.service_name == "frontend-projects")
            .unwrap();
        assert_eq!(frontend.ports.len(), 26);
        assert_eq!(frontend.ports[0].port, 3001);
        assert_eq!(frontend.ports[0].service, "frontend-project-01");
        assert_eq!(frontend.ports[25].port, 3026);
        assert_eq!(frontend.ports[25].service, "frontend-project-26");
    }

    #[test]
    fn test_no_duplicate_ports_in_builtin_inventory() {
        let mut seen = std::collections::HashSet::new();
        for pc in all_port_configs(&builtin_inventory()) {
            assert!(seen.insert(pc.port), "port {} appears twice", pc.port);
        }
    }
}
