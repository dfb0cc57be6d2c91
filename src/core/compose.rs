use crate::domain::model::ServicePorts;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// 為單一服務群組產生 docker-compose 內容
pub fn render_compose(service: &ServicePorts) -> String {
    let mut out = String::from("version: '3.8'\n\nservices:\n");

    for pc in &service.ports {
        let service_key = pc.service.replace('-', "_");
        out.push_str(&format!(
            r#"  {service_key}:
    image: {component}:latest
    container_name: {container}
    ports:
      - "{port}:{port}"
    environment:
      - PORT={port}
      - COMPONENT={component}
      - SERVICE={container}
    healthcheck:
      test: ["CMD", "curl", "-f", "http://localhost:{port}/health"]
      interval: 30s
      timeout: 10s
      retries: 3
    restart: unless-stopped
    networks:
      - {component}_network

"#,
            service_key = service_key,
            component = service.component,
            container = pc.service,
            port = pc.port,
        ));
    }

    out.push_str(&format!(
        r#"networks:
  {component}_network:
    driver: bridge

volumes:
  {component}_data:
    driver: local
"#,
        component = service.component,
    ));

    out
}

/// 為每組服務寫出一份 compose 檔，回傳寫出的檔名
pub async fn write_compose_files<S: Storage>(
    storage: &S,
    services: &[ServicePorts],
) -> Result<Vec<String>> {
    tracing::info!("🐳 Generating Docker Compose files...");

    let mut written = Vec::new();
    for svc in services {
        let filename = svc
            .docker_compose
            .clone()
            .unwrap_or_else(|| format!("docker-compose.{}.yml", svc.service_name));

        let content = render_compose(svc);
        storage.write_file(&filename, content.as_bytes()).await?;

        tracing::info!("✅ Generated {}", filename);
        written.push(filename);
    }

    Ok(written)
}
