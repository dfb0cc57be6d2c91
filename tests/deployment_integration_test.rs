use httpmock::prelude::*;
use port_orchestrator::config::toml_config::DeployPlan;
use port_orchestrator::core::health::ProbeSettings;
use port_orchestrator::domain::model::Component;
use port_orchestrator::domain::ports::{HealthProbe, HealthState};
use port_orchestrator::{
    BlueGreen, DeployState, HealthSupervisor, HttpHealthProbe, PortAllocator, RolloutOutcome,
};
use std::time::Duration;

fn fast_settings() -> ProbeSettings {
    ProbeSettings {
        interval: Duration::from_millis(10),
        timeout: Duration::from_millis(500),
        retries: 3,
    }
}

#[tokio::test]
async fn test_http_probe_healthy_on_200() {
    let server = MockServer::start();
    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).body("ok");
    });

    let probe = HttpHealthProbe::new(Duration::from_millis(500));
    let state = probe.check(&server.url("/health")).await.unwrap();

    health_mock.assert();
    assert_eq!(state, HealthState::Healthy);
}

#[tokio::test]
async fn test_http_probe_unhealthy_on_500() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(500);
    });

    let probe = HttpHealthProbe::new(Duration::from_millis(500));
    let state = probe.check(&server.url("/health")).await.unwrap();

    assert_eq!(state, HealthState::Unhealthy);
}

#[tokio::test]
async fn test_http_probe_unhealthy_when_unreachable() {
    // Bind then drop to get a port nothing is listening on
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let probe = HttpHealthProbe::new(Duration::from_millis(500));
    let state = probe
        .check(&format!("http://127.0.0.1:{}/health", port))
        .await
        .unwrap();

    assert_eq!(state, HealthState::Unhealthy);
}

#[tokio::test]
async fn test_blue_green_rollout_cutover_with_real_http() {
    let server = MockServer::start();
    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200);
    });

    let mut allocator = PortAllocator::new();
    allocator
        .reserve(Component::Apis, 4001, "api-gateway")
        .unwrap();
    let mut bg = BlueGreen::new("api-gateway", Component::Apis, 4001);

    let probe = HttpHealthProbe::new(Duration::from_millis(500));
    let mut supervisor = HealthSupervisor::new(probe, fast_settings());

    // The staged service is simulated by the mock server
    let health_url = server.url("/health");
    let outcome = supervisor
        .roll_service(&mut bg, &mut allocator, |_port| health_url.clone(), 3)
        .await
        .unwrap();

    health_mock.assert();
    assert!(matches!(outcome, RolloutOutcome::CutOver { port: 4000 }));
    assert_eq!(bg.active().unwrap().port, 4000);
    assert_eq!(bg.active().unwrap().state, DeployState::Healthy);
    // The retired blue slot's port is free again
    assert!(allocator.holder(4001).is_none());
}

#[tokio::test]
async fn test_blue_green_rollout_rolls_back_on_persistent_failure() {
    let server = MockServer::start();
    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(503);
    });

    let mut allocator = PortAllocator::new();
    allocator
        .reserve(Component::Apis, 4001, "api-gateway")
        .unwrap();
    let mut bg = BlueGreen::new("api-gateway", Component::Apis, 4001);

    let probe = HttpHealthProbe::new(Duration::from_millis(500));
    let mut supervisor = HealthSupervisor::new(probe, fast_settings());

    let health_url = server.url("/health");
    let outcome = supervisor
        .roll_service(&mut bg, &mut allocator, |_port| health_url.clone(), 3)
        .await
        .unwrap();

    assert_eq!(health_mock.hits(), 3);
    assert!(matches!(outcome, RolloutOutcome::RolledBack { port: 4000 }));

    // Traffic still on the original version
    assert_eq!(bg.active().unwrap().port, 4001);
    assert_eq!(bg.active().unwrap().state, DeployState::Healthy);
    assert_eq!(bg.idle().unwrap().state, DeployState::RolledBack);
    assert!(allocator.holder(4000).is_none());
}

#[tokio::test]
async fn test_rollout_driven_by_deploy_plan() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200);
    });

    let toml_content = r#"
[plan]
name = "integration-rollout"

[probe]
interval_seconds = 1
timeout_seconds = 1
retries = 3

[[deploy]]
service = "grafana"
component = "monitoring"
current_port = 9002
max_attempts = 3
"#;

    let plan = DeployPlan::from_toml_str(toml_content).unwrap();
    let target = &plan.targets[0];

    let mut allocator = PortAllocator::new();
    allocator
        .reserve(target.component, target.current_port, &target.service)
        .unwrap();
    let mut bg = BlueGreen::new(&target.service, target.component, target.current_port);

    let settings = plan.probe_settings();
    assert_eq!(settings.retries, 3);

    let probe = HttpHealthProbe::new(settings.timeout);
    let mut supervisor = HealthSupervisor::new(probe, fast_settings());

    let health_url = server.url("/health");
    let outcome = supervisor
        .roll_service(
            &mut bg,
            &mut allocator,
            |_port| health_url.clone(),
            target.max_attempts.unwrap_or(5),
        )
        .await
        .unwrap();

    // 9000 and 9001 are free in this allocator, so the staged slot gets 9000
    assert!(matches!(outcome, RolloutOutcome::CutOver { port: 9000 }));
    assert_eq!(bg.active().unwrap().service, "grafana");
}

#[tokio::test]
async fn test_supervisor_watch_degrades_live_service() {
    let server = MockServer::start();
    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(500);
    });

    let probe = HttpHealthProbe::new(Duration::from_millis(500));
    let mut supervisor = HealthSupervisor::new(probe, fast_settings());

    let verdict = supervisor
        .watch("grafana", &server.url("/health"), 5)
        .await
        .unwrap();

    // Degraded after 3 consecutive failures, before the cycle budget runs out
    assert_eq!(health_mock.hits(), 3);
    assert_eq!(
        verdict,
        port_orchestrator::core::health::HealthVerdict::Degraded
    );
}
