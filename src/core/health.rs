use crate::core::allocator::PortAllocator;
use crate::core::deployment::{BlueGreen, DeployState};
use crate::domain::ports::{HealthProbe, HealthState};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// 探測參數，預設值取自 compose healthcheck（interval 30s / timeout 10s / retries 3）
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub interval: Duration,
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(10),
            retries: 3,
        }
    }
}

/// 以 HTTP GET 實作健康探測：2xx 視為健康，連線失敗或逾時視為不健康
pub struct HttpHealthProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpHealthProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self, url: &str) -> Result<HealthState> {
        let response = self.client.get(url).timeout(self.timeout).send().await;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(HealthState::Healthy),
            Ok(resp) => {
                tracing::debug!("Health probe {} returned status {}", url, resp.status());
                Ok(HealthState::Unhealthy)
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                tracing::debug!("Health probe {} unreachable: {}", url, e);
                Ok(HealthState::Unhealthy)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthVerdict {
    Healthy,
    /// 連續失敗但尚未達到 retries 門檻
    Failing(u32),
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutOutcome {
    CutOver { port: u16 },
    RolledBack { port: u16 },
}

/// 健康檢查監督器：累計連續失敗次數並驅動部署狀態
pub struct HealthSupervisor<H: HealthProbe> {
    probe: H,
    settings: ProbeSettings,
    failures: HashMap<String, u32>,
}

impl<H: HealthProbe> HealthSupervisor<H> {
    pub fn new(probe: H, settings: ProbeSettings) -> Self {
        Self {
            probe,
            settings,
            failures: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// 記錄一次探測結果。成功歸零；連續失敗達 retries 即 Degraded
    pub fn record(&mut self, service: &str, state: HealthState) -> HealthVerdict {
        match state {
            HealthState::Healthy => {
                self.failures.remove(service);
                HealthVerdict::Healthy
            }
            HealthState::Unhealthy => {
                let count = self.failures.entry(service.to_string()).or_insert(0);
                *count += 1;
                if *count >= self.settings.retries {
                    HealthVerdict::Degraded
                } else {
                    HealthVerdict::Failing(*count)
                }
            }
        }
    }

    pub async fn check_once(&self, url: &str) -> Result<HealthState> {
        self.probe.check(url).await
    }

    /// 持續觀察服務，回傳 Degraded 判定或在 max_cycles 後回傳最後狀態
    pub async fn watch(
        &mut self,
        service: &str,
        url: &str,
        max_cycles: u32,
    ) -> Result<HealthVerdict> {
        let mut verdict = HealthVerdict::Healthy;
        for cycle in 0..max_cycles {
            let state = self.probe.check(url).await?;
            verdict = self.record(service, state);
            if verdict == HealthVerdict::Degraded {
                tracing::warn!("⚠️ {} degraded after {} consecutive failures", service, self.settings.retries);
                return Ok(verdict);
            }
            if cycle + 1 < max_cycles {
                tokio::time::sleep(self.settings.interval).await;
            }
        }
        Ok(verdict)
    }

    /// 藍綠部署驅動：stage → 探測至健康 → cutover；逾期未健康則 roll back
    pub async fn roll_service<F>(
        &mut self,
        bg: &mut BlueGreen,
        allocator: &mut PortAllocator,
        health_url: F,
        max_attempts: u32,
    ) -> Result<RolloutOutcome>
    where
        F: Fn(u16) -> String,
    {
        let staged_port = bg.stage(allocator)?.port;
        let url = health_url(staged_port);
        let probe_key = format!("{}@{}", bg.service(), staged_port);

        tracing::info!(
            "🚀 {}: staged on port {}, probing {}",
            bg.service(),
            staged_port,
            url
        );

        for attempt in 1..=max_attempts {
            let state = match self.probe.check(&url).await {
                Ok(state) => state,
                Err(e) => {
                    // 探測本身失敗也不能讓 staged slot 卡在 Provisioning 佔著埠
                    if let Err(rollback_err) = bg.roll_back(allocator) {
                        tracing::error!(
                            "❌ {}: rollback after probe failure also failed: {}",
                            bg.service(),
                            rollback_err
                        );
                    }
                    return Err(e);
                }
            };
            if state == HealthState::Healthy {
                self.failures.remove(&probe_key);
                bg.mark_idle(DeployState::Healthy)?;
                let port = bg.cutover(allocator)?;
                tracing::info!("✅ {}: cutover to port {}", bg.service(), port);
                return Ok(RolloutOutcome::CutOver { port });
            }

            self.record(&probe_key, state);
            tracing::debug!(
                "{}: staging probe {}/{} failed",
                bg.service(),
                attempt,
                max_attempts
            );

            if attempt < max_attempts {
                tokio::time::sleep(self.settings.interval).await;
            }
        }

        bg.roll_back(allocator)?;
        tracing::warn!(
            "↩️ {}: staged slot never became healthy, rolled back",
            bg.service()
        );
        Ok(RolloutOutcome::RolledBack { port: staged_port })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Component;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// 依序回放預定結果的探測器
    struct ScriptedProbe {
        script: Vec<HealthState>,
        cursor: Arc<AtomicUsize>,
    }

    impl ScriptedProbe {
        fn new(script: Vec<HealthState>) -> Self {
            Self {
                script,
                cursor: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl HealthProbe for ScriptedProbe {
        async fn check(&self, _url: &str) -> Result<HealthState> {
            let i = self.cursor.fetch_add(1, Ordering::SeqCst);
            Ok(*self.script.get(i).unwrap_or(&HealthState::Unhealthy))
        }
    }

    fn fast_settings() -> ProbeSettings {
        ProbeSettings {
            interval: Duration::from_millis(1),
            timeout: Duration::from_millis(50),
            retries: 3,
        }
    }

    #[test]
    fn test_record_degrades_after_retries() {
        let mut supervisor =
            HealthSupervisor::new(ScriptedProbe::new(vec![]), fast_settings());

        assert_eq!(
            supervisor.record("svc", HealthState::Unhealthy),
            HealthVerdict::Failing(1)
        );
        assert_eq!(
            supervisor.record("svc", HealthState::Unhealthy),
            HealthVerdict::Failing(2)
        );
        assert_eq!(
            supervisor.record("svc", HealthState::Unhealthy),
            HealthVerdict::Degraded
        );
    }

    #[test]
    fn test_record_resets_on_success() {
        let mut supervisor =
            HealthSupervisor::new(ScriptedProbe::new(vec![]), fast_settings());

        supervisor.record("svc", HealthState::Unhealthy);
        supervisor.record("svc", HealthState::Unhealthy);
        assert_eq!(
            supervisor.record("svc", HealthState::Healthy),
            HealthVerdict::Healthy
        );
        // 歸零後重新計數
        assert_eq!(
            supervisor.record("svc", HealthState::Unhealthy),
            HealthVerdict::Failing(1)
        );
    }

    #[tokio::test]
    async fn test_watch_returns_degraded() {
        let probe = ScriptedProbe::new(vec![
            HealthState::Healthy,
            HealthState::Unhealthy,
            HealthState::Unhealthy,
            HealthState::Unhealthy,
        ]);
        let mut supervisor = HealthSupervisor::new(probe, fast_settings());

        let verdict = supervisor.watch("svc", "http://localhost/health", 10).await.unwrap();
        assert_eq!(verdict, HealthVerdict::Degraded);
    }

    #[tokio::test]
    async fn test_roll_service_cutover_on_healthy() {
        let probe = ScriptedProbe::new(vec![HealthState::Unhealthy, HealthState::Healthy]);
        let mut supervisor = HealthSupervisor::new(probe, fast_settings());

        let mut allocator = PortAllocator::new();
        allocator
            .reserve(Component::Apis, 4001, "api-gateway")
            .unwrap();
        let mut bg = BlueGreen::new("api-gateway", Component::Apis, 4001);

        let outcome = supervisor
            .roll_service(&mut bg, &mut allocator, |p| {
                format!("http://localhost:{}/health", p)
            }, 5)
            .await
            .unwrap();

        assert_eq!(outcome, RolloutOutcome::CutOver { port: 4000 });
        assert_eq!(bg.active().unwrap().port, 4000);
        assert!(allocator.holder(4001).is_none());
    }

    #[tokio::test]
    async fn test_roll_service_rolls_back_on_transport_error() {
        /// 模擬傳輸層以外的硬錯誤
        struct BrokenProbe;

        #[async_trait]
        impl HealthProbe for BrokenProbe {
            async fn check(&self, _url: &str) -> Result<HealthState> {
                Err(crate::utils::error::OrchestratorError::IoError(
                    std::io::Error::other("transport failure"),
                ))
            }
        }

        let mut supervisor = HealthSupervisor::new(BrokenProbe, fast_settings());

        let mut allocator = PortAllocator::new();
        allocator
            .reserve(Component::Apis, 4001, "api-gateway")
            .unwrap();
        let mut bg = BlueGreen::new("api-gateway", Component::Apis, 4001);

        let err = supervisor
            .roll_service(&mut bg, &mut allocator, |p| {
                format!("http://localhost:{}/health", p)
            }, 5)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::utils::error::OrchestratorError::IoError(_)
        ));
        // staged 埠已歸還，slot 已標記 RolledBack，現役版本不受影響
        assert!(allocator.holder(4000).is_none());
        assert_eq!(bg.idle().unwrap().state, DeployState::RolledBack);
        assert_eq!(bg.active().unwrap().port, 4001);
    }

    #[tokio::test]
    async fn test_roll_service_rolls_back_when_never_healthy() {
        let probe = ScriptedProbe::new(vec![
            HealthState::Unhealthy,
            HealthState::Unhealthy,
            HealthState::Unhealthy,
        ]);
        let mut supervisor = HealthSupervisor::new(probe, fast_settings());

        let mut allocator = PortAllocator::new();
        allocator
            .reserve(Component::Apis, 4001, "api-gateway")
            .unwrap();
        let mut bg = BlueGreen::new("api-gateway", Component::Apis, 4001);

        let outcome = supervisor
            .roll_service(&mut bg, &mut allocator, |p| {
                format!("http://localhost:{}/health", p)
            }, 3)
            .await
            .unwrap();

        assert_eq!(outcome, RolloutOutcome::RolledBack { port: 4000 });
        // 現役版本原封不動
        assert_eq!(bg.active().unwrap().port, 4001);
        assert_eq!(bg.active().unwrap().state, DeployState::Healthy);
        assert!(allocator.holder(4000).is_none());
    }
}
