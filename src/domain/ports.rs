use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 探測 OS 層埠號是否可用（測試時以腳本化 mock 取代）
pub trait PortProbe: Send + Sync {
    fn is_free(&self, port: u16) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self, url: &str) -> Result<HealthState>;
}

pub trait InventoryProvider: Send + Sync {
    fn base_path(&self) -> &str;
    fn archive_outputs(&self) -> bool;
}
