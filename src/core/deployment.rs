use crate::core::allocator::PortAllocator;
use crate::domain::model::Component;
use crate::utils::error::{OrchestratorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 部署生命週期狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployState {
    Pending,
    Provisioning,
    Healthy,
    Degraded,
    RolledBack,
}

impl DeployState {
    /// 合法的狀態轉移表
    pub fn can_transition(self, to: DeployState) -> bool {
        use DeployState::*;
        matches!(
            (self, to),
            (Pending, Provisioning)
                | (Provisioning, Healthy)
                | (Provisioning, Degraded)
                | (Healthy, Degraded)
                | (Degraded, Healthy)
                | (Degraded, RolledBack)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployState::Pending => "pending",
            DeployState::Provisioning => "provisioning",
            DeployState::Healthy => "healthy",
            DeployState::Degraded => "degraded",
            DeployState::RolledBack => "rolled_back",
        }
    }
}

impl std::fmt::Display for DeployState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Blue,
    Green,
}

impl Slot {
    pub fn other(self) -> Slot {
        match self {
            Slot::Blue => Slot::Green,
            Slot::Green => Slot::Blue,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Blue => f.write_str("blue"),
            Slot::Green => f.write_str("green"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub from: DeployState,
    pub to: DeployState,
    pub at: DateTime<Utc>,
}

/// 單一服務在某個 slot 上的部署紀錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub service: String,
    pub slot: Slot,
    pub port: u16,
    pub state: DeployState,
    pub history: Vec<Transition>,
}

impl Deployment {
    pub fn new(service: &str, slot: Slot, port: u16) -> Self {
        Self {
            service: service.to_string(),
            slot,
            port,
            state: DeployState::Pending,
            history: Vec::new(),
        }
    }

    /// 執行一次狀態轉移；非法轉移回傳錯誤且不留痕跡
    pub fn advance(&mut self, to: DeployState) -> Result<()> {
        if !self.state.can_transition(to) {
            return Err(OrchestratorError::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        self.history.push(Transition {
            from: self.state,
            to,
            at: Utc::now(),
        });
        tracing::info!(
            "🚀 {} [{}] {} -> {}",
            self.service,
            self.slot,
            self.state,
            to
        );
        self.state = to;
        Ok(())
    }
}

/// 藍綠雙 slot 管理：隨時恰有一個 active slot，cutover 前不拆除舊版
pub struct BlueGreen {
    service: String,
    component: Component,
    active: Slot,
    blue: Option<Deployment>,
    green: Option<Deployment>,
}

impl BlueGreen {
    /// 以現役埠建立：active slot 視為 Blue，掛載目前上線中的版本
    pub fn new(service: &str, component: Component, active_port: u16) -> Self {
        let mut live = Deployment::new(service, Slot::Blue, active_port);
        // 現役版本已經上線，直接走完合法路徑
        live.advance(DeployState::Provisioning).ok();
        live.advance(DeployState::Healthy).ok();

        Self {
            service: service.to_string(),
            component,
            active: Slot::Blue,
            blue: Some(live),
            green: None,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn active_slot(&self) -> Slot {
        self.active
    }

    pub fn active(&self) -> Option<&Deployment> {
        self.slot_ref(self.active)
    }

    pub fn idle(&self) -> Option<&Deployment> {
        self.slot_ref(self.active.other())
    }

    fn slot_ref(&self, slot: Slot) -> Option<&Deployment> {
        match slot {
            Slot::Blue => self.blue.as_ref(),
            Slot::Green => self.green.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Deployment> {
        match slot {
            Slot::Blue => &mut self.blue,
            Slot::Green => &mut self.green,
        }
    }

    /// 在 idle slot 上開始佈建新版本，埠號由配置器取得
    pub fn stage(&mut self, allocator: &mut PortAllocator) -> Result<&Deployment> {
        let idle = self.active.other();
        if let Some(existing) = self.slot_ref(idle) {
            if existing.state != DeployState::RolledBack {
                return Err(OrchestratorError::DeployError {
                    message: format!(
                        "Slot {} of '{}' is still occupied ({})",
                        idle, self.service, existing.state
                    ),
                });
            }
        }

        let port = allocator.allocate(self.component, &self.service)?;
        let mut deployment = Deployment::new(&self.service, idle, port);
        deployment.advance(DeployState::Provisioning)?;

        *self.slot_mut(idle) = Some(deployment);
        Ok(self.slot_ref(idle).unwrap())
    }

    pub fn mark_idle(&mut self, state: DeployState) -> Result<()> {
        let idle = self.active.other();
        match self.slot_mut(idle).as_mut() {
            Some(deployment) => deployment.advance(state),
            None => Err(OrchestratorError::DeployError {
                message: format!("No staged deployment in slot {} of '{}'", idle, self.service),
            }),
        }
    }

    /// 切換流量：idle slot 必須 Healthy，舊 active 的埠在切換後才釋放
    pub fn cutover(&mut self, allocator: &mut PortAllocator) -> Result<u16> {
        let idle = self.active.other();
        let idle_state = self
            .slot_ref(idle)
            .map(|d| d.state)
            .ok_or_else(|| OrchestratorError::CutoverRefused {
                state: "empty".to_string(),
            })?;

        if idle_state != DeployState::Healthy {
            return Err(OrchestratorError::CutoverRefused {
                state: idle_state.to_string(),
            });
        }

        // 先歸還舊埠，失敗時兩個 slot 都保持原樣；切換本身不會失敗
        if let Some(old) = self.slot_ref(self.active) {
            allocator.release(old.port)?;
            tracing::info!(
                "🔄 {}: cutover complete, retired {} slot on port {}",
                self.service,
                old.slot,
                old.port
            );
        }

        self.slot_mut(self.active).take();
        self.active = idle;

        Ok(self.active().map(|d| d.port).unwrap_or_default())
    }

    /// 放棄 staged 版本：標記 RolledBack 並歸還埠號
    pub fn roll_back(&mut self, allocator: &mut PortAllocator) -> Result<()> {
        let idle = self.active.other();
        match self.slot_mut(idle).as_mut() {
            Some(deployment) => {
                if deployment.state == DeployState::Provisioning
                    || deployment.state == DeployState::Healthy
                {
                    deployment.advance(DeployState::Degraded)?;
                }
                deployment.advance(DeployState::RolledBack)?;
                let port = deployment.port;
                allocator.release(port)?;
                tracing::warn!(
                    "↩️ {}: rolled back staged {} slot, port {} returned",
                    self.service,
                    idle,
                    port
                );
                Ok(())
            }
            None => Err(OrchestratorError::DeployError {
                message: format!("No staged deployment to roll back for '{}'", self.service),
            }),
        }
    }
}
