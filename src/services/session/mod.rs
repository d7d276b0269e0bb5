//! 当前会话
//!
//! 缓存的用户只在启动时作为过期但可用的状态，经 `/auth/me` 确认后才算可信：
//! `Anonymous -> Stale(user) -> Reconciled(user)`。

use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::errors::{PortalError, Result};
use crate::models::auth::{CurrentUser, LoginRequest, LoginResponse};
use crate::utils::unwrap_data;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Anonymous,
    // 来自本地缓存，尚未与服务端确认
    Stale(CurrentUser),
    Reconciled(CurrentUser),
}

impl SessionPhase {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            SessionPhase::Anonymous => None,
            SessionPhase::Stale(user) | SessionPhase::Reconciled(user) => Some(user),
        }
    }
}

pub struct Session {
    client: Arc<dyn ApiClient>,
    phase: RwLock<SessionPhase>,
}

impl Session {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self {
            client,
            phase: RwLock::new(SessionPhase::Anonymous),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase.read().expect("session lock poisoned").clone()
    }

    fn set_phase(&self, phase: SessionPhase) {
        *self.phase.write().expect("session lock poisoned") = phase;
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.phase().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase().user().is_some()
    }

    pub fn is_reconciled(&self) -> bool {
        matches!(self.phase(), SessionPhase::Reconciled(_))
    }

    /// 使用缓存的用户与令牌恢复会话
    pub fn restore(&self, user: CurrentUser, token: String) {
        debug!("Restoring cached session for user {}", user.id);
        self.client.set_auth_token(Some(token));
        self.set_phase(SessionPhase::Stale(user));
    }

    /// GET /auth/me：认证失败回到匿名，网络失败保留缓存的用户
    pub async fn reconcile(&self) -> Result<Option<CurrentUser>> {
        if matches!(self.phase(), SessionPhase::Anonymous) {
            return Ok(None);
        }
        match self.client.get("/auth/me", &[]).await {
            Ok(body) => {
                let user: CurrentUser = serde_json::from_value(unwrap_data(&body).clone())?;
                self.set_phase(SessionPhase::Reconciled(user.clone()));
                Ok(Some(user))
            }
            Err(PortalError::Authentication(msg)) => {
                warn!("Cached session rejected: {}", msg);
                self.logout();
                Ok(None)
            }
            Err(e) => {
                warn!("Session reconciliation failed, keeping cached user: {}", e);
                Err(e)
            }
        }
    }

    /// POST /auth/login
    pub async fn login(&self, username: &str, password: &str) -> Result<CurrentUser> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(PortalError::validation("用户名和密码不能为空"));
        }
        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let body = self
            .client
            .post("/auth/login", &serde_json::to_value(&request)?)
            .await?;
        let response: LoginResponse = serde_json::from_value(unwrap_data(&body).clone())?;

        self.client.set_auth_token(Some(response.token));
        info!(
            "Logged in as {} ({})",
            response.user.display_name(),
            response.user.role
        );
        self.set_phase(SessionPhase::Reconciled(response.user.clone()));
        Ok(response.user)
    }

    pub fn logout(&self) {
        self.client.set_auth_token(None);
        self.set_phase(SessionPhase::Anonymous);
    }
}
