use std::sync::Arc;
use tracing::{debug, info};

use crate::client::{ApiClient, create_client};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::{EvaluationService, ProfileService, Session};

pub struct StartupContext {
    pub client: Arc<dyn ApiClient>,
    pub evaluations: EvaluationService,
    pub profiles: ProfileService,
    pub session: Session,
}

impl StartupContext {
    /// 由任意客户端实现组装各个服务
    pub fn with_client(client: Arc<dyn ApiClient>) -> Self {
        Self {
            evaluations: EvaluationService::new(client.clone()),
            profiles: ProfileService::new(client.clone()),
            session: Session::new(client.clone()),
            client,
        }
    }
}

/// 准备客户端启动的上下文
/// 包括 TLS 提供者、HTTP 客户端与会话
pub fn prepare_client_startup() -> Result<StartupContext> {
    // 重复安装会返回 Err，忽略即可
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let client = create_client()?;
    info!(
        "API client initialized for {}",
        AppConfig::get().api.base_url
    );

    Ok(StartupContext::with_client(client))
}
