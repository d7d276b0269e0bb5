use tracing::{debug, warn};

use super::ProfileService;
use crate::errors::{PortalError, Result};
use crate::models::evaluations::{EvaluatorRef, EvaluatorRole};
use crate::models::profiles::EvaluatorProfile;
use crate::utils::unwrap_data;

/// GET /{teachers|mentors}/by-user/{userId}
pub async fn find_profile(
    service: &ProfileService,
    user_id: i64,
    role: EvaluatorRole,
) -> Result<EvaluatorProfile> {
    let path = format!("/{}/by-user/{}", role.profile_resource(), user_id);
    let body = service.client().get(&path, &[]).await.map_err(|e| {
        warn!("{} lookup for user {} failed: {}", role.label(), user_id, e);
        PortalError::lookup(format!("无法获取{}信息: {}", role.label(), e.message()))
    })?;

    serde_json::from_value::<EvaluatorProfile>(unwrap_data(&body).clone()).map_err(|e| {
        warn!("{} profile for user {} is malformed: {}", role.label(), user_id, e);
        PortalError::lookup(format!("{}信息格式错误: {}", role.label(), e))
    })
}

pub async fn resolve_evaluator(
    service: &ProfileService,
    user_id: i64,
    role: EvaluatorRole,
) -> Result<EvaluatorRef> {
    let profile = find_profile(service, user_id, role).await?;
    if profile.id <= 0 {
        return Err(PortalError::lookup(format!(
            "{}信息缺少有效 ID",
            role.label()
        )));
    }
    debug!("Resolved user {} to {} {}", user_id, role, profile.id);
    Ok(EvaluatorRef {
        role,
        id: profile.id,
    })
}
