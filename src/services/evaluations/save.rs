use serde_json::Value;
use tracing::info;

use super::EvaluationService;
use crate::errors::Result;
use crate::models::evaluations::{Evaluation, EvaluationPayload};
use crate::utils::unwrap_data;

/// POST /evaluations
pub async fn create_evaluation(
    service: &EvaluationService,
    payload: &EvaluationPayload,
) -> Result<Evaluation> {
    let body = serde_json::to_value(payload)?;
    let response = service.client().post("/evaluations", &body).await?;
    let created = parse_saved(&response, &body)?;
    info!(
        "Evaluation created (ID: {:?}) for internship {}",
        created.id, payload.internship_id
    );
    Ok(created)
}

/// PUT /evaluations/{id}
pub async fn update_evaluation(
    service: &EvaluationService,
    evaluation_id: i64,
    payload: &EvaluationPayload,
) -> Result<Evaluation> {
    let body = serde_json::to_value(payload)?;
    let response = service
        .client()
        .put(&format!("/evaluations/{evaluation_id}"), &body)
        .await?;
    let mut updated = parse_saved(&response, &body)?;
    updated.id.get_or_insert(evaluation_id);
    info!("Evaluation {} updated", evaluation_id);
    Ok(updated)
}

// 部分接口保存成功后只返回空体，此时以提交内容为准
fn parse_saved(response: &Value, submitted: &Value) -> Result<Evaluation> {
    let data = unwrap_data(response);
    if data.is_object() {
        Ok(serde_json::from_value(data.clone())?)
    } else {
        Ok(serde_json::from_value(submitted.clone())?)
    }
}
