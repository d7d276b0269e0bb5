use super::EvaluationService;
use crate::errors::Result;
use crate::models::evaluations::Evaluation;
use crate::utils::unwrap_data;

/// GET /evaluations/{id}
pub async fn get_evaluation(service: &EvaluationService, evaluation_id: i64) -> Result<Evaluation> {
    let body = service
        .client()
        .get(&format!("/evaluations/{evaluation_id}"), &[])
        .await?;
    Ok(serde_json::from_value(unwrap_data(&body).clone())?)
}
