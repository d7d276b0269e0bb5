use super::EvaluationService;
use crate::errors::Result;
use crate::models::evaluations::{EvaluationStatistics, EvaluatorRef};
use crate::utils::unwrap_data;

/// GET /evaluations/{role}/{id}/statistics
pub async fn get_statistics(
    service: &EvaluationService,
    evaluator: EvaluatorRef,
) -> Result<EvaluationStatistics> {
    let path = format!(
        "/evaluations/{}/{}/statistics",
        evaluator.role.path_segment(),
        evaluator.id
    );
    let body = service.client().get(&path, &[]).await?;
    Ok(serde_json::from_value(unwrap_data(&body).clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpMethod;
    use crate::client::mock::MockApiClient;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_statistics_for_mentor() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            HttpMethod::Get,
            "/evaluations/mentor/4/statistics",
            Ok(json!({
                "totalEvaluations": 10,
                "pendingEvaluations": 3,
                "completedEvaluations": 7,
                "averageScore": 8.25
            })),
        );
        let service = EvaluationService::new(client);

        let stats = service.get_statistics(EvaluatorRef::mentor(4)).await.unwrap();
        assert_eq!(stats.total_evaluations, 10);
        assert_eq!(stats.pending_evaluations, 3);
        assert_eq!(stats.completed_evaluations, 7);
        assert_eq!(stats.average_score, Some(8.25));
    }

    #[tokio::test]
    async fn test_missing_statistics_fields_default_to_zero() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            HttpMethod::Get,
            "/evaluations/teacher/7/statistics",
            Ok(json!({"data": {"totalEvaluations": 2}})),
        );
        let service = EvaluationService::new(client);

        let stats = service.get_statistics(EvaluatorRef::teacher(7)).await.unwrap();
        assert_eq!(stats.total_evaluations, 2);
        assert_eq!(stats.pending_evaluations, 0);
        assert_eq!(stats.average_score, None);
    }

    #[tokio::test]
    async fn test_null_and_fractional_counters_are_accepted() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            HttpMethod::Get,
            "/evaluations/teacher/7/statistics",
            Ok(json!({
                "totalEvaluations": 10.0,
                "pendingEvaluations": null,
                "completedEvaluations": "10",
                "averageScore": "8.5"
            })),
        );
        let service = EvaluationService::new(client);

        let stats = service.get_statistics(EvaluatorRef::teacher(7)).await.unwrap();
        assert_eq!(stats.total_evaluations, 10);
        assert_eq!(stats.pending_evaluations, 0);
        assert_eq!(stats.completed_evaluations, 10);
        assert_eq!(stats.average_score, Some(8.5));
    }
}
