use std::cmp::Reverse;

use super::EvaluationService;
use crate::errors::Result;
use crate::models::evaluations::Evaluation;
use crate::utils::normalize_as;

/// GET /evaluations/student/{studentId}
pub async fn student_history(
    service: &EvaluationService,
    student_id: i64,
) -> Result<Vec<Evaluation>> {
    let body = service
        .client()
        .get(&format!("/evaluations/student/{student_id}"), &[])
        .await?;
    let mut evaluations = normalize_as::<Evaluation>(&body).list;
    sort_most_recent_first(&mut evaluations);
    Ok(evaluations)
}

pub async fn latest_for_student(
    service: &EvaluationService,
    student_id: i64,
) -> Result<Option<Evaluation>> {
    Ok(student_history(service, student_id).await?.into_iter().next())
}

/// 按日期倒序；无日期的排在最后，同日期按 ID 倒序
pub fn sort_most_recent_first(evaluations: &mut [Evaluation]) {
    evaluations.sort_by_key(|e| (Reverse(e.evaluation_date), Reverse(e.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpMethod;
    use crate::client::mock::MockApiClient;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_history_is_sorted_newest_first() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            HttpMethod::Get,
            "/evaluations/student/3",
            Ok(json!([
                {"id": 1, "evaluationDate": "2025-03-01"},
                {"id": 2},
                {"id": 3, "date": "2025-06-15T08:00:00"},
                {"id": 4, "evaluationDate": "2025-04-20"}
            ])),
        );
        let service = EvaluationService::new(client);

        let history = service.student_history(3).await.unwrap();
        let ids: Vec<_> = history.iter().filter_map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 4, 1, 2]);

        let latest = service.latest_for_student(3).await.unwrap();
        assert_eq!(latest.and_then(|e| e.id), Some(3));
    }

    #[tokio::test]
    async fn test_empty_history() {
        let client = Arc::new(MockApiClient::new());
        client.on(HttpMethod::Get, "/evaluations/student/8", Ok(json!([])));
        let service = EvaluationService::new(client);

        assert!(service.latest_for_student(8).await.unwrap().is_none());
    }
}
