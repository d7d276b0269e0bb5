use super::EvaluationService;
use super::score::resolve_breakdown;
use crate::errors::{PortalError, Result};
use crate::models::common::NormalizedPage;
use crate::models::evaluations::{Evaluation, EvaluationListQuery, EvaluationRow, EvaluatorRef};
use crate::utils::{normalize_as, validate_keyword};

/// GET /evaluations/{role}/{id}
pub async fn list_evaluations(
    service: &EvaluationService,
    evaluator: EvaluatorRef,
    query: &EvaluationListQuery,
) -> Result<NormalizedPage<EvaluationRow>> {
    validate_keyword(&query.keyword).map_err(PortalError::validation)?;

    let path = format!(
        "/evaluations/{}/{}",
        evaluator.role.path_segment(),
        evaluator.id
    );
    let body = service.client().get(&path, &query.to_params()).await?;
    let page = normalize_as::<Evaluation>(&body);

    Ok(NormalizedPage {
        list: page.list.iter().map(to_row).collect(),
        total: page.total,
    })
}

/// 在边界处展开嵌套的实习/学生/单位关系
pub fn to_row(evaluation: &Evaluation) -> EvaluationRow {
    let breakdown = resolve_breakdown(evaluation);
    let student = evaluation.student();

    EvaluationRow {
        id: evaluation.id,
        internship_id: evaluation.resolved_internship_id(),
        student_id: evaluation.resolved_student_id(),
        student_name: student.and_then(|s| s.display_name()),
        student_code: student.and_then(|s| s.student_code.clone()),
        company_name: evaluation.company().and_then(|c| c.company_name.clone()),
        evaluator_type: evaluation.evaluator_type,
        discipline_score: breakdown.discipline_score,
        professional_score: breakdown.professional_score,
        total_score: breakdown.total_score,
        is_final_evaluation: evaluation.is_final_evaluation,
        evaluation_date: evaluation.evaluation_date,
        status: evaluation.status.clone(),
        comments: evaluation.comments.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpMethod;
    use crate::client::mock::MockApiClient;
    use crate::models::evaluations::EvaluatorType;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rows_are_denormalized() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            HttpMethod::Get,
            "/evaluations/teacher/7",
            Ok(json!({
                "content": [
                    {
                        "id": 1,
                        "overallScore": 8.5,
                        "internship": {
                            "id": 30,
                            "student": {"id": 3, "studentCode": "SV001", "user": {"fullName": "韩梅梅"}},
                            "company": {"id": 2, "companyName": "示例科技"}
                        }
                    },
                    {"id": 2, "internshipId": 31, "workEnthusiasm": 0.5, "learningSpirit": 1}
                ],
                "totalElements": 12
            })),
        );
        let service = EvaluationService::new(client.clone());

        let page = service
            .list_evaluations(EvaluatorRef::teacher(7), &EvaluationListQuery::default())
            .await
            .unwrap();

        assert_eq!(page.total, 12);
        let first = &page.list[0];
        assert_eq!(first.total_score, 8.5);
        assert_eq!(first.student_name.as_deref(), Some("韩梅梅"));
        assert_eq!(first.student_code.as_deref(), Some("SV001"));
        assert_eq!(first.company_name.as_deref(), Some("示例科技"));
        assert_eq!(first.internship_id, Some(30));

        let second = &page.list[1];
        assert_eq!(second.internship_id, Some(31));
        assert_eq!(second.student_name, None);
        assert_eq!(second.discipline_score, 0.5);
        assert_eq!(second.total_score, 1.5);
    }

    #[tokio::test]
    async fn test_irregular_field_shapes_keep_every_record() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            HttpMethod::Get,
            "/evaluations/mentor/4",
            Ok(json!({
                "content": [
                    {"id": 1, "isFinalEvaluation": null, "studentId": 3},
                    {"id": "2", "overallScore": "7.5", "internshipId": "31"},
                    {"id": 3, "evaluatorType": "COMPANY", "isFinalEvaluation": "true"},
                    {"id": 4, "evaluatorType": "MENTOR", "overallScore": 9.0}
                ],
                "totalElements": 4
            })),
        );
        let service = EvaluationService::new(client.clone());

        let page = service
            .list_evaluations(EvaluatorRef::mentor(4), &EvaluationListQuery::default())
            .await
            .unwrap();

        assert_eq!(page.total, 4);
        assert_eq!(page.list.len(), 4);
        assert!(!page.list[0].is_final_evaluation);
        assert_eq!(page.list[1].id, Some(2));
        assert_eq!(page.list[1].internship_id, Some(31));
        assert_eq!(page.list[1].total_score, 7.5);
        assert_eq!(page.list[2].evaluator_type, None);
        assert!(page.list[2].is_final_evaluation);
        assert_eq!(page.list[3].evaluator_type, Some(EvaluatorType::Mentor));
        assert_eq!(page.list[3].total_score, 9.0);
    }

    #[tokio::test]
    async fn test_overlong_keyword_is_rejected_locally() {
        let client = Arc::new(MockApiClient::new());
        let service = EvaluationService::new(client.clone());
        let query = EvaluationListQuery {
            keyword: "x".repeat(200),
            ..EvaluationListQuery::default()
        };

        let err = service
            .list_evaluations(EvaluatorRef::teacher(7), &query)
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
        assert!(client.calls().is_empty());
    }
}
