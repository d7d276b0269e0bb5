use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::{EvaluatorRef, EvaluatorRole, EvaluatorType};
use super::rubric::RubricScores;
use crate::models::common::{SortSpec, ZeroBasedPage};

/// 状态筛选中表示"全部"的取值
pub const STATUS_ALL: &str = "ALL";

/// 评价列表查询条件（只存在于客户端，任一字段变化都会触发重新加载）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationListQuery {
    pub keyword: String,
    // None 表示全部状态
    pub status: Option<String>,
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    // 该接口的页码从 0 开始
    pub page: ZeroBasedPage,
    pub size: u32,
    pub sort: SortSpec,
}

impl Default for EvaluationListQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            status: None,
            semester: None,
            academic_year: None,
            page: ZeroBasedPage::FIRST,
            size: 10,
            sort: SortSpec::most_recent_first(),
        }
    }
}

impl EvaluationListQuery {
    pub fn with_size(size: u32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// 将 "ALL"、空串等统一为 None
    pub fn normalize_filter(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(STATUS_ALL))
    }

    /// 转为查询参数，空条件不发送
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let keyword = self.keyword.trim();
        if !keyword.is_empty() {
            params.push(("keyword".to_string(), keyword.to_string()));
        }
        if let Some(status) = &self.status {
            params.push(("status".to_string(), status.clone()));
        }
        if let Some(semester) = &self.semester {
            params.push(("semester".to_string(), semester.clone()));
        }
        if let Some(year) = &self.academic_year {
            params.push(("academicYear".to_string(), year.clone()));
        }
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("size".to_string(), self.size.to_string()));
        params.push(("sort".to_string(), self.sort.to_param()));
        params
    }
}

/// 创建 / 更新评价的请求体
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    pub internship_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor_id: Option<i64>,
    pub evaluator_type: EvaluatorType,
    #[serde(flatten)]
    #[ts(flatten)]
    pub scores: RubricScores,
    pub comments: String,
    pub is_final_evaluation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_date: Option<NaiveDate>,
}

impl EvaluationPayload {
    pub fn new(
        evaluator: EvaluatorRef,
        student_id: Option<i64>,
        internship_id: i64,
        scores: RubricScores,
    ) -> Self {
        let (teacher_id, mentor_id) = match evaluator.role {
            EvaluatorRole::Teacher => (Some(evaluator.id), None),
            EvaluatorRole::Mentor => (None, Some(evaluator.id)),
        };
        Self {
            student_id,
            internship_id,
            teacher_id,
            mentor_id,
            evaluator_type: evaluator.role.evaluator_type(),
            scores,
            comments: String::new(),
            is_final_evaluation: false,
            evaluation_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_params() {
        let params = EvaluationListQuery::default().to_params();
        assert_eq!(
            params,
            vec![
                ("page".to_string(), "0".to_string()),
                ("size".to_string(), "10".to_string()),
                ("sort".to_string(), "evaluationDate,desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_filters_are_sent_when_present() {
        let query = EvaluationListQuery {
            keyword: "  李 ".to_string(),
            status: EvaluationListQuery::normalize_filter(Some("COMPLETED".into())),
            semester: Some("HK1".into()),
            academic_year: Some("2024-2025".into()),
            ..EvaluationListQuery::default()
        };
        let params = query.to_params();
        assert!(params.contains(&("keyword".to_string(), "李".to_string())));
        assert!(params.contains(&("status".to_string(), "COMPLETED".to_string())));
        assert!(params.contains(&("academicYear".to_string(), "2024-2025".to_string())));
    }

    #[test]
    fn test_all_status_is_not_a_filter() {
        assert_eq!(EvaluationListQuery::normalize_filter(Some("ALL".into())), None);
        assert_eq!(EvaluationListQuery::normalize_filter(Some(" ".into())), None);
    }

    #[test]
    fn test_payload_carries_evaluator_id_by_role() {
        let payload =
            EvaluationPayload::new(EvaluatorRef::mentor(4), Some(1), 2, RubricScores::default());
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["mentorId"], 4);
        assert!(body.get("teacherId").is_none());
        assert_eq!(body["evaluatorType"], "MENTOR");
    }
}
