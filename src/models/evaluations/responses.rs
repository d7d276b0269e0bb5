use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::EvaluatorType;
use super::requests::EvaluationListQuery;
use super::rubric::{RubricField, RubricPart};
use crate::models::common::lenient::{deserialize_count, deserialize_optional_number};
use crate::models::profiles::entities::{InternshipOption, StudentOption};

/// 分项汇总：第一部分、第二部分与总分
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ScoreBreakdown {
    pub discipline_score: f64,
    pub professional_score: f64,
    pub total_score: f64,
}

/// 评价统计（评价者维度）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationStatistics {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_evaluations: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub pending_evaluations: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub completed_evaluations: u64,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub average_score: Option<f64>,
}

/// 表格中的一行：关联关系已在边界处展开
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationRow {
    pub id: Option<i64>,
    pub internship_id: Option<i64>,
    pub student_id: Option<i64>,
    pub student_name: Option<String>,
    pub student_code: Option<String>,
    pub company_name: Option<String>,
    pub evaluator_type: Option<EvaluatorType>,
    pub discipline_score: f64,
    pub professional_score: f64,
    pub total_score: f64,
    pub is_final_evaluation: bool,
    pub evaluation_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub comments: Option<String>,
}

/// 各区块独立加载时的错误信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct SectionErrors {
    pub list: Option<String>,
    pub statistics: Option<String>,
    pub options: Option<String>,
}

impl SectionErrors {
    pub fn any(&self) -> bool {
        self.list.is_some() || self.statistics.is_some() || self.options.is_some()
    }
}

/// 列表页面的完整快照
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationListView {
    pub query: EvaluationListQuery,
    pub rows: Vec<EvaluationRow>,
    pub total: u64,
    pub total_pages: u64,
    pub statistics: EvaluationStatistics,
    pub students: Vec<StudentOption>,
    pub internships: Vec<InternshipOption>,
    pub errors: SectionErrors,
}

/// 单项评分的进度条
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ScoreProgress {
    pub field: RubricField,
    pub label: String,
    pub value: f64,
    pub cap: f64,
    pub percent: f64,
    pub display: String,
}

/// 量表一个部分的展示数据
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct RubricPartView {
    pub part: RubricPart,
    pub label: String,
    pub score: f64,
    pub cap: f64,
    pub display: String,
    pub items: Vec<ScoreProgress>,
}

/// 只读模式下的评价展示数据
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationViewModel {
    pub evaluation_id: Option<i64>,
    pub student_name: Option<String>,
    pub company_name: Option<String>,
    pub parts: Vec<RubricPartView>,
    pub breakdown: ScoreBreakdown,
    pub total_display: String,
    pub comments: Option<String>,
    pub is_final_evaluation: bool,
    pub evaluation_date: Option<NaiveDate>,
}
