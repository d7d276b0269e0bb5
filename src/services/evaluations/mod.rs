pub mod controller;
pub mod detail;
pub mod form;
pub mod history;
pub mod list;
pub mod save;
pub mod score;
pub mod stats;
pub mod view;

use std::sync::Arc;

use crate::client::ApiClient;
use crate::errors::Result;
use crate::models::common::NormalizedPage;
use crate::models::evaluations::{
    Evaluation, EvaluationListQuery, EvaluationPayload, EvaluationRow, EvaluationStatistics,
    EvaluatorRef,
};

pub use controller::EvaluationListController;
pub use form::{EvaluationForm, FormField, FormMode, FormOptions};

#[derive(Clone)]
pub struct EvaluationService {
    client: Arc<dyn ApiClient>,
}

impl EvaluationService {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub(crate) fn client(&self) -> &Arc<dyn ApiClient> {
        &self.client
    }

    /// 列出评价者名下的评价（已归一化并展开为表格行）
    pub async fn list_evaluations(
        &self,
        evaluator: EvaluatorRef,
        query: &EvaluationListQuery,
    ) -> Result<NormalizedPage<EvaluationRow>> {
        list::list_evaluations(self, evaluator, query).await
    }

    /// 获取单条评价
    pub async fn get_evaluation(&self, evaluation_id: i64) -> Result<Evaluation> {
        detail::get_evaluation(self, evaluation_id).await
    }

    /// 创建评价
    pub async fn create_evaluation(&self, payload: &EvaluationPayload) -> Result<Evaluation> {
        save::create_evaluation(self, payload).await
    }

    /// 更新评价
    pub async fn update_evaluation(
        &self,
        evaluation_id: i64,
        payload: &EvaluationPayload,
    ) -> Result<Evaluation> {
        save::update_evaluation(self, evaluation_id, payload).await
    }

    /// 获取评价者维度的统计
    pub async fn get_statistics(&self, evaluator: EvaluatorRef) -> Result<EvaluationStatistics> {
        stats::get_statistics(self, evaluator).await
    }

    /// 获取学生的评价历史（最新在前）
    pub async fn student_history(&self, student_id: i64) -> Result<Vec<Evaluation>> {
        history::student_history(self, student_id).await
    }

    /// 获取学生最近一次评价
    pub async fn latest_for_student(&self, student_id: i64) -> Result<Option<Evaluation>> {
        history::latest_for_student(self, student_id).await
    }
}
