pub mod lookup;
pub mod options;

use std::sync::Arc;

use crate::client::ApiClient;
use crate::errors::Result;
use crate::models::evaluations::{EvaluatorRef, EvaluatorRole};
use crate::models::profiles::{EvaluatorProfile, InternshipOption, StudentOption};

#[derive(Clone)]
pub struct ProfileService {
    client: Arc<dyn ApiClient>,
}

impl ProfileService {
    pub fn new(client: Arc<dyn ApiClient>) -> Self {
        Self { client }
    }

    pub(crate) fn client(&self) -> &Arc<dyn ApiClient> {
        &self.client
    }

    /// 由用户 ID 查询教师或导师档案
    pub async fn find_profile(&self, user_id: i64, role: EvaluatorRole) -> Result<EvaluatorProfile> {
        lookup::find_profile(self, user_id, role).await
    }

    /// 由用户 ID 解析评价者身份，任何失败都视为查询失败
    pub async fn resolve_evaluator(&self, user_id: i64, role: EvaluatorRole) -> Result<EvaluatorRef> {
        lookup::resolve_evaluator(self, user_id, role).await
    }

    // 创建表单的学生选项
    pub async fn list_students(&self, evaluator: EvaluatorRef) -> Result<Vec<StudentOption>> {
        options::list_students(self, evaluator).await
    }

    // 创建表单的实习选项
    pub async fn list_internships(&self, evaluator: EvaluatorRef) -> Result<Vec<InternshipOption>> {
        options::list_internships(self, evaluator).await
    }
}
