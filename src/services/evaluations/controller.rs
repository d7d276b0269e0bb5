//! 评价列表控制器
//!
//! 持有某个评价者的查询条件与页面状态。列表、统计、下拉选项三组请求相互独立，
//! 任一失败只影响自己的区域。查询条件变化时只重新加载列表；每次加载领取一个
//! 递增的序号，返回时序号已不是最新的响应直接丢弃。

use futures_util::future::join3;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use super::EvaluationService;
use super::form::FormOptions;
use crate::models::common::{SortSpec, ZeroBasedPage};
use crate::models::evaluations::responses::SectionErrors;
use crate::models::evaluations::{
    EvaluationListQuery, EvaluationListView, EvaluationRow, EvaluationStatistics, EvaluatorRef,
};
use crate::models::profiles::{InternshipOption, StudentOption};
use crate::services::profiles::ProfileService;

#[derive(Debug, Default)]
struct ListState {
    rows: Vec<EvaluationRow>,
    total: u64,
    statistics: EvaluationStatistics,
    students: Vec<StudentOption>,
    internships: Vec<InternshipOption>,
    errors: SectionErrors,
}

pub struct EvaluationListController {
    evaluations: EvaluationService,
    profiles: ProfileService,
    evaluator: EvaluatorRef,
    max_size: u32,
    query: Mutex<EvaluationListQuery>,
    state: Mutex<ListState>,
    sequence: AtomicU64,
}

impl EvaluationListController {
    pub fn new(
        evaluations: EvaluationService,
        profiles: ProfileService,
        evaluator: EvaluatorRef,
        query: EvaluationListQuery,
        max_size: u32,
    ) -> Self {
        let max_size = max_size.max(1);
        let query = EvaluationListQuery {
            size: query.size.clamp(1, max_size),
            ..query
        };
        Self {
            evaluations,
            profiles,
            evaluator,
            max_size,
            query: Mutex::new(query),
            state: Mutex::new(ListState::default()),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn evaluator(&self) -> EvaluatorRef {
        self.evaluator
    }

    pub fn query(&self) -> EvaluationListQuery {
        self.query.lock().expect("query lock poisoned").clone()
    }

    /// 首次进入页面：三组请求并发执行
    pub async fn load_all(&self) {
        join3(
            self.reload_list(),
            self.load_statistics(),
            self.load_options(),
        )
        .await;
    }

    /// 重新加载列表；返回 false 表示响应已过期被丢弃
    pub async fn reload_list(&self) -> bool {
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let query = self.query();
        let result = self.evaluations.list_evaluations(self.evaluator, &query).await;

        if self.sequence.load(Ordering::SeqCst) != ticket {
            debug!(
                "Discarding stale list response #{} for page {}",
                ticket, query.page
            );
            return false;
        }

        let mut state = self.state.lock().expect("state lock poisoned");
        match result {
            Ok(page) => {
                state.rows = page.list;
                state.total = page.total;
                state.errors.list = None;
            }
            Err(e) => {
                warn!("Failed to load evaluations for {}: {}", self.evaluator.role, e);
                state.rows.clear();
                state.total = 0;
                state.errors.list = Some(e.message().to_string());
            }
        }
        true
    }

    pub async fn load_statistics(&self) {
        let result = self.evaluations.get_statistics(self.evaluator).await;
        let mut state = self.state.lock().expect("state lock poisoned");
        match result {
            Ok(statistics) => {
                state.statistics = statistics;
                state.errors.statistics = None;
            }
            Err(e) => {
                warn!("Failed to load statistics: {}", e);
                state.statistics = EvaluationStatistics::default();
                state.errors.statistics = Some(e.message().to_string());
            }
        }
    }

    /// 创建表单所需的学生与实习选项
    pub async fn load_options(&self) {
        let (students, internships) = futures_util::future::join(
            self.profiles.list_students(self.evaluator),
            self.profiles.list_internships(self.evaluator),
        )
        .await;

        let mut state = self.state.lock().expect("state lock poisoned");
        let mut failures = Vec::new();
        match students {
            Ok(list) => state.students = list,
            Err(e) => {
                state.students.clear();
                failures.push(e.message().to_string());
            }
        }
        match internships {
            Ok(list) => state.internships = list,
            Err(e) => {
                state.internships.clear();
                failures.push(e.message().to_string());
            }
        }
        if failures.is_empty() {
            state.errors.options = None;
        } else {
            warn!("Failed to load selector options: {}", failures.join("; "));
            state.errors.options = Some(failures.join("; "));
        }
    }

    /// 修改查询条件，确有变化时才重新加载
    async fn update_query<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut EvaluationListQuery),
    {
        let changed = {
            let mut query = self.query.lock().expect("query lock poisoned");
            let before = query.clone();
            apply(&mut query);
            *query != before
        };
        if changed {
            self.reload_list().await;
        }
        changed
    }

    pub async fn set_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.to_string();
        self.update_query(|q| {
            if q.keyword != keyword {
                q.keyword = keyword;
                q.page = ZeroBasedPage::FIRST;
            }
        })
        .await
    }

    /// "ALL" 表示不按状态过滤
    pub async fn set_status(&self, status: Option<String>) -> bool {
        let status = EvaluationListQuery::normalize_filter(status);
        self.update_query(|q| {
            if q.status != status {
                q.status = status;
                q.page = ZeroBasedPage::FIRST;
            }
        })
        .await
    }

    pub async fn set_semester(&self, semester: Option<String>) -> bool {
        let semester = EvaluationListQuery::normalize_filter(semester);
        self.update_query(|q| {
            if q.semester != semester {
                q.semester = semester;
                q.page = ZeroBasedPage::FIRST;
            }
        })
        .await
    }

    pub async fn set_academic_year(&self, academic_year: Option<String>) -> bool {
        let academic_year = EvaluationListQuery::normalize_filter(academic_year);
        self.update_query(|q| {
            if q.academic_year != academic_year {
                q.academic_year = academic_year;
                q.page = ZeroBasedPage::FIRST;
            }
        })
        .await
    }

    pub async fn set_page(&self, page: ZeroBasedPage) -> bool {
        self.update_query(|q| q.page = page).await
    }

    /// 修改每页条数，页码回到 0
    pub async fn set_size(&self, size: u32) -> bool {
        let size = size.clamp(1, self.max_size);
        self.update_query(|q| {
            if q.size != size {
                q.size = size;
                q.page = ZeroBasedPage::FIRST;
            }
        })
        .await
    }

    pub async fn set_sort(&self, sort: SortSpec) -> bool {
        self.update_query(|q| q.sort = sort).await
    }

    /// 当前页面状态的快照
    pub fn snapshot(&self) -> EvaluationListView {
        let query = self.query();
        let state = self.state.lock().expect("state lock poisoned");
        EvaluationListView {
            total_pages: state.total.div_ceil(u64::from(query.size.max(1))),
            query,
            rows: state.rows.clone(),
            total: state.total,
            statistics: state.statistics.clone(),
            students: state.students.clone(),
            internships: state.internships.clone(),
            errors: state.errors.clone(),
        }
    }

    /// 为创建表单准备选项
    ///
    /// 是否全部已评价只看评价者维度的统计，与列表当前的页码和过滤条件无关；
    /// 统计或选项任一加载失败时不做判断。
    pub fn form_options(&self) -> FormOptions {
        let state = self.state.lock().expect("state lock poisoned");
        let stats = &state.statistics;
        let all_evaluated = state.errors.statistics.is_none()
            && state.errors.options.is_none()
            && !state.students.is_empty()
            && stats.pending_evaluations == 0
            && stats.completed_evaluations >= state.students.len() as u64;
        FormOptions {
            students: state.students.clone(),
            internships: state.internships.clone(),
            all_evaluated,
            preselected: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockApiClient;
    use crate::client::{ApiClient, HttpMethod};
    use crate::errors::PortalError;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    const LIST: &str = "/evaluations/teacher/7";

    fn controller(client: Arc<MockApiClient>) -> EvaluationListController {
        let client: Arc<dyn ApiClient> = client;
        EvaluationListController::new(
            EvaluationService::new(client.clone()),
            ProfileService::new(client),
            EvaluatorRef::teacher(7),
            EvaluationListQuery::default(),
            100,
        )
    }

    fn mock_side_sections(client: &MockApiClient) {
        client.on(
            HttpMethod::Get,
            "/evaluations/teacher/7/statistics",
            Ok(json!({"totalEvaluations": 1, "completedEvaluations": 1, "averageScore": 8.5})),
        );
        client.on(
            HttpMethod::Get,
            "/students/teacher/7",
            Ok(json!([{"id": 3, "fullName": "张三"}])),
        );
        client.on(
            HttpMethod::Get,
            "/internships/teacher/7",
            Ok(json!([{"id": 55, "student": {"id": 3}}])),
        );
    }

    #[tokio::test]
    async fn test_end_to_end_list_scenario() {
        let client = Arc::new(MockApiClient::new());
        client.on(
            HttpMethod::Get,
            LIST,
            Ok(json!({
                "content": [{
                    "id": 1,
                    "overallScore": 8.5,
                    "internship": {
                        "id": 55,
                        "student": {"id": 3, "studentCode": "S003", "user": {"fullName": "张三"}},
                        "company": {"companyName": "示例科技"}
                    }
                }],
                "totalElements": 1
            })),
        );
        mock_side_sections(&client);
        let controller = controller(client.clone());
        controller.set_status(Some("ALL".to_string())).await;
        controller.load_all().await;

        let view = controller.snapshot();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].total_score, 8.5);
        assert_eq!(view.rows[0].student_name.as_deref(), Some("张三"));
        assert_eq!(view.rows[0].company_name.as_deref(), Some("示例科技"));
        assert_eq!(view.total, 1);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.statistics.average_score, Some(8.5));
        assert!(!view.errors.any());

        let calls = client.calls_to(HttpMethod::Get, LIST);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].query.contains(&("page".to_string(), "0".to_string())));
        assert!(calls[0].query.contains(&("size".to_string(), "10".to_string())));
        assert!(!calls[0].query.iter().any(|(k, _)| k == "status"));

        // 统计显示唯一的学生已完成评价
        assert!(controller.form_options().all_evaluated);
    }

    #[tokio::test]
    async fn test_sections_fail_independently() {
        let client = Arc::new(MockApiClient::new());
        client.on(HttpMethod::Get, LIST, Ok(json!([{"id": 1, "totalScore": 6.0}])));
        client.on(
            HttpMethod::Get,
            "/evaluations/teacher/7/statistics",
            Err(PortalError::network("HTTP 500 Internal Server Error")),
        );
        client.on(
            HttpMethod::Get,
            "/students/teacher/7",
            Err(PortalError::network("timeout")),
        );
        client.on(HttpMethod::Get, "/internships/teacher/7", Ok(json!([])));
        let controller = controller(client);
        controller.load_all().await;

        let view = controller.snapshot();
        assert_eq!(view.rows.len(), 1);
        assert!(view.errors.list.is_none());
        assert!(view.errors.statistics.is_some());
        assert_eq!(view.statistics, EvaluationStatistics::default());
        assert_eq!(view.errors.options.as_deref(), Some("timeout"));
        assert!(view.students.is_empty());
        assert!(!controller.form_options().all_evaluated);
    }

    #[tokio::test]
    async fn test_all_evaluated_ignores_list_filters() {
        let client = Arc::new(MockApiClient::new());
        client.on(HttpMethod::Get, LIST, Ok(json!({"content": [], "totalElements": 0})));
        client.on(
            HttpMethod::Get,
            "/evaluations/teacher/7/statistics",
            Ok(json!({"totalEvaluations": 2, "pendingEvaluations": 0, "completedEvaluations": 2})),
        );
        client.on(
            HttpMethod::Get,
            "/evaluations/teacher/7/statistics",
            Ok(json!({"totalEvaluations": 2, "pendingEvaluations": 1, "completedEvaluations": 1})),
        );
        client.on(
            HttpMethod::Get,
            "/students/teacher/7",
            Ok(json!([{"id": 3, "fullName": "张三"}, {"id": 4, "fullName": "李四"}])),
        );
        client.on(HttpMethod::Get, "/internships/teacher/7", Ok(json!([])));
        let controller = controller(client.clone());
        controller.load_all().await;
        controller.set_keyword("不存在的名字").await;

        assert!(controller.snapshot().rows.is_empty());
        assert!(controller.form_options().all_evaluated);

        controller.load_statistics().await;
        assert!(!controller.form_options().all_evaluated);
    }

    #[tokio::test]
    async fn test_list_failure_falls_back_to_empty() {
        let client = Arc::new(MockApiClient::new());
        client.on(HttpMethod::Get, LIST, Ok(json!([{"id": 1}])));
        client.on(
            HttpMethod::Get,
            LIST,
            Err(PortalError::network("HTTP 502 Bad Gateway")),
        );
        let controller = controller(client);

        assert!(controller.reload_list().await);
        assert_eq!(controller.snapshot().rows.len(), 1);
        assert!(controller.set_keyword("李").await);

        let view = controller.snapshot();
        assert!(view.rows.is_empty());
        assert_eq!(view.total, 0);
        assert_eq!(view.errors.list.as_deref(), Some("HTTP 502 Bad Gateway"));
    }

    #[tokio::test]
    async fn test_size_change_resets_page() {
        let client = Arc::new(MockApiClient::new());
        client.on(HttpMethod::Get, LIST, Ok(json!({"content": [], "totalElements": 45})));
        let controller = controller(client.clone());

        assert!(controller.set_page(ZeroBasedPage(3)).await);
        assert_eq!(controller.query().page, ZeroBasedPage(3));
        assert!(controller.set_size(20).await);
        assert_eq!(controller.query().page, ZeroBasedPage::FIRST);
        assert_eq!(controller.snapshot().total_pages, 3);

        // 没有变化时不发请求
        assert!(!controller.set_size(20).await);
        assert!(!controller.set_status(Some("ALL".to_string())).await);
        assert_eq!(client.calls_to(HttpMethod::Get, LIST).len(), 2);

        controller.set_size(1000).await;
        assert_eq!(controller.query().size, 100);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let client = Arc::new(MockApiClient::new());
        client.on_delayed(
            HttpMethod::Get,
            LIST,
            Ok(json!({"content": [{"id": 1}], "totalElements": 1})),
            Duration::from_millis(80),
        );
        client.on(
            HttpMethod::Get,
            LIST,
            Ok(json!({"content": [{"id": 2}, {"id": 3}], "totalElements": 2})),
        );
        let controller = controller(client);

        let (first, second) = tokio::join!(controller.reload_list(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            controller.set_keyword("王").await
        });
        assert!(!first);
        assert!(second);

        let view = controller.snapshot();
        assert_eq!(
            view.rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![Some(2), Some(3)]
        );
        assert_eq!(view.total, 2);
    }

    #[tokio::test]
    async fn test_sort_round_trips_as_param() {
        let client = Arc::new(MockApiClient::new());
        client.on(HttpMethod::Get, LIST, Ok(json!([])));
        let controller = controller(client.clone());

        let sort = SortSpec::parse("overallScore,asc").unwrap();
        assert!(controller.set_sort(sort).await);
        let calls = client.calls_to(HttpMethod::Get, LIST);
        assert!(
            calls[0]
                .query
                .contains(&("sort".to_string(), "overallScore,asc".to_string()))
        );
    }
}
