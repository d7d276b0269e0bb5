//! 评价表单
//!
//! 同一个表单有三种互斥模式：
//! - `Create`：选择学生与实习后打分，九项默认 0；
//! - `Edit`：学生与实习锁定，只能修改评分、评语与元数据；
//! - `View`：完全只读，只能切换到编辑模式。
//!
//! 每次修改评分都会立即重算小计与总分。提交失败时表单保留已填写的内容。

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use super::EvaluationService;
use super::score::compute_scores;
use super::view::build_view;
use crate::errors::{PortalError, Result};
use crate::models::evaluations::{
    CompanyRef, Evaluation, EvaluationPayload, EvaluationViewModel, EvaluatorRef, InternshipRef,
    RubricField, RubricScores, ScoreBreakdown, StudentRef,
};
use crate::models::profiles::{InternshipOption, StudentOption};
use crate::utils::{validate_required_id, validate_score};

/// 提示：所有学生都已评价
pub const ALL_EVALUATED_NOTICE: &str = "名下学生均已完成评价，如需修改请打开已有评价进行更新";

/// 表单模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { evaluation_id: i64 },
    View,
}

/// 可能出现校验错误的表单字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Student,
    Internship,
    Score(RubricField),
}

impl FormField {
    pub fn key(self) -> &'static str {
        match self {
            FormField::Student => "studentId",
            FormField::Internship => "internshipId",
            FormField::Score(field) => field.key(),
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// 创建模式下由调用方提供的上下文
#[derive(Debug, Clone, Default)]
pub struct FormOptions {
    pub students: Vec<StudentOption>,
    // 已限定为当前评价者负责的实习
    pub internships: Vec<InternshipOption>,
    // 评价者名下学生都已有评价
    pub all_evaluated: bool,
    // 调用方明确指定的 (学生, 实习)
    pub preselected: Option<(i64, i64)>,
}

pub struct EvaluationForm {
    mode: FormMode,
    evaluator: EvaluatorRef,
    original: Option<Evaluation>,
    student_id: Option<i64>,
    internship_id: Option<i64>,
    scores: RubricScores,
    comments: String,
    is_final_evaluation: bool,
    evaluation_date: Option<NaiveDate>,
    breakdown: ScoreBreakdown,
    options: FormOptions,
    field_errors: BTreeMap<FormField, String>,
    submit_error: Option<String>,
}

impl EvaluationForm {
    /// 新建评价
    pub fn create(evaluator: EvaluatorRef, options: FormOptions) -> Self {
        let (student_id, internship_id) = match options.preselected {
            Some((student, internship)) => (Some(student), Some(internship)),
            None => (None, None),
        };
        Self {
            mode: FormMode::Create,
            evaluator,
            original: None,
            student_id,
            internship_id,
            scores: RubricScores::default(),
            comments: String::new(),
            is_final_evaluation: false,
            evaluation_date: None,
            breakdown: ScoreBreakdown::default(),
            options,
            field_errors: BTreeMap::new(),
            submit_error: None,
        }
    }

    /// 编辑已有评价，评价必须已有 ID
    pub fn edit(evaluator: EvaluatorRef, evaluation: Evaluation) -> Result<Self> {
        let evaluation_id = evaluation
            .id
            .ok_or_else(|| PortalError::invalid_state("评价尚未保存，无法编辑"))?;
        let mut form = Self::from_existing(evaluator, evaluation);
        form.mode = FormMode::Edit { evaluation_id };
        Ok(form)
    }

    /// 只读查看
    pub fn view(evaluator: EvaluatorRef, evaluation: Evaluation) -> Self {
        let mut form = Self::from_existing(evaluator, evaluation);
        form.mode = FormMode::View;
        form
    }

    fn from_existing(evaluator: EvaluatorRef, evaluation: Evaluation) -> Self {
        let scores = evaluation.scores.clone();
        Self {
            mode: FormMode::View,
            evaluator,
            student_id: evaluation.resolved_student_id(),
            internship_id: evaluation.resolved_internship_id(),
            breakdown: compute_scores(&scores),
            scores,
            comments: evaluation.comments.clone().unwrap_or_default(),
            is_final_evaluation: evaluation.is_final_evaluation,
            evaluation_date: evaluation.evaluation_date,
            options: FormOptions::default(),
            field_errors: BTreeMap::new(),
            submit_error: None,
            original: Some(evaluation),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn evaluator(&self) -> EvaluatorRef {
        self.evaluator
    }

    pub fn student_id(&self) -> Option<i64> {
        self.student_id
    }

    pub fn internship_id(&self) -> Option<i64> {
        self.internship_id
    }

    pub fn scores(&self) -> &RubricScores {
        &self.scores
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    pub fn is_final_evaluation(&self) -> bool {
        self.is_final_evaluation
    }

    /// 当前的实时小计与总分
    pub fn breakdown(&self) -> ScoreBreakdown {
        self.breakdown
    }

    pub fn field_errors(&self) -> &BTreeMap<FormField, String> {
        &self.field_errors
    }

    pub fn field_error(&self, field: FormField) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    /// 表单级错误（网络或服务端错误）
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn dismiss_submit_error(&mut self) {
        self.submit_error = None;
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == FormMode::View
    }

    /// 学生与实习选择器是否禁用
    pub fn is_selection_locked(&self) -> bool {
        match self.mode {
            // 全部已评价时只能提交调用方指定的对象
            FormMode::Create => self.options.all_evaluated && self.options.preselected.is_some(),
            _ => true,
        }
    }

    /// 创建模式下所有学生都已评价时显示的提示
    pub fn notice(&self) -> Option<&'static str> {
        (self.mode == FormMode::Create && self.options.all_evaluated)
            .then_some(ALL_EVALUATED_NOTICE)
    }

    /// 是否允许提交
    pub fn can_submit(&self) -> bool {
        match self.mode {
            FormMode::View => false,
            FormMode::Edit { .. } => true,
            // 全部已评价时只有调用方预先指定了对象才允许提交
            FormMode::Create => match self.options.preselected {
                _ if !self.options.all_evaluated => true,
                Some((student, internship)) => {
                    self.student_id == Some(student) && self.internship_id == Some(internship)
                }
                None => false,
            },
        }
    }

    pub fn student_options(&self) -> &[StudentOption] {
        &self.options.students
    }

    /// 可选的实习；选中学生后只保留该学生的实习
    pub fn internship_options(&self) -> Vec<&InternshipOption> {
        self.options
            .internships
            .iter()
            .filter(|i| match (self.student_id, i.student_id) {
                (Some(selected), Some(owner)) => selected == owner,
                _ => true,
            })
            .collect()
    }

    /// 选择学生，仅创建模式生效
    pub fn select_student(&mut self, student_id: Option<i64>) -> bool {
        if self.is_selection_locked() {
            debug!("Ignoring student change in {:?} mode", self.mode);
            return false;
        }
        self.student_id = student_id;
        self.field_errors.remove(&FormField::Student);

        // 已选实习不属于新学生时清空
        let belongs = self.internship_id.is_none_or(|id| {
            self.options
                .internships
                .iter()
                .find(|i| i.id == id)
                .and_then(|i| i.student_id)
                .is_none_or(|owner| Some(owner) == student_id)
        });
        if !belongs {
            self.internship_id = None;
        }
        true
    }

    /// 选择实习，仅创建模式生效；实习带有学生信息时同步学生
    pub fn select_internship(&mut self, internship_id: Option<i64>) -> bool {
        if self.is_selection_locked() {
            debug!("Ignoring internship change in {:?} mode", self.mode);
            return false;
        }
        self.internship_id = internship_id;
        self.field_errors.remove(&FormField::Internship);

        let owner = internship_id.and_then(|id| {
            self.options
                .internships
                .iter()
                .find(|i| i.id == id)
                .and_then(|i| i.student_id)
        });
        if let Some(owner) = owner {
            self.student_id = Some(owner);
            self.field_errors.remove(&FormField::Student);
        }
        true
    }

    /// 修改一项评分并返回重算后的小计，原值照存，不做截断
    pub fn set_score(&mut self, field: RubricField, value: f64) -> Result<ScoreBreakdown> {
        self.ensure_editable()?;
        self.scores.set(field, value);
        self.field_errors.remove(&FormField::Score(field));
        self.breakdown = compute_scores(&self.scores);
        Ok(self.breakdown)
    }

    /// 以文本形式修改评分，空串或非数字按 0 处理
    pub fn set_score_input(&mut self, field: RubricField, raw: &str) -> Result<ScoreBreakdown> {
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        self.set_score(field, value)
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) -> Result<()> {
        self.ensure_editable()?;
        self.comments = comments.into();
        Ok(())
    }

    pub fn set_final_evaluation(&mut self, is_final: bool) -> Result<()> {
        self.ensure_editable()?;
        self.is_final_evaluation = is_final;
        Ok(())
    }

    pub fn set_evaluation_date(&mut self, date: Option<NaiveDate>) -> Result<()> {
        self.ensure_editable()?;
        self.evaluation_date = date;
        Ok(())
    }

    /// 只读模式切换为编辑模式，是否允许由调用方根据角色判断
    pub fn enter_edit_mode(&mut self) -> Result<()> {
        if self.mode != FormMode::View {
            return Err(PortalError::invalid_state("只有查看模式可以切换为编辑"));
        }
        let evaluation_id = self
            .original
            .as_ref()
            .and_then(|e| e.id)
            .ok_or_else(|| PortalError::invalid_state("评价尚未保存，无法编辑"))?;
        self.mode = FormMode::Edit { evaluation_id };
        Ok(())
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.is_read_only() {
            return Err(PortalError::invalid_state("查看模式下不能修改评价"));
        }
        Ok(())
    }

    /// 校验并生成请求体；失败时按字段记录错误
    pub fn validate(&mut self) -> Result<EvaluationPayload> {
        self.field_errors.clear();

        if self.mode == FormMode::Create {
            if let Err(msg) = validate_required_id(self.student_id) {
                self.field_errors.insert(FormField::Student, msg.to_string());
            }
        }
        let internship_id = match validate_required_id(self.internship_id) {
            Ok(id) => Some(id),
            Err(msg) => {
                self.field_errors
                    .insert(FormField::Internship, msg.to_string());
                None
            }
        };
        for (field, value) in self.scores.iter() {
            if let Err(msg) = validate_score(field, value) {
                self.field_errors.insert(FormField::Score(field), msg);
            }
        }

        match internship_id {
            Some(internship_id) if self.field_errors.is_empty() => {
                let mut payload = EvaluationPayload::new(
                    self.evaluator,
                    self.student_id,
                    internship_id,
                    self.scores.clone(),
                );
                payload.comments = self.comments.trim().to_string();
                payload.is_final_evaluation = self.is_final_evaluation;
                payload.evaluation_date = self.evaluation_date;
                Ok(payload)
            }
            _ => {
                let summary = self
                    .field_errors
                    .iter()
                    .map(|(field, msg)| format!("{field}: {msg}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(PortalError::validation(summary))
            }
        }
    }

    /// 提交：校验通过后发起一次创建或更新请求，不自动重试
    pub async fn submit(&mut self, service: &EvaluationService) -> Result<Evaluation> {
        if !self.can_submit() {
            let reason = match self.mode {
                FormMode::View => "查看模式下不能提交",
                _ => ALL_EVALUATED_NOTICE,
            };
            return Err(PortalError::invalid_state(reason));
        }

        self.submit_error = None;
        let payload = self.validate()?;

        let result = match self.mode {
            FormMode::Edit { evaluation_id } => {
                service.update_evaluation(evaluation_id, &payload).await
            }
            _ => service.create_evaluation(&payload).await,
        };

        match result {
            Ok(saved) => {
                // 创建成功后转为编辑该评价，避免重复创建
                if let (FormMode::Create, Some(id)) = (self.mode, saved.id) {
                    self.mode = FormMode::Edit { evaluation_id: id };
                }
                self.original = Some(saved.clone());
                Ok(saved)
            }
            Err(e) => {
                warn!("Evaluation submission failed: {}", e);
                self.submit_error = Some(e.message().to_string());
                Err(e)
            }
        }
    }

    /// 以当前表单内容构造展示数据
    pub fn view_model(&self) -> EvaluationViewModel {
        build_view(&self.snapshot())
    }

    fn snapshot(&self) -> Evaluation {
        let mut evaluation = self.original.clone().unwrap_or_default();
        if evaluation.internship.is_none() {
            evaluation.internship = self.internship_ref();
        }
        evaluation.internship_id = self.internship_id;
        evaluation.student_id = self.student_id;
        evaluation.scores = self.scores.clone();
        evaluation.comments = Some(self.comments.clone()).filter(|c| !c.is_empty());
        evaluation.is_final_evaluation = self.is_final_evaluation;
        evaluation.evaluation_date = self.evaluation_date;
        evaluation
    }

    fn internship_ref(&self) -> Option<InternshipRef> {
        let option = self
            .options
            .internships
            .iter()
            .find(|i| Some(i.id) == self.internship_id)?;
        Some(InternshipRef {
            id: Some(option.id),
            title: option.title.clone(),
            student: Some(StudentRef {
                id: option.student_id,
                full_name: option.student_name.clone(),
                ..StudentRef::default()
            }),
            company: option.company_name.clone().map(|name| CompanyRef {
                id: None,
                company_name: Some(name),
            }),
            ..InternshipRef::default()
        })
    }
}
