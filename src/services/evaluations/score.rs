//! 评分计算
//!
//! 纯函数：由九项原始分得到两部分小计与总分。不做截断，越界校验由调用方负责；
//! 展示层统一保留一位小数。

use serde_json::Value;

use crate::models::evaluations::{
    Evaluation, RubricField, RubricPart, RubricScores, ScoreBreakdown,
};

/// 由九项评分计算小计与总分
pub fn compute_scores(scores: &RubricScores) -> ScoreBreakdown {
    let discipline_score = part_score(scores, RubricPart::Discipline);
    let professional_score = part_score(scores, RubricPart::Professional);
    ScoreBreakdown {
        discipline_score,
        professional_score,
        total_score: discipline_score + professional_score,
    }
}

/// 直接从原始 JSON 计算，缺失或非数字的项按 0 处理
pub fn compute_from_value(value: &Value) -> ScoreBreakdown {
    compute_scores(&RubricScores::from_value(value))
}

/// 某一部分的小计
pub fn part_score(scores: &RubricScores, part: RubricPart) -> f64 {
    part.fields().iter().map(|f| scores.get(*f)).sum()
}

/// 列表展示使用的总分：优先服务端给出的 overallScore / totalScore，否则本地重算
pub fn resolve_total(evaluation: &Evaluation) -> f64 {
    evaluation
        .overall_score
        .or(evaluation.total_score)
        .unwrap_or_else(|| compute_scores(&evaluation.scores).total_score)
}

/// 列表展示使用的分项小计，规则同总分
pub fn resolve_breakdown(evaluation: &Evaluation) -> ScoreBreakdown {
    let computed = compute_scores(&evaluation.scores);
    ScoreBreakdown {
        discipline_score: evaluation
            .discipline_score
            .unwrap_or(computed.discipline_score),
        professional_score: evaluation
            .professional_score
            .unwrap_or(computed.professional_score),
        total_score: resolve_total(evaluation),
    }
}

/// 保留一位小数
pub fn format_score(value: f64) -> String {
    format!("{value:.1}")
}

/// `value/cap` 形式
pub fn format_fraction(value: f64, cap: f64) -> String {
    format!("{}/{}", format_score(value), format_score(cap))
}

/// 进度百分比，限制在 [0, 100]
pub fn percent_of(value: f64, cap: f64) -> f64 {
    if cap <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    (value / cap * 100.0).clamp(0.0, 100.0)
}

/// 全部评分项取满分
pub fn max_scores() -> RubricScores {
    let mut scores = RubricScores::default();
    for field in RubricField::ALL {
        scores.set(field, field.cap());
    }
    scores
}
