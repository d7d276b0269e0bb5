use super::score::{compute_scores, format_fraction, format_score, part_score, percent_of};
use crate::models::evaluations::responses::{RubricPartView, ScoreProgress};
use crate::models::evaluations::{Evaluation, EvaluationViewModel, RubricPart, RubricScores};

/// 总分满分
pub const TOTAL_CAP: f64 = 10.0;

/// 只读模式的展示数据：按两部分分组的进度条、小计与总分
pub fn build_view(evaluation: &Evaluation) -> EvaluationViewModel {
    let breakdown = compute_scores(&evaluation.scores);

    EvaluationViewModel {
        evaluation_id: evaluation.id,
        student_name: evaluation.student().and_then(|s| s.display_name()),
        company_name: evaluation.company().and_then(|c| c.company_name.clone()),
        parts: RubricPart::ALL
            .into_iter()
            .map(|part| part_view(&evaluation.scores, part))
            .collect(),
        breakdown,
        total_display: format_fraction(breakdown.total_score, TOTAL_CAP),
        comments: evaluation.comments.clone(),
        is_final_evaluation: evaluation.is_final_evaluation,
        evaluation_date: evaluation.evaluation_date,
    }
}

fn part_view(scores: &RubricScores, part: RubricPart) -> RubricPartView {
    let score = part_score(scores, part);
    let cap = part.cap();
    RubricPartView {
        part,
        label: part.label().to_string(),
        score,
        cap,
        display: format_fraction(score, cap),
        items: part
            .fields()
            .iter()
            .map(|field| {
                let value = scores.get(*field);
                ScoreProgress {
                    field: *field,
                    label: field.label().to_string(),
                    value,
                    cap: field.cap(),
                    percent: percent_of(value, field.cap()),
                    display: format_score(value),
                }
            })
            .collect(),
    }
}
