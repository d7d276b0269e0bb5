pub mod entities;
pub mod requests;
pub mod responses;
pub mod rubric;

pub use entities::{
    CompanyRef, Evaluation, EvaluatorRef, EvaluatorRole, EvaluatorType, InternshipRef, PersonRef,
    PersonUser, StudentRef,
};
pub use requests::{EvaluationListQuery, EvaluationPayload};
pub use responses::{
    EvaluationListView, EvaluationRow, EvaluationStatistics, EvaluationViewModel, ScoreBreakdown,
};
pub use rubric::{RubricField, RubricPart, RubricScores};
