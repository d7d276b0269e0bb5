use super::ProfileService;
use crate::errors::Result;
use crate::models::evaluations::{EvaluatorRef, InternshipRef, StudentRef};
use crate::models::profiles::{InternshipOption, StudentOption};
use crate::utils::normalize_as;

/// GET /students/{role}/{id}
pub async fn list_students(
    service: &ProfileService,
    evaluator: EvaluatorRef,
) -> Result<Vec<StudentOption>> {
    let path = format!("/students/{}/{}", evaluator.role.path_segment(), evaluator.id);
    let body = service.client().get(&path, &[]).await?;
    Ok(normalize_as::<StudentRef>(&body)
        .list
        .iter()
        .filter_map(StudentOption::from_student)
        .collect())
}

/// GET /internships/{role}/{id}
pub async fn list_internships(
    service: &ProfileService,
    evaluator: EvaluatorRef,
) -> Result<Vec<InternshipOption>> {
    let path = format!(
        "/internships/{}/{}",
        evaluator.role.path_segment(),
        evaluator.id
    );
    let body = service.client().get(&path, &[]).await?;
    Ok(normalize_as::<InternshipRef>(&body)
        .list
        .iter()
        .filter_map(InternshipOption::from_internship)
        .collect())
}
