use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::evaluations::RubricField;

static SORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.]*(,(?i:asc|desc))?$").expect("Invalid sort regex")
});

const KEYWORD_MAX_LEN: usize = 100;

pub fn validate_sort_param(sort: &str) -> Result<(), &'static str> {
    // 排序参数格式：field 或 field,asc|desc
    if !SORT_RE.is_match(sort.trim()) {
        return Err("Sort must look like `field` or `field,asc|desc`");
    }
    Ok(())
}

pub fn validate_keyword(keyword: &str) -> Result<(), &'static str> {
    // 关键字长度限制，避免拼出过长的查询串
    if keyword.chars().count() > KEYWORD_MAX_LEN {
        return Err("Keyword must be at most 100 characters");
    }
    Ok(())
}

/// 必填 ID 校验
pub fn validate_required_id(value: Option<i64>) -> Result<i64, &'static str> {
    match value {
        Some(id) if id > 0 => Ok(id),
        _ => Err("This field is required"),
    }
}

/// 单项评分范围校验：必须是 [0, cap] 内的有限数字
pub fn validate_score(field: RubricField, value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{} must be a number", field.key()));
    }
    if value < 0.0 || value > field.cap() {
        return Err(format!(
            "{} must be between 0 and {:.1}",
            field.key(),
            field.cap()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_sort_params() {
        assert!(validate_sort_param("evaluationDate,desc").is_ok());
        assert!(validate_sort_param("overallScore,ASC").is_ok());
        assert!(validate_sort_param("internship.student.id").is_ok());
    }

    #[test]
    fn test_invalid_sort_params() {
        assert!(validate_sort_param("").is_err());
        assert!(validate_sort_param(",desc").is_err());
        assert!(validate_sort_param("date,up").is_err());
        assert!(validate_sort_param("date desc").is_err());
    }

    #[test]
    fn test_required_id() {
        assert_eq!(validate_required_id(Some(3)), Ok(3));
        assert!(validate_required_id(None).is_err());
        assert!(validate_required_id(Some(0)).is_err());
    }

    #[test]
    fn test_score_bounds() {
        assert!(validate_score(RubricField::JobRequirementsFulfillment, 2.0).is_ok());
        assert!(validate_score(RubricField::LearningSpirit, 0.0).is_ok());
        assert!(validate_score(RubricField::LearningSpirit, 1.01).is_err());
        assert!(validate_score(RubricField::WorkEnthusiasm, -0.1).is_err());
        assert!(validate_score(RubricField::WorkEnthusiasm, f64::NAN).is_err());
    }

    #[test]
    fn test_keyword_length() {
        assert!(validate_keyword("李雷").is_ok());
        assert!(validate_keyword(&"x".repeat(101)).is_err());
    }
}
