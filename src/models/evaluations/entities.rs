use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use super::rubric::RubricScores;
use crate::models::common::dates::deserialize_optional_date;
use crate::models::common::lenient::{
    deserialize_flag, deserialize_optional_id, deserialize_optional_number,
};

// 评价者类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub enum EvaluatorType {
    Teacher, // 指导教师
    Mentor,  // 企业导师
    #[serde(rename = "SELF")]
    SelfReview, // 学生自评
    Admin,   // 管理员
}

impl EvaluatorType {
    pub const TEACHER: &'static str = "TEACHER";
    pub const MENTOR: &'static str = "MENTOR";
    pub const SELF: &'static str = "SELF";
    pub const ADMIN: &'static str = "ADMIN";
}

impl<'de> Deserialize<'de> for EvaluatorType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

fn deserialize_optional_evaluator_type<'de, D>(
    deserializer: D,
) -> Result<Option<EvaluatorType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok()))
}

impl std::str::FromStr for EvaluatorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            EvaluatorType::TEACHER => Ok(EvaluatorType::Teacher),
            EvaluatorType::MENTOR => Ok(EvaluatorType::Mentor),
            EvaluatorType::SELF => Ok(EvaluatorType::SelfReview),
            EvaluatorType::ADMIN => Ok(EvaluatorType::Admin),
            _ => Err(format!(
                "无效的评价者类型: '{s}'. 支持的类型: TEACHER, MENTOR, SELF, ADMIN"
            )),
        }
    }
}

impl fmt::Display for EvaluatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluatorType::Teacher => write!(f, "{}", EvaluatorType::TEACHER),
            EvaluatorType::Mentor => write!(f, "{}", EvaluatorType::MENTOR),
            EvaluatorType::SelfReview => write!(f, "{}", EvaluatorType::SELF),
            EvaluatorType::Admin => write!(f, "{}", EvaluatorType::ADMIN),
        }
    }
}

/// 可以发起评价并拥有评价列表的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub enum EvaluatorRole {
    Teacher,
    Mentor,
}

impl EvaluatorRole {
    /// 接口路径中的角色段
    pub fn path_segment(self) -> &'static str {
        match self {
            EvaluatorRole::Teacher => "teacher",
            EvaluatorRole::Mentor => "mentor",
        }
    }

    /// 角色档案查询的资源名
    pub fn profile_resource(self) -> &'static str {
        match self {
            EvaluatorRole::Teacher => "teachers",
            EvaluatorRole::Mentor => "mentors",
        }
    }

    pub fn evaluator_type(self) -> EvaluatorType {
        match self {
            EvaluatorRole::Teacher => EvaluatorType::Teacher,
            EvaluatorRole::Mentor => EvaluatorType::Mentor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EvaluatorRole::Teacher => "指导教师",
            EvaluatorRole::Mentor => "企业导师",
        }
    }
}

impl fmt::Display for EvaluatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// 已解析出的评价者身份（教师 ID 或导师 ID，而非用户 ID）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluatorRef {
    pub role: EvaluatorRole,
    pub id: i64,
}

impl EvaluatorRef {
    pub fn teacher(id: i64) -> Self {
        Self {
            role: EvaluatorRole::Teacher,
            id,
        }
    }

    pub fn mentor(id: i64) -> Self {
        Self {
            role: EvaluatorRole::Mentor,
            id,
        }
    }
}

// 用户基本信息（嵌套在学生、教师、导师中）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct PersonUser {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// 学生
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct StudentRef {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub student_code: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub user: Option<PersonUser>,
}

impl StudentRef {
    /// 优先使用关联用户的姓名
    pub fn display_name(&self) -> Option<String> {
        self.user
            .as_ref()
            .and_then(|u| u.full_name.clone())
            .or_else(|| self.full_name.clone())
    }
}

// 实习单位
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct CompanyRef {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<i64>,
    #[serde(default, alias = "name")]
    pub company_name: Option<String>,
}

// 评价者（教师或导师）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct PersonRef {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub user: Option<PersonUser>,
}

impl PersonRef {
    pub fn display_name(&self) -> Option<String> {
        self.user
            .as_ref()
            .and_then(|u| u.full_name.clone())
            .or_else(|| self.full_name.clone())
    }
}

// 实习（关联一名学生与一家单位）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct InternshipRef {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub academic_year: Option<String>,
    #[serde(default)]
    pub student: Option<StudentRef>,
    #[serde(default)]
    pub company: Option<CompanyRef>,
}

/// 一次实习评价
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct Evaluation {
    // 服务端分配的 ID，未保存前为空
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<i64>,
    // 关联的实习
    #[serde(default)]
    pub internship: Option<InternshipRef>,
    // 部分接口只返回扁平的 ID
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub internship_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub teacher: Option<PersonRef>,
    #[serde(default)]
    pub mentor: Option<PersonRef>,
    // 无法识别的类型按缺失处理
    #[serde(default, deserialize_with = "deserialize_optional_evaluator_type")]
    pub evaluator_type: Option<EvaluatorType>,
    // 九项评分
    #[serde(flatten)]
    #[ts(flatten)]
    pub scores: RubricScores,
    // 服务端给出的汇总分，可能缺失
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub discipline_score: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub professional_score: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub overall_score: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_number")]
    pub total_score: Option<f64>,
    // 评语
    #[serde(default)]
    pub comments: Option<String>,
    // 是否为期末（最终）评价
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_final_evaluation: bool,
    #[serde(default, alias = "date", deserialize_with = "deserialize_optional_date")]
    pub evaluation_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Evaluation {
    /// 被评价的实习 ID：优先取嵌套关系
    pub fn resolved_internship_id(&self) -> Option<i64> {
        self.internship
            .as_ref()
            .and_then(|i| i.id)
            .or(self.internship_id)
    }

    /// 被评价的学生 ID：优先取嵌套关系
    pub fn resolved_student_id(&self) -> Option<i64> {
        self.internship
            .as_ref()
            .and_then(|i| i.student.as_ref())
            .and_then(|s| s.id)
            .or(self.student_id)
    }

    pub fn student(&self) -> Option<&StudentRef> {
        self.internship.as_ref().and_then(|i| i.student.as_ref())
    }

    pub fn company(&self) -> Option<&CompanyRef> {
        self.internship.as_ref().and_then(|i| i.company.as_ref())
    }

    /// 评价者姓名（教师优先）
    pub fn evaluator_name(&self) -> Option<String> {
        self.teacher
            .as_ref()
            .and_then(PersonRef::display_name)
            .or_else(|| self.mentor.as_ref().and_then(PersonRef::display_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_evaluator_type_parse() {
        assert_eq!("teacher".parse::<EvaluatorType>(), Ok(EvaluatorType::Teacher));
        assert_eq!("SELF".parse::<EvaluatorType>(), Ok(EvaluatorType::SelfReview));
        assert!("robot".parse::<EvaluatorType>().is_err());
        assert_eq!(
            serde_json::to_value(EvaluatorType::SelfReview).unwrap(),
            json!("SELF")
        );
    }

    #[test]
    fn test_evaluation_deserializes_nested_relations() {
        let evaluation: Evaluation = serde_json::from_value(json!({
            "id": 12,
            "internship": {
                "id": 55,
                "student": {"id": 3, "user": {"fullName": "李雷"}},
                "company": {"id": 9, "name": "示例科技"}
            },
            "workEnthusiasm": 0.8,
            "overallScore": 8.5,
            "isFinalEvaluation": true,
            "date": "2025-06-01T10:00:00"
        }))
        .unwrap();

        assert_eq!(evaluation.id, Some(12));
        assert_eq!(evaluation.resolved_internship_id(), Some(55));
        assert_eq!(evaluation.resolved_student_id(), Some(3));
        assert_eq!(
            evaluation.student().and_then(StudentRef::display_name),
            Some("李雷".to_string())
        );
        assert_eq!(
            evaluation.company().and_then(|c| c.company_name.clone()),
            Some("示例科技".to_string())
        );
        assert_eq!(evaluation.scores.work_enthusiasm, 0.8);
        assert!(evaluation.is_final_evaluation);
        assert_eq!(evaluation.evaluation_date, NaiveDate::from_ymd_opt(2025, 6, 1));
    }

    #[test]
    fn test_flat_ids_are_used_when_relations_missing() {
        let evaluation: Evaluation =
            serde_json::from_value(json!({"internshipId": 7, "studentId": 4})).unwrap();
        assert_eq!(evaluation.resolved_internship_id(), Some(7));
        assert_eq!(evaluation.resolved_student_id(), Some(4));
    }

    #[test]
    fn test_irregular_values_fall_back_per_field() {
        let evaluation: Evaluation = serde_json::from_value(json!({
            "id": "15",
            "evaluatorType": "COMPANY",
            "isFinalEvaluation": null,
            "overallScore": "7.5",
            "disciplineScore": "n/a",
            "internship": {"id": "55", "student": {"id": "3"}}
        }))
        .unwrap();

        assert_eq!(evaluation.id, Some(15));
        assert_eq!(evaluation.evaluator_type, None);
        assert!(!evaluation.is_final_evaluation);
        assert_eq!(evaluation.overall_score, Some(7.5));
        assert_eq!(evaluation.discipline_score, None);
        assert_eq!(evaluation.resolved_internship_id(), Some(55));
        assert_eq!(evaluation.resolved_student_id(), Some(3));
    }
}
