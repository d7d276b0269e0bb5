use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::evaluations::{InternshipRef, PersonUser, StudentRef};

/// 教师或导师档案（由用户 ID 查询得到）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/profile.ts")]
pub struct EvaluatorProfile {
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub user: Option<PersonUser>,
    // 教师所属院系
    #[serde(default)]
    pub department: Option<String>,
    // 导师所在单位
    #[serde(default)]
    pub position: Option<String>,
}

impl EvaluatorProfile {
    pub fn display_name(&self) -> Option<String> {
        self.user
            .as_ref()
            .and_then(|u| u.full_name.clone())
            .or_else(|| self.full_name.clone())
    }
}

/// 创建评价时的学生下拉选项
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/profile.ts")]
pub struct StudentOption {
    pub id: i64,
    pub student_code: Option<String>,
    pub name: Option<String>,
}

impl StudentOption {
    /// 没有 ID 的记录无法被选择，直接丢弃
    pub fn from_student(student: &StudentRef) -> Option<Self> {
        Some(Self {
            id: student.id?,
            student_code: student.student_code.clone(),
            name: student.display_name(),
        })
    }
}

/// 创建评价时的实习下拉选项（已限定为当前评价者负责的实习）
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/profile.ts")]
pub struct InternshipOption {
    pub id: i64,
    pub student_id: Option<i64>,
    pub student_name: Option<String>,
    pub company_name: Option<String>,
    pub title: Option<String>,
}

impl InternshipOption {
    pub fn from_internship(internship: &InternshipRef) -> Option<Self> {
        Some(Self {
            id: internship.id?,
            student_id: internship.student.as_ref().and_then(|s| s.id),
            student_name: internship
                .student
                .as_ref()
                .and_then(StudentRef::display_name),
            company_name: internship
                .company
                .as_ref()
                .and_then(|c| c.company_name.clone()),
            title: internship.title.clone(),
        })
    }
}
