use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::evaluations::EvaluatorRole;

// 用户角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub enum UserRole {
    Admin,   // 管理员
    Teacher, // 指导教师
    Mentor,  // 企业导师
    Student, // 学生
}

impl UserRole {
    pub const ADMIN: &'static str = "ADMIN";
    pub const TEACHER: &'static str = "TEACHER";
    pub const MENTOR: &'static str = "MENTOR";
    pub const STUDENT: &'static str = "STUDENT";

    /// 能够拥有评价列表的角色
    pub fn evaluator_role(self) -> Option<EvaluatorRole> {
        match self {
            UserRole::Teacher => Some(EvaluatorRole::Teacher),
            UserRole::Mentor => Some(EvaluatorRole::Mentor),
            UserRole::Admin | UserRole::Student => None,
        }
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", UserRole::ADMIN),
            UserRole::Teacher => write!(f, "{}", UserRole::TEACHER),
            UserRole::Mentor => write!(f, "{}", UserRole::MENTOR),
            UserRole::Student => write!(f, "{}", UserRole::STUDENT),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    // 后端可能带 Spring Security 的 ROLE_ 前缀
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(&upper) {
            UserRole::ADMIN => Ok(UserRole::Admin),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::MENTOR => Ok(UserRole::Mentor),
            UserRole::STUDENT => Ok(UserRole::Student),
            _ => Err(format!(
                "无效的用户角色: '{s}'. 支持的角色: ADMIN, TEACHER, MENTOR, STUDENT"
            )),
        }
    }
}

/// 当前登录用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct CurrentUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}
