use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use ts_rs::TS;

use crate::models::common::lenient::lenient_number;

// 实习评价量表
//
// 第一部分（纪律与态度）六项，每项满分 1.0，合计 6.0；
// 第二部分（专业能力）三项，满分分别为 2.0 / 1.0 / 1.0，合计 4.0。

/// 量表的两个部分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub enum RubricPart {
    Discipline,   // 第一部分：纪律与态度
    Professional, // 第二部分：专业能力
}

impl RubricPart {
    pub const ALL: [RubricPart; 2] = [RubricPart::Discipline, RubricPart::Professional];

    pub fn label(self) -> &'static str {
        match self {
            RubricPart::Discipline => "纪律与工作态度",
            RubricPart::Professional => "专业能力",
        }
    }

    /// 该部分的满分
    pub fn cap(self) -> f64 {
        self.fields().iter().map(|f| f.cap()).sum()
    }

    pub fn fields(self) -> &'static [RubricField] {
        match self {
            RubricPart::Discipline => &RubricField::DISCIPLINE,
            RubricPart::Professional => &RubricField::PROFESSIONAL,
        }
    }
}

/// 量表评分项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub enum RubricField {
    UnderstandingOrganization,
    FollowingRules,
    WorkScheduleCompliance,
    CommunicationAttitude,
    PropertyProtection,
    WorkEnthusiasm,
    JobRequirementsFulfillment,
    LearningSpirit,
    InitiativeCreativity,
}

impl RubricField {
    pub const DISCIPLINE: [RubricField; 6] = [
        RubricField::UnderstandingOrganization,
        RubricField::FollowingRules,
        RubricField::WorkScheduleCompliance,
        RubricField::CommunicationAttitude,
        RubricField::PropertyProtection,
        RubricField::WorkEnthusiasm,
    ];

    pub const PROFESSIONAL: [RubricField; 3] = [
        RubricField::JobRequirementsFulfillment,
        RubricField::LearningSpirit,
        RubricField::InitiativeCreativity,
    ];

    pub const ALL: [RubricField; 9] = [
        RubricField::UnderstandingOrganization,
        RubricField::FollowingRules,
        RubricField::WorkScheduleCompliance,
        RubricField::CommunicationAttitude,
        RubricField::PropertyProtection,
        RubricField::WorkEnthusiasm,
        RubricField::JobRequirementsFulfillment,
        RubricField::LearningSpirit,
        RubricField::InitiativeCreativity,
    ];

    /// 接口中使用的字段名
    pub fn key(self) -> &'static str {
        match self {
            RubricField::UnderstandingOrganization => "understandingOrganization",
            RubricField::FollowingRules => "followingRules",
            RubricField::WorkScheduleCompliance => "workScheduleCompliance",
            RubricField::CommunicationAttitude => "communicationAttitude",
            RubricField::PropertyProtection => "propertyProtection",
            RubricField::WorkEnthusiasm => "workEnthusiasm",
            RubricField::JobRequirementsFulfillment => "jobRequirementsFulfillment",
            RubricField::LearningSpirit => "learningSpirit",
            RubricField::InitiativeCreativity => "initiativeCreativity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RubricField::UnderstandingOrganization => "了解实习单位的组织结构",
            RubricField::FollowingRules => "遵守单位规章制度",
            RubricField::WorkScheduleCompliance => "遵守工作时间安排",
            RubricField::CommunicationAttitude => "沟通与待人态度",
            RubricField::PropertyProtection => "爱护公共财物",
            RubricField::WorkEnthusiasm => "工作热情",
            RubricField::JobRequirementsFulfillment => "完成岗位要求",
            RubricField::LearningSpirit => "学习与钻研精神",
            RubricField::InitiativeCreativity => "主动性与创造性",
        }
    }

    /// 单项满分
    pub fn cap(self) -> f64 {
        match self {
            RubricField::JobRequirementsFulfillment => 2.0,
            _ => 1.0,
        }
    }

    pub fn part(self) -> RubricPart {
        if Self::DISCIPLINE.contains(&self) {
            RubricPart::Discipline
        } else {
            RubricPart::Professional
        }
    }

    /// 输入控件使用：把数值限制在 [0, cap]
    pub fn clamp(self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        value.clamp(0.0, self.cap())
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for RubricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(lenient_number).unwrap_or(0.0))
}

/// 九项评分原始值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct RubricScores {
    #[serde(default, deserialize_with = "deserialize_score")]
    pub understanding_organization: f64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub following_rules: f64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub work_schedule_compliance: f64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub communication_attitude: f64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub property_protection: f64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub work_enthusiasm: f64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub job_requirements_fulfillment: f64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub learning_spirit: f64,
    #[serde(default, deserialize_with = "deserialize_score")]
    pub initiative_creativity: f64,
}

impl RubricScores {
    pub fn get(&self, field: RubricField) -> f64 {
        match field {
            RubricField::UnderstandingOrganization => self.understanding_organization,
            RubricField::FollowingRules => self.following_rules,
            RubricField::WorkScheduleCompliance => self.work_schedule_compliance,
            RubricField::CommunicationAttitude => self.communication_attitude,
            RubricField::PropertyProtection => self.property_protection,
            RubricField::WorkEnthusiasm => self.work_enthusiasm,
            RubricField::JobRequirementsFulfillment => self.job_requirements_fulfillment,
            RubricField::LearningSpirit => self.learning_spirit,
            RubricField::InitiativeCreativity => self.initiative_creativity,
        }
    }

    pub fn set(&mut self, field: RubricField, value: f64) {
        let slot = match field {
            RubricField::UnderstandingOrganization => &mut self.understanding_organization,
            RubricField::FollowingRules => &mut self.following_rules,
            RubricField::WorkScheduleCompliance => &mut self.work_schedule_compliance,
            RubricField::CommunicationAttitude => &mut self.communication_attitude,
            RubricField::PropertyProtection => &mut self.property_protection,
            RubricField::WorkEnthusiasm => &mut self.work_enthusiasm,
            RubricField::JobRequirementsFulfillment => &mut self.job_requirements_fulfillment,
            RubricField::LearningSpirit => &mut self.learning_spirit,
            RubricField::InitiativeCreativity => &mut self.initiative_creativity,
        };
        *slot = value;
    }

    /// 从任意 JSON 对象中读取九项评分，缺失或非数字的项记为 0
    pub fn from_value(value: &Value) -> Self {
        let mut scores = Self::default();
        for field in RubricField::ALL {
            let raw = value.get(field.key()).and_then(lenient_number);
            scores.set(field, raw.unwrap_or(0.0));
        }
        scores
    }

    /// 按量表顺序给出 (字段, 分值)
    pub fn iter(&self) -> impl Iterator<Item = (RubricField, f64)> + '_ {
        RubricField::ALL.into_iter().map(|f| (f, self.get(f)))
    }
}
