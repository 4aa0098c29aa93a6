use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 评估口径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssessmentVariant {
    /// 岗位文档 / 岗位描述：分数需要重映射
    #[default]
    #[serde(rename = "role", alias = "role_document")]
    RoleDocument,
    /// 简历：直接使用原始分数
    #[serde(rename = "resume")]
    Resume,
}

impl AssessmentVariant {
    /// 是否对就绪度分数做重映射
    pub fn remaps_readiness(self) -> bool {
        matches!(self, AssessmentVariant::RoleDocument)
    }

    /// 允许上传的文档扩展名
    pub fn accepted_extensions(self) -> Vec<String> {
        match self {
            AssessmentVariant::RoleDocument => vec!["pdf".to_string()],
            AssessmentVariant::Resume => vec!["pdf".to_string(), "docx".to_string()],
        }
    }

    /// 摘录缺失时的占位文案
    pub fn excerpt_placeholder(self) -> &'static str {
        match self {
            AssessmentVariant::RoleDocument => "Role excerpt unavailable.",
            AssessmentVariant::Resume => "Resume excerpt unavailable.",
        }
    }

    /// 职责列表为空时的占位文案
    pub fn duty_placeholder(self) -> &'static str {
        match self {
            AssessmentVariant::RoleDocument => "Role duties summary unavailable.",
            AssessmentVariant::Resume => "Resume duties summary unavailable.",
        }
    }
}

impl FromStr for AssessmentVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "role" | "role_document" => Ok(AssessmentVariant::RoleDocument),
            "resume" => Ok(AssessmentVariant::Resume),
            other => Err(format!("未知的评估口径: {}", other)),
        }
    }
}

/// 就绪度分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadinessCategory {
    /// score >= 75
    ReadyForFullTransition,
    /// 50 < score < 75
    AiAssistedPartialTransition,
    /// score <= 50
    ProductivityImprovement,
}

impl ReadinessCategory {
    /// 根据（重映射后的）分数分类
    pub fn from_score(score: u8) -> Self {
        if score >= 75 {
            ReadinessCategory::ReadyForFullTransition
        } else if score > 50 {
            ReadinessCategory::AiAssistedPartialTransition
        } else {
            ReadinessCategory::ProductivityImprovement
        }
    }

    /// 展示文案
    pub fn label(self) -> &'static str {
        match self {
            ReadinessCategory::ReadyForFullTransition => "Ready for full transition",
            ReadinessCategory::AiAssistedPartialTransition => "AI-assisted partial transition",
            ReadinessCategory::ProductivityImprovement => "Productivity improvement, revisit later",
        }
    }

    /// 对应分类的调研方向指引
    pub fn research_guidance(self) -> &'static str {
        match self {
            ReadinessCategory::ReadyForFullTransition => {
                "Focus research on production-grade autonomous agents already handling this work: \
                 vendor case studies, reliability and error-rate benchmarks, governance and audit \
                 requirements, and the change-management steps needed to hand the role over end to end."
            }
            ReadinessCategory::AiAssistedPartialTransition => {
                "Focus research on copilot-style tooling for the automatable duties: which tasks \
                 current assistants complete reliably, where human review remains mandatory, and how \
                 comparable teams have split responsibilities between people and AI."
            }
            ReadinessCategory::ProductivityImprovement => {
                "Focus research on productivity aids rather than replacement: drafting, search and \
                 summarisation tools that speed up routine steps, plus the capability gaps that keep \
                 the core of this role human. Revisit once those gaps narrow."
            }
        }
    }
}

impl fmt::Display for ReadinessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for ReadinessCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// 标准化后的评估结果，所有字段始终有值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentResult {
    pub readiness_score: u8,
    pub readiness_category: ReadinessCategory,
    pub time_horizon: String,
    pub risk_score: u8,
    pub recommendation: String,
    pub reassessment_time: String,
    pub automatable_signals: BTreeMap<String, i64>,
    pub risk_signals: BTreeMap<String, i64>,
    pub duty_sample: Vec<String>,
    pub role_excerpt: String,
    pub research_insights: Vec<String>,
    pub research_guidance: String,
}

/// 把 snake_case 信号名转成可读短语
///
/// 全小写的标签转成首字母大写，其他只替换下划线。
pub fn humanize_signal(label: &str) -> String {
    let cleaned = label.replace('_', " ");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return String::new();
    }
    let is_lower = label.chars().any(|c| c.is_alphabetic())
        && !label.chars().any(|c| c.is_uppercase());
    if !is_lower {
        return cleaned.to_string();
    }
    cleaned
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_bands() {
        assert_eq!(
            ReadinessCategory::from_score(80),
            ReadinessCategory::ReadyForFullTransition
        );
        assert_eq!(
            ReadinessCategory::from_score(60),
            ReadinessCategory::AiAssistedPartialTransition
        );
        assert_eq!(
            ReadinessCategory::from_score(30),
            ReadinessCategory::ProductivityImprovement
        );
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(
            ReadinessCategory::from_score(75),
            ReadinessCategory::ReadyForFullTransition
        );
        assert_eq!(
            ReadinessCategory::from_score(74),
            ReadinessCategory::AiAssistedPartialTransition
        );
        assert_eq!(
            ReadinessCategory::from_score(51),
            ReadinessCategory::AiAssistedPartialTransition
        );
        assert_eq!(
            ReadinessCategory::from_score(50),
            ReadinessCategory::ProductivityImprovement
        );
        assert_eq!(
            ReadinessCategory::from_score(0),
            ReadinessCategory::ProductivityImprovement
        );
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&ReadinessCategory::ReadyForFullTransition).unwrap();
        assert_eq!(json, "\"Ready for full transition\"");
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!(
            "role".parse::<AssessmentVariant>().unwrap(),
            AssessmentVariant::RoleDocument
        );
        assert_eq!(
            " Resume ".parse::<AssessmentVariant>().unwrap(),
            AssessmentVariant::Resume
        );
        assert!("cv".parse::<AssessmentVariant>().is_err());
    }

    #[test]
    fn test_humanize_signal() {
        assert_eq!(humanize_signal("routine_coding_tasks"), "Routine Coding Tasks");
        assert_eq!(humanize_signal("ERP_data_entry"), "ERP data entry");
        assert_eq!(humanize_signal("__"), "");
        assert_eq!(humanize_signal("Already Readable"), "Already Readable");
    }
}
