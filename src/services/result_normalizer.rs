//! 结果标准化 - 业务能力层
//!
//! 把任意（可能残缺、类型错乱的）JSON 载荷转换成字段齐全的 `AssessmentResult`。
//! 所有转换函数都是全函数：不会报错，失败就用默认值。

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Config;
use crate::models::{AssessmentResult, AssessmentVariant, ReadinessCategory};

/// 就绪度分数缺失时的默认值
pub const DEFAULT_READINESS_SCORE: i64 = 0;
/// 风险分数缺失时的默认值
pub const DEFAULT_RISK_SCORE: i64 = 50;
/// 职责列表最多保留条数
pub const MAX_DUTY_SAMPLE: usize = 8;

pub const TIME_HORIZON_PLACEHOLDER: &str = "Time horizon unavailable";
pub const RECOMMENDATION_PLACEHOLDER: &str = "Recommendation unavailable. Rerun the assessment.";
pub const REASSESSMENT_PLACEHOLDER: &str = "Reassessment guidance unavailable.";

/// 结果标准化器
pub struct ResultNormalizer {
    variant: AssessmentVariant,
}

impl ResultNormalizer {
    pub fn new(config: &Config) -> Self {
        Self::with_variant(config.variant)
    }

    pub fn with_variant(variant: AssessmentVariant) -> Self {
        Self { variant }
    }

    /// 标准化载荷；`None` 与空对象等价
    pub fn normalize(&self, payload: Option<&Value>) -> AssessmentResult {
        let empty = Map::new();
        let fields = match payload {
            Some(Value::Object(map)) => map,
            Some(other) => {
                debug!("载荷不是 JSON 对象 ({}), 按空对象处理", json_kind(other));
                &empty
            }
            None => &empty,
        };
        let field = |key: &str| fields.get(key).unwrap_or(&Value::Null);

        let raw_readiness = clamp_score(coerce_int(field("readiness_score"), DEFAULT_READINESS_SCORE));
        let readiness_score = if self.variant.remaps_readiness() {
            remap_readiness(raw_readiness)
        } else {
            raw_readiness
        };
        let readiness_category = ReadinessCategory::from_score(readiness_score);

        let mut duty_sample = coerce_string_list(field("duty_sample"));
        duty_sample.truncate(MAX_DUTY_SAMPLE);
        if duty_sample.is_empty() {
            duty_sample.push(self.variant.duty_placeholder().to_string());
        }

        // 两种口径的摘录字段名不同，互为后备
        let excerpt_source = match field("role_excerpt") {
            Value::Null => field("resume_excerpt"),
            value => value,
        };

        AssessmentResult {
            readiness_score,
            readiness_category,
            time_horizon: coerce_text(field("time_horizon"), TIME_HORIZON_PLACEHOLDER),
            risk_score: clamp_score(coerce_int(field("risk_score"), DEFAULT_RISK_SCORE)),
            recommendation: coerce_text(field("recommendation"), RECOMMENDATION_PLACEHOLDER),
            reassessment_time: coerce_text(field("reassessment_time"), REASSESSMENT_PLACEHOLDER),
            automatable_signals: coerce_string_int_map(field("automatable_signals")),
            risk_signals: coerce_string_int_map(field("risk_signals")),
            duty_sample,
            role_excerpt: coerce_text(excerpt_source, self.variant.excerpt_placeholder()),
            research_insights: coerce_string_list(field("research_insights")),
            research_guidance: readiness_category.research_guidance().to_string(),
        }
    }
}

// ========== 类型转换 ==========

/// 宽松地把值转成整数
///
/// 接受整数、浮点（向零截断）、数字字符串（整数或小数写法）、布尔值；其他情况返回 `default`。
pub fn coerce_int(value: &Value, default: i64) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(default),
        Value::String(s) => parse_int_text(s).unwrap_or(default),
        Value::Bool(b) => i64::from(*b),
        _ => default,
    }
}

fn parse_int_text(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

/// 限制在 [0, 100]
pub fn clamp_score(score: i64) -> u8 {
    score.clamp(0, 100) as u8
}

/// 就绪度重映射
///
/// 模型很少给出 75 以上的分数，所以把原始区间 [1, 75] 拉伸到 [1, 100]（1 仍映射为 1），
/// 超出部分截到 100；0 保持 0。
pub fn remap_readiness(score: u8) -> u8 {
    if score == 0 {
        return 0;
    }
    let adjusted = (f64::from(score) - 1.0) * 99.0 / 74.0 + 1.0;
    clamp_score(adjusted.round() as i64)
}

/// 转成 标签 → 整数 的映射；非对象返回空映射，值无法转换时记为 0
pub fn coerce_string_int_map(value: &Value) -> BTreeMap<String, i64> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(label, v)| (label.clone(), coerce_int(v, 0)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// 转成字符串列表；只保留字符串和数字，数字转成文本
pub fn coerce_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// 转成文本；缺失、null、空值时使用占位文案
pub fn coerce_text(value: &Value, placeholder: &str) -> String {
    let text = match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    };
    text.filter(|t| !t.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
