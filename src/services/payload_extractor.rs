//! 载荷提取 - 业务能力层
//!
//! 从模型返回的文本里找出 ```json 围栏中的 JSON 对象。纯函数，不报错：
//! 找不到围栏或解析失败都返回 `None`，由下游按空对象处理。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// 匹配 ```json 围栏里的对象（非贪婪，可跨行）
static JSON_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\r?\n(\{.*?\})\r?\n```").expect("json fence regex")
});

/// 提取围栏中的 JSON 载荷
pub fn extract_payload(text: &str) -> Option<Value> {
    let Some(captures) = JSON_FENCE_RE.captures(text) else {
        debug!("响应中没有找到 ```json 围栏");
        return None;
    };

    let candidate = captures.get(1)?.as_str();
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("围栏中的 JSON 无法解析: {}", e);
            None
        }
    }
}
