//! 推理服务的请求/响应结构
//!
//! 响应在服务边界解码一次，之后只使用 `ModelOutput`。

use serde::{Deserialize, Serialize};

/// 分析请求携带的用户内容：文件引用或内联文本，二选一
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisContent {
    FileReference(String),
    InlineText(String),
}

/// 上传到远程服务的文件句柄
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFileHandle {
    pub id: String,
}

// ========== 请求 ==========

#[derive(Debug, Clone, Serialize)]
pub struct ResponseRequest {
    pub model: String,
    pub input: Vec<InputMessage>,
    pub tools: Vec<ToolSpec>,
    pub tool_choice: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMessage {
    pub role: String,
    pub content: Vec<InputContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputContent {
    InputText { text: String },
    InputFile { file_id: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ToolSpec {
    pub fn web_search() -> Self {
        Self {
            kind: "web_search".to_string(),
        }
    }
}

// ========== 响应 ==========

/// 响应体中用到的部分
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseBody {
    #[serde(default)]
    pub output: Option<Vec<OutputItem>>,
    #[serde(default)]
    pub output_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputItem {
    #[serde(default)]
    pub content: Option<Vec<ContentSegment>>,
}

/// 输出内容片段
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentSegment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ContentSegment {
    pub fn output_text(text: impl Into<String>) -> Self {
        Self {
            kind: "output_text".to_string(),
            text: Some(text.into()),
        }
    }

    fn is_output_text(&self) -> bool {
        self.kind == "output_text"
    }
}

/// 解码后的模型输出：片段列表和/或扁平文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelOutput {
    pub segments: Vec<ContentSegment>,
    pub flat_text: Option<String>,
}

impl From<ResponseBody> for ModelOutput {
    fn from(body: ResponseBody) -> Self {
        let segments = body
            .output
            .unwrap_or_default()
            .into_iter()
            .flat_map(|item| item.content.unwrap_or_default())
            .collect();
        Self {
            segments,
            flat_text: body.output_text,
        }
    }
}

impl ModelOutput {
    /// 提取文本
    ///
    /// 先按顺序拼接所有 `output_text` 片段，拼接结果为空时退回扁平文本。
    pub fn text(&self) -> Option<String> {
        let joined: String = self
            .segments
            .iter()
            .filter(|segment| segment.is_output_text())
            .filter_map(|segment| segment.text.as_deref())
            .collect();
        let joined = joined.trim();
        if !joined.is_empty() {
            return Some(joined.to_string());
        }

        self.flat_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }
}

/// 单次请求返回的原始文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelResponse(String);

impl RawModelResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
