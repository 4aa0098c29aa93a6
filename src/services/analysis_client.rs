//! 远程分析 - 业务能力层
//!
//! 只负责"把一份输入交给推理服务、拿回文本"这一件事：
//! - 文档先上传拿到句柄，分析结束后无论成败都删除句柄
//! - 文字描述直接内联到请求里
//! - 每次分析只发一次请求，不重试

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AnalysisError, AppResult, AssessmentError, BackendError};
use crate::models::response::{InputContent, InputMessage, ToolSpec};
use crate::models::{
    AnalysisContent, AnalysisInput, ModelOutput, RawModelResponse, RemoteFileHandle,
    ResponseRequest, RoleDocument,
};
use crate::utils::logging::truncate_text;

/// 系统提示词
pub const SYSTEM_PROMPT: &str = "You are an AI workforce strategist and automation-readiness analyst. \
Use the provided role document or role description to evaluate how ready the role is for unsupervised \
AI automation. When needed, leverage the available web search tool to ground your guidance in current \
automation benchmarks and industry trends. Respond with a single JSON object inside a fenced code block, \
like ```json { ... } ```.";

/// 输出结构说明
pub const SCHEMA_INSTRUCTIONS: &str = "Review the provided material to estimate automation readiness. \
If you need external references, use the web search tool. Return JSON with keys: \
readiness_score (0-100 integer), time_horizon (string), risk_score (0-100 integer), \
recommendation (string), reassessment_time (string), automatable_signals (object label->integer), \
risk_signals (object label->integer), duty_sample (array of up to 8 concise bullets), \
role_excerpt (string under 600 characters highlighting notable duties), \
research_insights (array of short facts sourced via search when applicable).";

/// 推理服务后端
///
/// 生产环境由 `clients::OpenAiClient` 实现，测试里可以换成假实现。
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// 上传文档，返回远程句柄
    async fn upload_document(&self, document: &RoleDocument)
        -> Result<RemoteFileHandle, BackendError>;

    /// 发起一次分析请求
    async fn create_response(&self, request: &ResponseRequest) -> Result<ModelOutput, BackendError>;

    /// 删除远程文档
    async fn delete_document(&self, handle: &RemoteFileHandle) -> Result<(), BackendError>;
}

#[async_trait]
impl<T: ReasoningBackend + ?Sized> ReasoningBackend for Arc<T> {
    async fn upload_document(
        &self,
        document: &RoleDocument,
    ) -> Result<RemoteFileHandle, BackendError> {
        (**self).upload_document(document).await
    }

    async fn create_response(&self, request: &ResponseRequest) -> Result<ModelOutput, BackendError> {
        (**self).create_response(request).await
    }

    async fn delete_document(&self, handle: &RemoteFileHandle) -> Result<(), BackendError> {
        (**self).delete_document(handle).await
    }
}

/// 远程分析客户端
pub struct RemoteAnalysisClient<B> {
    backend: B,
    model_name: String,
}

impl<B: ReasoningBackend> RemoteAnalysisClient<B> {
    pub fn new(backend: B, config: &Config) -> Self {
        Self {
            backend,
            model_name: config.model_name.clone(),
        }
    }

    /// 分析一份输入，返回模型的原始文本
    pub async fn analyze(&self, input: &AnalysisInput) -> AppResult<RawModelResponse> {
        match input {
            AnalysisInput::FreeText(text) => {
                self.request_analysis(AnalysisContent::InlineText(text.clone()))
                    .await
            }
            AnalysisInput::Document(document) => {
                let handle = self
                    .backend
                    .upload_document(document)
                    .await
                    .map_err(|e| classify(e, |source| AnalysisError::Upload { source }))?;
                info!("📤 文档已上传: {} -> {}", document.filename, handle.id);

                let outcome = self
                    .request_analysis(AnalysisContent::FileReference(handle.id.clone()))
                    .await;
                self.release(&handle).await;
                outcome
            }
        }
    }

    /// 构建分析请求
    pub fn build_request(&self, content: AnalysisContent) -> ResponseRequest {
        let content_item = match content {
            AnalysisContent::FileReference(file_id) => InputContent::InputFile { file_id },
            AnalysisContent::InlineText(text) => InputContent::InputText {
                text: format!("Role description:\n{}", text),
            },
        };

        ResponseRequest {
            model: self.model_name.clone(),
            input: vec![
                InputMessage {
                    role: "system".to_string(),
                    content: vec![InputContent::InputText {
                        text: SYSTEM_PROMPT.to_string(),
                    }],
                },
                InputMessage {
                    role: "user".to_string(),
                    content: vec![
                        InputContent::InputText {
                            text: SCHEMA_INSTRUCTIONS.to_string(),
                        },
                        content_item,
                    ],
                },
            ],
            tools: vec![ToolSpec::web_search()],
            tool_choice: "auto".to_string(),
        }
    }

    async fn request_analysis(&self, content: AnalysisContent) -> AppResult<RawModelResponse> {
        let request = self.build_request(content);
        debug!("调用推理服务，模型: {}", self.model_name);

        let output = self
            .backend
            .create_response(&request)
            .await
            .map_err(|e| classify(e, |source| AnalysisError::Request { source }))?;

        let text = output.text().ok_or(AnalysisError::EmptyResponse)?;
        debug!("模型返回 {} 字符: {}", text.len(), truncate_text(&text, 200));

        Ok(RawModelResponse::new(text))
    }

    /// 删除远程文档，失败只记日志
    async fn release(&self, handle: &RemoteFileHandle) {
        match self.backend.delete_document(handle).await {
            Ok(()) => debug!("远程文档 {} 已删除", handle.id),
            Err(e) => warn!("⚠️ 无法删除远程文档 {}: {}", handle.id, e),
        }
    }
}

/// 本地构建失败归为未分类错误，其余归为分析失败
fn classify(err: BackendError, wrap: impl FnOnce(BackendError) -> AnalysisError) -> AssessmentError {
    if err.is_invalid_request() {
        AssessmentError::Unexpected(anyhow::Error::new(err))
    } else {
        AssessmentError::Analysis(wrap(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentSegment;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 记录调用次数的假后端
    #[derive(Default)]
    struct FakeBackend {
        fail_upload: bool,
        fail_request: bool,
        fail_delete: bool,
        reply: Option<String>,
        uploads: AtomicUsize,
        deletes: AtomicUsize,
        requests: Mutex<Vec<ResponseRequest>>,
    }

    fn service_down() -> BackendError {
        BackendError::Status {
            endpoint: "responses".to_string(),
            status: 503,
            body: "unavailable".to_string(),
        }
    }

    #[async_trait]
    impl ReasoningBackend for FakeBackend {
        async fn upload_document(
            &self,
            _document: &RoleDocument,
        ) -> Result<RemoteFileHandle, BackendError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            if self.fail_upload {
                return Err(service_down());
            }
            Ok(RemoteFileHandle {
                id: "file-123".to_string(),
            })
        }

        async fn create_response(
            &self,
            request: &ResponseRequest,
        ) -> Result<ModelOutput, BackendError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail_request {
                return Err(service_down());
            }
            Ok(ModelOutput {
                segments: self
                    .reply
                    .iter()
                    .map(|text| ContentSegment::output_text(text.clone()))
                    .collect(),
                flat_text: None,
            })
        }

        async fn delete_document(&self, _handle: &RemoteFileHandle) -> Result<(), BackendError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete {
                return Err(service_down());
            }
            Ok(())
        }
    }

    fn client(backend: FakeBackend) -> (Arc<FakeBackend>, RemoteAnalysisClient<Arc<FakeBackend>>) {
        let backend = Arc::new(backend);
        let client = RemoteAnalysisClient::new(backend.clone(), &Config::default());
        (backend, client)
    }

    fn document() -> AnalysisInput {
        AnalysisInput::Document(RoleDocument::new("role.pdf", vec![1, 2, 3]))
    }

    #[tokio::test]
    async fn test_free_text_is_inlined() {
        let (backend, client) = client(FakeBackend {
            reply: Some("  answer  ".to_string()),
            ..Default::default()
        });

        let text = "r".repeat(200);
        let raw = client
            .analyze(&AnalysisInput::FreeText(text.clone()))
            .await
            .unwrap();
        assert_eq!(raw.as_str(), "answer");
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 0);
        assert_eq!(backend.deletes.load(Ordering::SeqCst), 0);

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let user = &requests[0].input[1].content;
        assert_eq!(
            user[1],
            InputContent::InputText {
                text: format!("Role description:\n{}", text)
            }
        );
        assert!(!user
            .iter()
            .any(|c| matches!(c, InputContent::InputFile { .. })));
    }

    #[tokio::test]
    async fn test_document_released_after_success() {
        let (backend, client) = client(FakeBackend {
            reply: Some("ok".to_string()),
            ..Default::default()
        });

        client.analyze(&document()).await.unwrap();
        assert_eq!(backend.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(backend.deletes.load(Ordering::SeqCst), 1);

        let requests = backend.requests.lock().unwrap();
        assert_eq!(
            requests[0].input[1].content[1],
            InputContent::InputFile {
                file_id: "file-123".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_document_released_after_failed_analysis() {
        let (backend, client) = client(FakeBackend {
            fail_request: true,
            ..Default::default()
        });

        let err = client.analyze(&document()).await.unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::Analysis(AnalysisError::Request { .. })
        ));
        assert_eq!(backend.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_document_released_after_empty_response() {
        let (backend, client) = client(FakeBackend::default());

        let err = client.analyze(&document()).await.unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::Analysis(AnalysisError::EmptyResponse)
        ));
        assert_eq!(backend.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_escalated() {
        let (backend, client) = client(FakeBackend {
            reply: Some("still fine".to_string()),
            fail_delete: true,
            ..Default::default()
        });

        let raw = client.analyze(&document()).await.unwrap();
        assert_eq!(raw.as_str(), "still fine");
        assert_eq!(backend.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_skips_request_and_delete() {
        let (backend, client) = client(FakeBackend {
            fail_upload: true,
            ..Default::default()
        });

        let err = client.analyze(&document()).await.unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::Analysis(AnalysisError::Upload { .. })
        ));
        assert!(backend.requests.lock().unwrap().is_empty());
        assert_eq!(backend.deletes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_request_shape() {
        let (_, client) = client(FakeBackend::default());
        let request = client.build_request(AnalysisContent::InlineText("x".to_string()));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4.1-mini");
        assert_eq!(json["tools"][0]["type"], "web_search");
        assert_eq!(json["tool_choice"], "auto");
        assert_eq!(json["input"][0]["role"], "system");
        assert_eq!(json["input"][0]["content"][0]["text"], SYSTEM_PROMPT);
        assert_eq!(json["input"][1]["content"][0]["text"], SCHEMA_INSTRUCTIONS);
    }
}
