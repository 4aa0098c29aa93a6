//! 评估流程 - 流程层
//!
//! 核心职责：定义"一次评估"的完整处理流程
//!
//! 流程顺序：
//! 1. 检查剩余次数
//! 2. 输入选择（文档 / 文字描述二选一）
//! 3. 远程分析 → 提取 JSON → 标准化
//! 4. 成功后扣减一次
//!
//! 任何失败都转换成 `FormError` 交还给调用方，且不扣次数。

use std::fmt;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, AssessmentError, ValidationError};
use crate::models::{AnalysisInput, AssessmentResult, InputChannel, RoleDocument};
use crate::services::{
    extract_payload, InputSelector, QuotaGate, ReasoningBackend, RemoteAnalysisClient,
    ResultNormalizer,
};
use crate::utils::logging::truncate_text;
use crate::workflow::AssessmentCtx;

/// 用户提交的表单数据
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub document: Option<RoleDocument>,
    pub description: Option<String>,
}

impl Submission {
    pub fn document(document: RoleDocument) -> Self {
        Self {
            document: Some(document),
            description: None,
        }
    }

    pub fn description(text: impl Into<String>) -> Self {
        Self {
            document: None,
            description: Some(text.into()),
        }
    }
}

/// 展示给用户的表单错误
///
/// `field` 为 `None` 时表示整张表单的错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub field: Option<InputChannel>,
    pub message: String,
}

impl FormError {
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn on_field(field: InputChannel, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for FormError {}

/// 评估流程
///
/// - 编排输入选择、远程分析、提取、标准化
/// - 决定错误归属到哪个表单字段
/// - 只在成功后扣减次数
pub struct AssessmentFlow<B> {
    selector: InputSelector,
    client: RemoteAnalysisClient<B>,
    normalizer: ResultNormalizer,
    verbose_logging: bool,
}

impl<B: ReasoningBackend> AssessmentFlow<B> {
    /// 创建新的评估流程
    pub fn new(config: &Config, backend: B) -> Self {
        Self {
            selector: InputSelector::new(config),
            client: RemoteAnalysisClient::new(backend, config),
            normalizer: ResultNormalizer::new(config),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 处理一次提交
    pub async fn run(
        &self,
        ctx: &AssessmentCtx,
        quota: &dyn QuotaGate,
        submission: Submission,
    ) -> Result<AssessmentResult, FormError> {
        if !quota.has_remaining() {
            warn!("{} ⚠️ 次数已用完", ctx);
            let err = ValidationError::QuotaExhausted {
                allowance: quota.allowance(),
            };
            return Err(FormError::general(err.to_string()));
        }

        let input = self
            .selector
            .select(submission.document, submission.description.as_deref())
            .map_err(|e| self.to_form_error(ctx, None, e))?;
        let channel = input.channel();
        info!("{} 🤖 开始分析 (输入: {})", ctx, channel);

        let result = self
            .assess(&input)
            .await
            .map_err(|e| self.to_form_error(ctx, Some(channel), e))?;

        if !quota.decrement() {
            warn!("{} ⚠️ 分析成功但次数扣减失败（已为 0）", ctx);
        }
        info!(
            "{} ✓ 分析完成: {} 分 ({})",
            ctx, result.readiness_score, result.readiness_category
        );

        Ok(result)
    }

    /// 对已校验的输入执行 分析 → 提取 → 标准化
    pub async fn assess(&self, input: &AnalysisInput) -> AppResult<AssessmentResult> {
        let raw = self.client.analyze(input).await?;
        if self.verbose_logging {
            info!("模型原始输出: {}", truncate_text(raw.as_str(), 500));
        }

        let payload = extract_payload(raw.as_str());
        if payload.is_none() {
            warn!("⚠️ 模型输出中没有可解析的 JSON，所有字段使用默认值");
        }

        Ok(self.normalizer.normalize(payload.as_ref()))
    }

    /// 把流程错误转换成表单错误
    fn to_form_error(
        &self,
        ctx: &AssessmentCtx,
        channel: Option<InputChannel>,
        err: AssessmentError,
    ) -> FormError {
        match err {
            AssessmentError::Validation(v) => {
                let field = match v {
                    ValidationError::DocumentTooLarge { .. } => Some(InputChannel::Document),
                    ValidationError::DescriptionTooShort { .. }
                    | ValidationError::DescriptionTooLong { .. } => {
                        Some(InputChannel::Description)
                    }
                    ValidationError::BothProvided
                    | ValidationError::NeitherProvided
                    | ValidationError::QuotaExhausted { .. } => None,
                };
                FormError {
                    field,
                    message: v.to_string(),
                }
            }
            e @ AssessmentError::UnsupportedFileType { .. } => {
                FormError::on_field(InputChannel::Document, e.to_string())
            }
            AssessmentError::Analysis(e) => {
                warn!("{} ❌ 分析失败: {:?}", ctx, e);
                match channel {
                    Some(InputChannel::Description) => {
                        FormError::on_field(InputChannel::Description, e.to_string())
                    }
                    _ => FormError::general(e.to_string()),
                }
            }
            AssessmentError::Unexpected(e) => {
                error!("{} ❌ 未预期的错误: {:#}", ctx, e);
                match channel {
                    Some(InputChannel::Description) => FormError::on_field(
                        InputChannel::Description,
                        "We could not process this role description. Please try again with a different description.",
                    ),
                    Some(InputChannel::Document) => FormError::on_field(
                        InputChannel::Document,
                        format!(
                            "We could not process this file. Please upload a different {}.",
                            self.accepted_formats()
                        ),
                    ),
                    None => FormError::general(
                        "We could not process this submission. Please try again.",
                    ),
                }
            }
        }
    }

    fn accepted_formats(&self) -> String {
        self.selector
            .accepted_extensions()
            .iter()
            .map(|ext| ext.to_uppercase())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use crate::models::{
        ModelOutput, ReadinessCategory, RemoteFileHandle, ResponseRequest,
    };
    use crate::services::RunAllowance;
    use async_trait::async_trait;

    /// 按固定方式响应的后端
    enum Canned {
        Reply(&'static str),
        Fail,
        BrokenRequest,
    }

    #[async_trait]
    impl ReasoningBackend for Canned {
        async fn upload_document(
            &self,
            _document: &RoleDocument,
        ) -> Result<RemoteFileHandle, BackendError> {
            Ok(RemoteFileHandle {
                id: "file-1".to_string(),
            })
        }

        async fn create_response(
            &self,
            _request: &ResponseRequest,
        ) -> Result<ModelOutput, BackendError> {
            match self {
                Canned::Reply(text) => Ok(ModelOutput {
                    segments: Vec::new(),
                    flat_text: Some(text.to_string()),
                }),
                Canned::Fail => Err(BackendError::Status {
                    endpoint: "responses".to_string(),
                    status: 500,
                    body: String::new(),
                }),
                Canned::BrokenRequest => Err(BackendError::InvalidRequest {
                    message: "bad header".to_string(),
                }),
            }
        }

        async fn delete_document(&self, _handle: &RemoteFileHandle) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn flow(backend: Canned) -> AssessmentFlow<Canned> {
        AssessmentFlow::new(&Config::default(), backend)
    }

    fn description() -> String {
        "Coordinates weekly payroll runs, reconciles timesheets, answers employee pay queries \
         and prepares month-end reports for finance."
            .to_string()
    }

    #[tokio::test]
    async fn test_success_decrements_once() {
        let flow = flow(Canned::Reply(
            "Sure.\n```json\n{\"readiness_score\": 60, \"risk_score\": 20}\n```\nDone.",
        ));
        let quota = RunAllowance::new(5);

        let result = flow
            .run(
                &AssessmentCtx::new("tester"),
                &quota,
                Submission::description(description()),
            )
            .await
            .unwrap();

        // 60 重映射为 80
        assert_eq!(result.readiness_score, 80);
        assert_eq!(
            result.readiness_category,
            ReadinessCategory::ReadyForFullTransition
        );
        assert_eq!(result.risk_score, 20);
        assert_eq!(quota.remaining(), 4);
    }

    #[tokio::test]
    async fn test_quota_exhausted_blocks_before_analysis() {
        let flow = flow(Canned::Reply("unused"));
        let quota = RunAllowance::with_remaining(5, 0);

        let err = flow
            .run(
                &AssessmentCtx::new("tester"),
                &quota,
                Submission::description(description()),
            )
            .await
            .unwrap_err();
        assert_eq!(err.field, None);
        assert_eq!(
            err.message,
            "You have used all 5 assessments available on your account."
        );
    }

    #[tokio::test]
    async fn test_analysis_failure_attributed_to_description() {
        let flow = flow(Canned::Fail);
        let quota = RunAllowance::new(5);

        let err = flow
            .run(
                &AssessmentCtx::new("tester"),
                &quota,
                Submission::description(description()),
            )
            .await
            .unwrap_err();
        assert_eq!(err.field, Some(InputChannel::Description));
        assert_eq!(
            err.message,
            "The analysis service failed. Please try again later."
        );
        assert_eq!(quota.remaining(), 5);
    }

    #[tokio::test]
    async fn test_analysis_failure_for_document_is_general() {
        let flow = flow(Canned::Fail);
        let quota = RunAllowance::new(5);

        let err = flow
            .run(
                &AssessmentCtx::new("tester"),
                &quota,
                Submission::document(RoleDocument::new("role.pdf", vec![1; 64])),
            )
            .await
            .unwrap_err();
        assert_eq!(err.field, None);
        assert_eq!(quota.remaining(), 5);
    }

    #[tokio::test]
    async fn test_unexpected_error_uses_generic_message() {
        let flow = flow(Canned::BrokenRequest);
        let quota = RunAllowance::new(5);

        let err = flow
            .run(
                &AssessmentCtx::new("tester"),
                &quota,
                Submission::document(RoleDocument::new("role.pdf", vec![1; 64])),
            )
            .await
            .unwrap_err();
        assert_eq!(err.field, Some(InputChannel::Document));
        assert_eq!(
            err.message,
            "We could not process this file. Please upload a different PDF."
        );
        assert_eq!(quota.remaining(), 5);
    }

    #[tokio::test]
    async fn test_validation_errors_map_to_fields() {
        let flow = flow(Canned::Reply("unused"));
        let quota = RunAllowance::new(5);
        let ctx = AssessmentCtx::new("tester");

        let err = flow
            .run(&ctx, &quota, Submission::description("too short"))
            .await
            .unwrap_err();
        assert_eq!(err.field, Some(InputChannel::Description));

        let err = flow
            .run(
                &ctx,
                &quota,
                Submission::document(RoleDocument::new("role.txt", vec![1])),
            )
            .await
            .unwrap_err();
        assert_eq!(err.field, Some(InputChannel::Document));
        assert_eq!(
            err.message,
            "Unsupported file type. Please upload a PDF file."
        );

        let err = flow
            .run(
                &ctx,
                &quota,
                Submission {
                    document: Some(RoleDocument::new("role.pdf", vec![1])),
                    description: Some(description()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field, None);

        let err = flow
            .run(&ctx, &quota, Submission::default())
            .await
            .unwrap_err();
        assert_eq!(err.field, None);

        assert_eq!(quota.remaining(), 5);
    }
}
