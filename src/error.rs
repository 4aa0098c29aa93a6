//! 错误类型定义
//!
//! 面向用户的错误（`ValidationError` / `AnalysisError` / 不支持的文件类型）
//! 的 `Display` 文案直接显示在表单上，因此使用英文产品文案；
//! 内部错误（`BackendError` / `ConfigError` / `LedgerError`）只进日志。

use thiserror::Error;

/// 输入校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 同时提供了文档和文字描述
    #[error("Provide either a role document or a role description, not both.")]
    BothProvided,
    /// 两者都没有提供
    #[error("Upload a role document or enter a role description to continue.")]
    NeitherProvided,
    /// 文档超过大小限制
    #[error("File is too large. Please upload a file under {} MB.", .limit / (1024 * 1024))]
    DocumentTooLarge { size: usize, limit: usize },
    /// 文字描述太短
    #[error("Role description is too short. Please provide at least {min} characters.")]
    DescriptionTooShort { chars: usize, min: usize },
    /// 文字描述太长
    #[error("Role description is too long. Please keep it under {max} characters.")]
    DescriptionTooLong { chars: usize, max: usize },
    /// 账户可用次数已用完
    #[error("You have used all {allowance} assessments available on your account.")]
    QuotaExhausted { allowance: u32 },
}

/// 远程推理服务的底层错误（只记录日志，不直接展示）
#[derive(Debug, Error)]
pub enum BackendError {
    /// 网络请求失败
    #[error("请求发送失败 ({endpoint}): {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务返回非 2xx 状态
    #[error("服务返回错误状态 ({endpoint}): status={status}, body={body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 响应体无法解析
    #[error("响应解析失败 ({endpoint}): {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 请求本身无法构建（本地问题，不是服务故障）
    #[error("请求构建失败: {message}")]
    InvalidRequest { message: String },
}

impl BackendError {
    /// 是否是本地构建请求时出的问题
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, BackendError::InvalidRequest { .. })
    }
}

/// 远程分析失败
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// 上传文档失败
    #[error("Failed to upload the document for analysis. Please try again.")]
    Upload {
        #[source]
        source: BackendError,
    },
    /// 分析请求失败
    #[error("The analysis service failed. Please try again later.")]
    Request {
        #[source]
        source: BackendError,
    },
    /// 返回结果中没有任何文本
    #[error("The analysis service returned an empty response.")]
    EmptyResponse,
}

/// 评估流程的统一错误
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 文档扩展名不在允许列表内
    #[error("Unsupported file type. Please upload a {accepted} file.")]
    UnsupportedFileType { filename: String, accepted: String },
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    /// 未分类错误，细节只进日志
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必需的配置项缺失
    #[error("缺少必需的配置项: {var_name}")]
    Missing { var_name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("配置文件解析失败 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 次数账本读写错误
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("读取账本失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入账本失败 ({path}): {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("账本解析失败 ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("账本序列化失败: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ========== 便捷构造函数 ==========

impl AssessmentError {
    /// 创建不支持的文件类型错误
    pub fn unsupported_file_type(filename: impl Into<String>, accepted: &[String]) -> Self {
        let accepted = accepted
            .iter()
            .map(|ext| ext.to_uppercase())
            .collect::<Vec<_>>()
            .join(" or ");
        AssessmentError::UnsupportedFileType {
            filename: filename.into(),
            accepted,
        }
    }
}

// ========== Result 类型别名 ==========

/// 评估流程结果类型
pub type AppResult<T> = Result<T, AssessmentError>;
