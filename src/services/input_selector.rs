//! 输入选择 - 业务能力层
//!
//! 只负责"文档 / 文字描述二选一"的校验，不做任何 I/O

use tracing::debug;

use crate::config::Config;
use crate::error::{AppResult, AssessmentError, ValidationError};
use crate::models::{AnalysisInput, RoleDocument};

/// 输入选择器
///
/// 职责：
/// - 保证文档和文字描述恰好提供一个
/// - 文档：扩展名、大小
/// - 文字描述：字符数上下限
pub struct InputSelector {
    accepted_extensions: Vec<String>,
    max_document_bytes: usize,
    min_description_chars: usize,
    max_description_chars: usize,
}

impl InputSelector {
    /// 根据配置创建
    pub fn new(config: &Config) -> Self {
        Self {
            accepted_extensions: config.variant.accepted_extensions(),
            max_document_bytes: config.max_document_bytes,
            min_description_chars: config.min_description_chars,
            max_description_chars: config.max_description_chars,
        }
    }

    /// 允许的扩展名
    pub fn accepted_extensions(&self) -> &[String] {
        &self.accepted_extensions
    }

    /// 选择并校验输入
    ///
    /// 空文件和只有空白的描述视为未提供。
    pub fn select(
        &self,
        document: Option<RoleDocument>,
        description: Option<&str>,
    ) -> AppResult<AnalysisInput> {
        let document = document.filter(|doc| !doc.is_empty());
        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty());

        match (document, description) {
            (Some(_), Some(_)) => Err(ValidationError::BothProvided.into()),
            (None, None) => Err(ValidationError::NeitherProvided.into()),
            (Some(doc), None) => self.check_document(doc).map(AnalysisInput::Document),
            (None, Some(text)) => self
                .check_description(text)
                .map(|text| AnalysisInput::FreeText(text.to_string())),
        }
    }

    fn check_document(&self, document: RoleDocument) -> AppResult<RoleDocument> {
        let accepted = document
            .extension()
            .map(|ext| self.accepted_extensions.iter().any(|a| *a == ext))
            .unwrap_or(false);
        if !accepted {
            debug!("拒绝文档 {}: 扩展名不支持", document.filename);
            return Err(AssessmentError::unsupported_file_type(
                &document.filename,
                &self.accepted_extensions,
            ));
        }

        if document.len() > self.max_document_bytes {
            debug!(
                "拒绝文档 {}: {} 字节超过上限 {}",
                document.filename,
                document.len(),
                self.max_document_bytes
            );
            return Err(ValidationError::DocumentTooLarge {
                size: document.len(),
                limit: self.max_document_bytes,
            }
            .into());
        }

        Ok(document)
    }

    fn check_description<'a>(&self, text: &'a str) -> AppResult<&'a str> {
        let chars = text.chars().count();
        if chars < self.min_description_chars {
            return Err(ValidationError::DescriptionTooShort {
                chars,
                min: self.min_description_chars,
            }
            .into());
        }
        if chars > self.max_description_chars {
            return Err(ValidationError::DescriptionTooLong {
                chars,
                max: self.max_description_chars,
            }
            .into());
        }
        Ok(text)
    }
}
