use std::fmt;
use std::path::Path;

/// 用户上传的岗位文档
#[derive(Clone, PartialEq, Eq)]
pub struct RoleDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RoleDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// 小写扩展名（不含点）
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// 只打印文件名和大小
impl fmt::Debug for RoleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleDocument")
            .field("filename", &self.filename)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// 经过校验的分析输入，二者只能有其一
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisInput {
    Document(RoleDocument),
    FreeText(String),
}

impl AnalysisInput {
    /// 输入来自哪个表单字段
    pub fn channel(&self) -> InputChannel {
        match self {
            AnalysisInput::Document(_) => InputChannel::Document,
            AnalysisInput::FreeText(_) => InputChannel::Description,
        }
    }
}

/// 输入通道（对应表单字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputChannel {
    /// 上传文档
    Document,
    /// 文字描述
    Description,
}

impl InputChannel {
    /// 表单字段名
    pub fn field_name(self) -> &'static str {
        match self {
            InputChannel::Document => "role_document",
            InputChannel::Description => "role_description",
        }
    }
}

impl fmt::Display for InputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        let doc = RoleDocument::new("Senior_Analyst.PDF", vec![1, 2, 3]);
        assert_eq!(doc.extension().as_deref(), Some("pdf"));
    }

    #[test]
    fn test_extension_missing() {
        let doc = RoleDocument::new("README", vec![1]);
        assert_eq!(doc.extension(), None);
    }

    #[test]
    fn test_debug_hides_bytes() {
        let doc = RoleDocument::new("role.pdf", vec![0; 1024]);
        let printed = format!("{:?}", doc);
        assert!(printed.contains("role.pdf"));
        assert!(printed.contains("1024"));
    }
}
