use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::AssessmentVariant;

/// 程序配置
///
/// 加载顺序：默认值 ← TOML 文件（可选） ← 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 推理服务配置 ---
    pub openai_api_key: String,
    pub openai_api_base_url: String,
    pub model_name: String,
    /// 单次请求超时（秒），0 表示使用传输层默认值
    pub request_timeout_secs: u64,
    // --- 评估配置 ---
    /// 评估口径（岗位文档 / 简历）
    pub variant: AssessmentVariant,
    /// 文档大小上限（字节）
    pub max_document_bytes: usize,
    /// 文字描述最少字符数
    pub min_description_chars: usize,
    /// 文字描述最多字符数
    pub max_description_chars: usize,
    // --- 次数配置 ---
    /// 每个账户默认可用次数
    pub run_allowance: u32,
    /// 次数账本文件
    pub quota_ledger_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_api_base_url: "https://api.openai.com/v1".to_string(),
            model_name: "gpt-4.1-mini".to_string(),
            request_timeout_secs: 120,
            variant: AssessmentVariant::RoleDocument,
            max_document_bytes: 5 * 1024 * 1024,
            min_description_chars: 50,
            max_description_chars: 4000,
            run_allowance: 5,
            quota_ledger_path: "quota.toml".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置并校验必需项
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match config_file {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let config = base.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取，未写出的字段取默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// 仅从环境变量加载
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env()
    }

    /// 用环境变量覆盖已有的值
    pub fn merge_env(self) -> Result<Self, ConfigError> {
        Ok(Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or(self.openai_api_key),
            openai_api_base_url: std::env::var("OPENAI_API_BASE_URL")
                .unwrap_or(self.openai_api_base_url),
            model_name: std::env::var("OPENAI_MODEL_NAME").unwrap_or(self.model_name),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.request_timeout_secs),
            variant: env_parse("ASSESSMENT_VARIANT", "role | resume")?.unwrap_or(self.variant),
            max_document_bytes: env_parse("MAX_DOCUMENT_BYTES", "usize")?
                .unwrap_or(self.max_document_bytes),
            min_description_chars: env_parse("MIN_DESCRIPTION_CHARS", "usize")?
                .unwrap_or(self.min_description_chars),
            max_description_chars: env_parse("MAX_DESCRIPTION_CHARS", "usize")?
                .unwrap_or(self.max_description_chars),
            run_allowance: env_parse("RUN_ALLOWANCE", "u32")?.unwrap_or(self.run_allowance),
            quota_ledger_path: std::env::var("QUOTA_LEDGER_PATH")
                .unwrap_or(self.quota_ledger_path),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(self.verbose_logging),
        })
    }

    /// 校验必需项
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                var_name: "OPENAI_API_KEY".to_string(),
            });
        }
        Ok(())
    }
}

/// 读取并解析环境变量；未设置时返回 `None`
fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_form_limits() {
        let config = Config::default();
        assert_eq!(config.max_document_bytes, 5 * 1024 * 1024);
        assert_eq!(config.min_description_chars, 50);
        assert_eq!(config.max_description_chars, 4000);
        assert_eq!(config.run_allowance, 5);
        assert_eq!(config.variant, AssessmentVariant::RoleDocument);
    }

    #[test]
    fn test_toml_file_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
model_name = "gpt-4.1"
variant = "resume"
run_allowance = 3
"#
        )
        .unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.model_name, "gpt-4.1");
        assert_eq!(config.variant, AssessmentVariant::Resume);
        assert_eq!(config.run_allowance, 3);
        // 未写出的字段保留默认值
        assert_eq!(config.min_description_chars, 50);
    }

    #[test]
    fn test_bad_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "run_allowance = \"many\"").unwrap();

        let err = Config::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing { .. })
        ));
    }
}
