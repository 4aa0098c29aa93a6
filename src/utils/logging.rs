//! 日志工具模块
//!
//! 提供日志初始化和格式化输出的辅助函数

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 info，`verbose` 时为 debug。
/// 日志输出到 stderr，stdout 留给评估报告。
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "role_readiness=debug,info"
    } else {
        "info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // 重复初始化（例如测试中）时忽略
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 岗位自动化就绪度评估");
    info!("🤖 模型: {}", config.model_name);
    info!("🌐 服务地址: {}", config.openai_api_base_url);
    info!("📋 评估类型: {:?}", config.variant);
    info!("{}", "=".repeat(60));
}

/// 记录剩余次数
pub fn log_quota(account: &str, remaining: u32, allowance: u32) {
    info!("📊 账户 {} 剩余次数: {}/{}", account, remaining, allowance);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("岗位描述文本", 2), "岗位...");
    }
}
