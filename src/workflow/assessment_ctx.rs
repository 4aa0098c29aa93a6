//! 评估上下文
//!
//! 封装"谁在什么时候发起了这次评估"这一信息，只用于日志

use std::fmt::Display;

use chrono::{DateTime, Local};

/// 评估上下文
#[derive(Debug, Clone)]
pub struct AssessmentCtx {
    /// 发起评估的账户
    pub account: String,

    /// 发起时间
    pub started_at: DateTime<Local>,
}

impl AssessmentCtx {
    /// 创建新的评估上下文
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            started_at: Local::now(),
        }
    }
}

impl Display for AssessmentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[账户 {} @ {}]",
            self.account,
            self.started_at.format("%H:%M:%S")
        )
    }
}
