//! # Role Readiness
//!
//! 评估一个岗位（或简历）交给 AI 自动化的就绪程度
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 与外部推理服务通信
//! - `OpenAiClient` - Files / Responses 接口，实现 `ReasoningBackend`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个只处理一件事
//! - `InputSelector` - 文档 / 文字描述二选一并校验
//! - `RemoteAnalysisClient` - 上传、分析、删除远程文档
//! - `extract_payload` - 从模型输出中提取 JSON
//! - `ResultNormalizer` - 把不可信的 JSON 变成完整的评估结果
//! - `QuotaGate` - 账户剩余次数
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次评估"的完整处理流程
//! - `AssessmentCtx` - 上下文封装（账户 + 时间）
//! - `AssessmentFlow` - 流程编排（quota → select → analyze → extract → normalize）

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::OpenAiClient;
pub use config::Config;
pub use error::{AppResult, AssessmentError};
pub use models::{AssessmentResult, AssessmentVariant, ReadinessCategory, RoleDocument};
pub use workflow::{AssessmentCtx, AssessmentFlow, FormError, Submission};
