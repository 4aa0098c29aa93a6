use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use role_readiness::models::AssessmentVariant;
use role_readiness::services::{QuotaGate, QuotaLedger};
use role_readiness::utils::{logging, report};
use role_readiness::{
    AssessmentCtx, AssessmentFlow, Config, OpenAiClient, RoleDocument, Submission,
};

/// 评估岗位的 AI 自动化就绪度
#[derive(Parser, Debug)]
#[command(name = "role-readiness", version, about)]
struct Cli {
    /// 岗位文档（PDF，简历口径下也接受 DOCX）
    #[arg(long)]
    document: Option<PathBuf>,

    /// 岗位文字描述
    #[arg(long, conflicts_with = "description_file")]
    description: Option<String>,

    /// 从文件读取岗位文字描述
    #[arg(long)]
    description_file: Option<PathBuf>,

    /// 账户名，用于次数统计
    #[arg(long, env = "ASSESSMENT_ACCOUNT", default_value = "local")]
    account: String,

    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 覆盖评估口径（role / resume）
    #[arg(long)]
    variant: Option<AssessmentVariant>,

    /// 以 JSON 输出结果
    #[arg(long)]
    json: bool,

    /// 显示详细日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref()).context("加载配置失败")?;
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    let submission = read_submission(&cli).await?;

    let backend = OpenAiClient::new(&config).context("创建推理服务客户端失败")?;
    let ledger = QuotaLedger::open(&config.quota_ledger_path, config.run_allowance)
        .context("打开次数账本失败")?;
    let quota = ledger.account(cli.account.clone());
    logging::log_quota(quota.name(), quota.runs_remaining(), quota.allowance());

    let flow = AssessmentFlow::new(&config, backend);
    let ctx = AssessmentCtx::new(cli.account.clone());

    match flow.run(&ctx, &quota, submission).await {
        Ok(result) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!(
                    "{}",
                    report::render_text_at(&result, Some(chrono::Local::now()))
                );
            }
            logging::log_quota(quota.name(), quota.runs_remaining(), quota.allowance());
            Ok(ExitCode::SUCCESS)
        }
        Err(form_error) => {
            match form_error.field {
                Some(field) => eprintln!("[{}] {}", field.field_name(), form_error.message),
                None => eprintln!("{}", form_error.message),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// 从命令行参数读取提交内容
async fn read_submission(cli: &Cli) -> Result<Submission> {
    let document = match &cli.document {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("读取文档失败: {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Some(RoleDocument::new(filename, bytes))
        }
        None => None,
    };

    let description = match (&cli.description, &cli.description_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("读取描述文件失败: {}", path.display()))?,
        ),
        (None, None) => None,
    };

    Ok(Submission {
        document,
        description,
    })
}
