//! 次数额度 - 业务能力层
//!
//! 评估流程只通过 `QuotaGate` 询问"还有没有次数"和"扣一次"。
//! 提供两个实现：内存计数器和按账户持久化到 TOML 文件的账本。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LedgerError;

/// 次数闸门
pub trait QuotaGate: Send + Sync {
    /// 是否还有剩余次数
    fn has_remaining(&self) -> bool;

    /// 扣减一次；已经用完时返回 false，且不会低于 0
    fn decrement(&self) -> bool;

    /// 账户的总次数（用于提示文案）
    fn allowance(&self) -> u32;
}

/// 内存计数器
#[derive(Debug)]
pub struct RunAllowance {
    allowance: u32,
    remaining: AtomicU32,
}

impl RunAllowance {
    pub fn new(allowance: u32) -> Self {
        Self::with_remaining(allowance, allowance)
    }

    pub fn with_remaining(allowance: u32, remaining: u32) -> Self {
        Self {
            allowance,
            remaining: AtomicU32::new(remaining),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }
}

impl QuotaGate for RunAllowance {
    fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    fn decrement(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn allowance(&self) -> u32 {
        self.allowance
    }
}

/// 账本文件格式
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    accounts: BTreeMap<String, AccountEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountEntry {
    runs_remaining: u32,
    #[serde(default)]
    updated_at: Option<String>,
}

/// 按账户记录剩余次数的 TOML 账本
#[derive(Debug, Clone)]
pub struct QuotaLedger {
    inner: Arc<LedgerInner>,
}

#[derive(Debug)]
struct LedgerInner {
    path: PathBuf,
    default_allowance: u32,
    file: Mutex<LedgerFile>,
}

impl QuotaLedger {
    /// 打开账本；文件不存在时从空账本开始
    pub fn open(path: impl AsRef<Path>, default_allowance: u32) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let file = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| LedgerError::Read {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| LedgerError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            debug!("账本 {} 不存在，使用空账本", path.display());
            LedgerFile::default()
        };

        Ok(Self {
            inner: Arc::new(LedgerInner {
                path,
                default_allowance,
                file: Mutex::new(file),
            }),
        })
    }

    /// 某个账户的次数闸门
    pub fn account(&self, name: impl Into<String>) -> AccountQuota {
        AccountQuota {
            ledger: self.clone(),
            name: name.into(),
        }
    }

    /// 账户剩余次数；新账户为默认次数
    pub fn runs_remaining(&self, name: &str) -> u32 {
        let file = self.lock();
        file.accounts
            .get(name)
            .map(|entry| entry.runs_remaining)
            .unwrap_or(self.inner.default_allowance)
    }

    fn decrement(&self, name: &str) -> bool {
        let mut file = self.lock();
        let default_allowance = self.inner.default_allowance;
        let entry = file
            .accounts
            .entry(name.to_string())
            .or_insert_with(|| AccountEntry {
                runs_remaining: default_allowance,
                updated_at: None,
            });
        if entry.runs_remaining == 0 {
            return false;
        }
        entry.runs_remaining -= 1;
        entry.updated_at = Some(chrono::Local::now().to_rfc3339());

        if let Err(e) = self.persist(&file) {
            warn!("⚠️ 账本保存失败: {}", e);
        }
        true
    }

    fn persist(&self, file: &LedgerFile) -> Result<(), LedgerError> {
        let content = toml::to_string_pretty(file)?;
        std::fs::write(&self.inner.path, content).map_err(|source| LedgerError::Write {
            path: self.inner.path.display().to_string(),
            source,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerFile> {
        // 持锁期间不会 panic，中毒时沿用内部数据
        self.inner
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 账本中单个账户的闸门
#[derive(Debug, Clone)]
pub struct AccountQuota {
    ledger: QuotaLedger,
    name: String,
}

impl AccountQuota {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runs_remaining(&self) -> u32 {
        self.ledger.runs_remaining(&self.name)
    }
}

impl QuotaGate for AccountQuota {
    fn has_remaining(&self) -> bool {
        self.runs_remaining() > 0
    }

    fn decrement(&self) -> bool {
        self.ledger.decrement(&self.name)
    }

    fn allowance(&self) -> u32 {
        self.ledger.inner.default_allowance
    }
}
