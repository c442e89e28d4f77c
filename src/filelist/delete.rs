// 删除确认流程
//
// 删除分两步：先申请删除拿到一次性确认令牌，再凭令牌确认执行。
// 令牌有有效期，过期或未知令牌直接拒绝，不会触发任何后端请求

use crate::backend::DashboardClient;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// 确认令牌默认有效期
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60);

/// 实际执行删除的后端接口
#[async_trait]
pub trait FileRemover: Send + Sync {
    /// 删除指定文件
    async fn remove_file(&self, file_name: &str) -> Result<()>;
}

#[async_trait]
impl FileRemover for DashboardClient {
    async fn remove_file(&self, file_name: &str) -> Result<()> {
        self.delete_file(file_name).await
    }
}

/// 待确认的删除申请
#[derive(Debug, Clone)]
struct PendingDelete {
    /// 目标文件名
    file_name: String,
    /// 申请时间
    requested_at: Instant,
}

/// 删除确认令牌
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteToken {
    /// 一次性令牌
    pub token: String,
    /// 目标文件名
    pub file_name: String,
}

/// 删除协调器
///
/// 维护所有未确认的删除申请；确认和取消都会消耗令牌
pub struct DeleteCoordinator {
    /// 删除执行器
    remover: Arc<dyn FileRemover>,
    /// 未确认的申请，按令牌索引
    pending: Mutex<HashMap<String, PendingDelete>>,
    /// 令牌有效期
    token_ttl: Duration,
}

impl DeleteCoordinator {
    /// 创建删除协调器（默认令牌有效期 60 秒）
    pub fn new(remover: Arc<dyn FileRemover>) -> Self {
        Self::with_token_ttl(remover, DEFAULT_TOKEN_TTL)
    }

    /// 创建删除协调器并指定令牌有效期
    pub fn with_token_ttl(remover: Arc<dyn FileRemover>, token_ttl: Duration) -> Self {
        Self {
            remover,
            pending: Mutex::new(HashMap::new()),
            token_ttl,
        }
    }

    /// 申请删除文件，返回确认令牌
    pub async fn request_delete(&self, file_name: &str) -> DeleteToken {
        let token = Uuid::new_v4().to_string();
        let mut pending = self.pending.lock().await;
        pending.insert(
            token.clone(),
            PendingDelete {
                file_name: file_name.to_string(),
                requested_at: Instant::now(),
            },
        );
        info!("删除申请已登记: name={}", file_name);

        DeleteToken {
            token,
            file_name: file_name.to_string(),
        }
    }

    /// 凭令牌确认删除
    ///
    /// 未知令牌或已过期令牌直接拒绝；后端删除失败时令牌已被消耗，
    /// 需要重新发起申请
    pub async fn confirm_delete(&self, token: &str) -> Result<String> {
        let entry = {
            let mut pending = self.pending.lock().await;
            pending.remove(token)
        };

        let entry = match entry {
            Some(entry) => entry,
            None => {
                warn!("删除确认被拒绝: 未知令牌");
                anyhow::bail!("删除确认令牌无效");
            }
        };

        if entry.requested_at.elapsed() > self.token_ttl {
            warn!("删除确认被拒绝: 令牌已过期, name={}", entry.file_name);
            anyhow::bail!("删除确认令牌已过期: {}", entry.file_name);
        }

        self.remover.remove_file(&entry.file_name).await?;
        info!("删除已确认并执行: name={}", entry.file_name);
        Ok(entry.file_name)
    }

    /// 取消删除申请
    ///
    /// 未知令牌静默忽略
    pub async fn cancel_delete(&self, token: &str) {
        let mut pending = self.pending.lock().await;
        if let Some(entry) = pending.remove(token) {
            info!("删除申请已取消: name={}", entry.file_name);
        }
    }

    /// 当前未确认的申请数
    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }
}
