// 上传批次管理器
//
// 负责管理一次页面会话内的上传暂存区：
// - 哈希去重入列（部分成功是正常情况）
// - 按索引移除
// - 配额预检 + 整批原子提交
// - 事件广播（供 UI 层渲染提示）

use crate::backend::UploadReceipt;
use crate::events::BatchEvent;
use crate::uploader::batch::{BatchState, DEFAULT_QUOTA_BYTES};
use crate::uploader::hash;
use crate::uploader::types::{
    BatchError, CommitSummary, FileCandidate, StageOutcome, StageReport, StagedFile,
    StagedFileInfo,
};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

/// 批次上传通道
///
/// 管理器只关心"接受"或"拒绝"，后端的具体协议由实现方决定
#[async_trait]
pub trait BatchTransport: Send + Sync {
    /// 将整个批次作为一次原子调用发给后端
    async fn upload_batch(&self, files: &[StagedFile]) -> Result<UploadReceipt>;
}

/// 事件广播通道容量
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// 提交忙标志的守卫
///
/// 无论提交从哪条路径退出（成功、失败、panic 展开），
/// Drop 都会释放忙标志，后续提交才能继续
struct CommitGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for CommitGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// 上传批次管理器
pub struct UploadBatchManager {
    /// 批次上传通道
    transport: Arc<dyn BatchTransport>,
    /// 暂存区状态（仅在锁内变更，挂起点之间不会出现部分修改）
    state: Mutex<BatchState>,
    /// 是否有提交正在进行（同一时刻至多一次提交在途）
    committing: AtomicBool,
    /// 存储配额（字节）
    quota_bytes: u64,
    /// 事件广播发送端
    event_tx: broadcast::Sender<BatchEvent>,
}

impl UploadBatchManager {
    /// 创建管理器（使用默认 20 GiB 配额）
    pub fn new(transport: Arc<dyn BatchTransport>) -> Self {
        Self::with_quota(transport, DEFAULT_QUOTA_BYTES)
    }

    /// 创建管理器（指定配额）
    ///
    /// # 参数
    /// * `transport` - 批次上传通道
    /// * `quota_bytes` - 会话累计上传量上限（字节）
    pub fn with_quota(transport: Arc<dyn BatchTransport>, quota_bytes: u64) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        info!("创建上传批次管理器: 配额={} 字节", quota_bytes);
        Self {
            transport,
            state: Mutex::new(BatchState::new()),
            committing: AtomicBool::new(false),
            quota_bytes,
            event_tx,
        }
    }

    /// 订阅批次事件
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.event_tx.subscribe()
    }

    /// 发布事件（没有订阅者时静默丢弃）
    fn publish(&self, event: BatchEvent) {
        debug!("批次事件: {}", event.event_type_name());
        let _ = self.event_tx.send(event);
    }

    /// 批量暂存候选文件
    ///
    /// 所有候选文件的哈希并发计算（阻塞线程池），但结果按输入顺序合并，
    /// 因此入列顺序始终等于输入顺序，与哈希完成先后无关。
    /// 单个文件失败只影响它自己，同批次其余文件照常处理。
    pub async fn stage_candidates(&self, candidates: Vec<FileCandidate>) -> StageReport {
        if candidates.is_empty() {
            return StageReport::default();
        }

        // 并发计算哈希，join_all 保持输入顺序
        let hashed = join_all(candidates.into_iter().map(|candidate| async move {
            let name = candidate.name.clone();
            match hash::digest_content(candidate.content).await {
                Ok((content, content_hash)) => Ok(StagedFile {
                    name,
                    content,
                    content_hash,
                }),
                Err(e) => Err((name, e.to_string())),
            }
        }))
        .await;

        // 去重与入列在同一次锁内按顺序完成
        let mut state = self.state.lock().await;
        let mut outcomes = Vec::with_capacity(hashed.len());

        for result in hashed {
            match result {
                Ok(file) => {
                    if state.is_duplicate(&file.content_hash) {
                        warn!(
                            "检测到重复文件: {} 已忽略, hash={}",
                            file.name, file.content_hash
                        );
                        self.publish(BatchEvent::DuplicateRejected {
                            name: file.name.clone(),
                            content_hash: file.content_hash.clone(),
                        });
                        outcomes.push(StageOutcome::Duplicate {
                            name: file.name,
                            content_hash: file.content_hash,
                        });
                    } else {
                        self.publish(BatchEvent::Staged {
                            name: file.name.clone(),
                            content_hash: file.content_hash.clone(),
                            size: file.size(),
                        });
                        outcomes.push(StageOutcome::Staged {
                            name: file.name.clone(),
                            content_hash: file.content_hash.clone(),
                        });
                        state.stage(file);
                    }
                }
                Err((name, err)) => {
                    warn!("候选文件处理失败: {}, 错误: {}", name, err);
                    outcomes.push(StageOutcome::Failed { name, error: err });
                }
            }
        }

        self.publish(BatchEvent::ListRefreshed {
            staged_count: state.staged_len(),
        });

        StageReport { outcomes }
    }

    /// 从本地路径批量暂存
    ///
    /// 读取失败的路径记为 Failed，不影响其余文件；结果保持输入顺序
    pub async fn stage_paths(&self, paths: Vec<PathBuf>) -> StageReport {
        // 文件内容并发读入内存，join_all 保持输入顺序
        let read_results = join_all(
            paths
                .into_iter()
                .map(|path| async move { (path.clone(), FileCandidate::from_path(&path).await) }),
        )
        .await;

        let mut slots: Vec<Result<Option<FileCandidate>, (String, String)>> = Vec::new();
        for (path, result) in read_results {
            match result {
                Ok(candidate) => slots.push(Ok(Some(candidate))),
                Err(e) => {
                    let name = path.to_string_lossy().to_string();
                    warn!("读取文件失败: {}, 错误: {}", name, e);
                    slots.push(Err((name, e.to_string())));
                }
            }
        }

        // 可读文件走正常暂存流程，读取失败按原位置插回结果
        let readable: Vec<FileCandidate> = slots
            .iter_mut()
            .filter_map(|slot| slot.as_mut().ok().and_then(|c| c.take()))
            .collect();
        let report = self.stage_candidates(readable).await;

        let mut staged_iter = report.outcomes.into_iter();
        let outcomes = slots
            .into_iter()
            .filter_map(|slot| match slot {
                Ok(_) => staged_iter.next(),
                Err((name, error)) => Some(StageOutcome::Failed { name, error }),
            })
            .collect();

        StageReport { outcomes }
    }

    /// 按索引移除暂存文件
    ///
    /// 移除不回收哈希：同一会话内重新添加相同内容仍会被判重，
    /// 直到一次提交成功后整体重置
    pub async fn remove_staged(&self, index: usize) -> Result<StagedFileInfo> {
        let mut state = self.state.lock().await;
        match state.remove(index) {
            Some(removed) => {
                info!("移除暂存文件: index={}, name={}", index, removed.name);
                self.publish(BatchEvent::Removed {
                    name: removed.name.clone(),
                    index,
                });
                self.publish(BatchEvent::ListRefreshed {
                    staged_count: state.staged_len(),
                });
                Ok(StagedFileInfo {
                    name: removed.name,
                    size: removed.content.len() as u64,
                    content_hash: removed.content_hash,
                })
            }
            None => {
                warn!("移除暂存文件失败: 索引 {} 越界", index);
                anyhow::bail!("索引 {} 越界, 当前暂存 {} 个文件", index, state.staged_len())
            }
        }
    }

    /// 提交整个批次
    ///
    /// 前置检查：暂存区非空、预计总量不超过配额。
    /// 检查通过后整批作为一次 multipart 请求原子发送；
    /// 成功则累计字节数并整体重置暂存区，失败则状态原样保留、可直接重试。
    /// 同一时刻至多一次提交在途，忙标志在所有退出路径上都会释放。
    pub async fn commit(&self) -> Result<CommitSummary, BatchError> {
        // 入口检查忙标志，抢不到就拒绝
        if self
            .committing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("提交被拒绝: 已有一次上传正在进行中");
            return Err(BatchError::CommitInFlight);
        }
        let _guard = CommitGuard {
            flag: &self.committing,
        };

        let mut state = self.state.lock().await;

        if state.staged().is_empty() {
            warn!("提交被拒绝: 暂存区为空");
            self.publish(BatchEvent::CommitRejected {
                reason: BatchError::EmptyBatch.to_string(),
            });
            return Err(BatchError::EmptyBatch);
        }

        let batch_bytes = state.staged_bytes();
        let file_count = state.staged_len();
        let projected = state.uploaded_bytes() + batch_bytes;

        if projected > self.quota_bytes {
            let err = BatchError::QuotaExceeded {
                projected,
                limit: self.quota_bytes,
            };
            warn!(
                "提交被拒绝: 配额不足, 已上传={} 字节, 本批次={} 字节, 上限={} 字节",
                state.uploaded_bytes(),
                batch_bytes,
                self.quota_bytes
            );
            self.publish(BatchEvent::CommitRejected {
                reason: err.to_string(),
            });
            return Err(err);
        }

        info!("开始提交批次: {} 个文件, {} 字节", file_count, batch_bytes);
        self.publish(BatchEvent::CommitStarted {
            file_count,
            batch_bytes,
        });

        match self.transport.upload_batch(state.staged()).await {
            Ok(receipt) => {
                state.finish_commit(batch_bytes);
                info!(
                    "批次提交成功: {} 个文件, 会话累计已上传 {} 字节",
                    file_count,
                    state.uploaded_bytes()
                );
                self.publish(BatchEvent::CommitCompleted {
                    file_count,
                    batch_bytes,
                    uploaded_bytes: state.uploaded_bytes(),
                });
                Ok(CommitSummary {
                    file_count,
                    batch_bytes,
                    accepted_files: receipt.files,
                })
            }
            Err(e) => {
                // 失败路径不碰状态：暂存文件原样保留，用户可直接重试
                let reason = format!("{:#}", e);
                error!("批次提交失败: {}", reason);
                self.publish(BatchEvent::CommitFailed {
                    reason: reason.clone(),
                });
                Err(BatchError::Transport(reason))
            }
        }
    }

    /// 暂存列表快照（不含内容）
    pub async fn staged_files(&self) -> Vec<StagedFileInfo> {
        self.state.lock().await.snapshot()
    }

    /// 暂存文件数
    pub async fn staged_len(&self) -> usize {
        self.state.lock().await.staged_len()
    }

    /// 已见哈希数
    pub async fn seen_hash_len(&self) -> usize {
        self.state.lock().await.seen_hash_len()
    }

    /// 暂存区总字节数
    pub async fn staged_bytes(&self) -> u64 {
        self.state.lock().await.staged_bytes()
    }

    /// 本会话累计已上传字节数
    pub async fn uploaded_bytes(&self) -> u64 {
        self.state.lock().await.uploaded_bytes()
    }

    /// 配额（字节）
    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }
}
