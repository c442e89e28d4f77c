//! 批次事件类型定义
//!
//! 定义上传暂存区和文件列表相关的事件类型，供 UI 层订阅后渲染提示信息

use serde::{Deserialize, Serialize};

/// 事件优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventPriority {
    /// 低优先级：列表刷新
    Low = 0,
    /// 中优先级：暂存区变更
    Medium = 1,
    /// 高优先级：提交完成、失败等关键事件
    High = 2,
}

/// 提示级别（对应前端 toast 的四种样式）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// 一般信息
    Info,
    /// 操作成功
    Success,
    /// 警告（可恢复）
    Warning,
    /// 错误
    Error,
}

impl NoticeLevel {
    /// 获取级别名称
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// 上传批次事件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BatchEvent {
    /// 文件已加入暂存区
    Staged {
        name: String,
        content_hash: String,
        size: u64,
    },
    /// 重复内容被拒绝（不改变暂存区状态）
    DuplicateRejected {
        name: String,
        content_hash: String,
    },
    /// 暂存文件被移除
    Removed { name: String, index: usize },
    /// 暂存区列表变更（UI 需要重新渲染）
    ListRefreshed { staged_count: usize },
    /// 批次提交开始
    CommitStarted { file_count: usize, batch_bytes: u64 },
    /// 批次提交被拒绝（未发起网络请求）
    CommitRejected { reason: String },
    /// 批次提交成功
    CommitCompleted {
        file_count: usize,
        batch_bytes: u64,
        /// 本会话累计已上传字节数（提交后）
        uploaded_bytes: u64,
    },
    /// 批次提交失败（暂存区保持原样，可重试）
    CommitFailed { reason: String },
}

impl BatchEvent {
    /// 获取事件优先级
    pub fn priority(&self) -> EventPriority {
        match self {
            BatchEvent::ListRefreshed { .. } => EventPriority::Low,
            BatchEvent::Staged { .. }
            | BatchEvent::DuplicateRejected { .. }
            | BatchEvent::Removed { .. }
            | BatchEvent::CommitStarted { .. } => EventPriority::Medium,
            BatchEvent::CommitRejected { .. }
            | BatchEvent::CommitCompleted { .. }
            | BatchEvent::CommitFailed { .. } => EventPriority::High,
        }
    }

    /// 获取提示级别
    pub fn notice_level(&self) -> NoticeLevel {
        match self {
            BatchEvent::Staged { .. } | BatchEvent::ListRefreshed { .. } => NoticeLevel::Info,
            BatchEvent::DuplicateRejected { .. }
            | BatchEvent::Removed { .. }
            | BatchEvent::CommitRejected { .. } => NoticeLevel::Warning,
            BatchEvent::CommitStarted { .. } => NoticeLevel::Info,
            BatchEvent::CommitCompleted { .. } => NoticeLevel::Success,
            BatchEvent::CommitFailed { .. } => NoticeLevel::Error,
        }
    }

    /// 获取事件类型名称
    pub fn event_type_name(&self) -> &'static str {
        match self {
            BatchEvent::Staged { .. } => "staged",
            BatchEvent::DuplicateRejected { .. } => "duplicate_rejected",
            BatchEvent::Removed { .. } => "removed",
            BatchEvent::ListRefreshed { .. } => "list_refreshed",
            BatchEvent::CommitStarted { .. } => "commit_started",
            BatchEvent::CommitRejected { .. } => "commit_rejected",
            BatchEvent::CommitCompleted { .. } => "commit_completed",
            BatchEvent::CommitFailed { .. } => "commit_failed",
        }
    }

    /// 生成用户可见的提示文案
    pub fn user_message(&self) -> String {
        match self {
            BatchEvent::Staged { name, .. } => format!("已加入上传列表: {}", name),
            BatchEvent::DuplicateRejected { name, .. } => {
                format!("检测到重复文件: {} 已忽略", name)
            }
            BatchEvent::Removed { name, .. } => format!("已移除: {}", name),
            BatchEvent::ListRefreshed { staged_count } => {
                format!("待上传文件: {} 个", staged_count)
            }
            BatchEvent::CommitStarted { file_count, .. } => {
                format!("正在上传 {} 个文件 .....", file_count)
            }
            BatchEvent::CommitRejected { reason } => reason.clone(),
            BatchEvent::CommitCompleted { file_count, .. } => {
                format!("{} 个文件上传成功!", file_count)
            }
            BatchEvent::CommitFailed { reason } => format!("文件上传失败: {}", reason),
        }
    }
}
