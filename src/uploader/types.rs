// 上传暂存模块类型定义

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 候选文件（已读入内存的完整内容，尚未去重）
#[derive(Debug, Clone)]
pub struct FileCandidate {
    /// 显示用文件名
    pub name: String,
    /// 完整文件内容
    pub content: Vec<u8>,
}

impl FileCandidate {
    /// 从内存内容创建候选文件
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// 从本地文件读取候选文件（一次性读入全部内容）
    pub async fn from_path(path: &Path) -> Result<Self> {
        let content = tokio::fs::read(path)
            .await
            .context(format!("无法读取文件: {:?}", path))?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Ok(Self { name, content })
    }

    /// 文件大小（字节）
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// 已暂存文件（内容哈希计算完成且通过去重检查）
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// 文件名
    pub name: String,
    /// 完整文件内容
    pub content: Vec<u8>,
    /// SHA-256 内容哈希（64 位小写十六进制）
    pub content_hash: String,
}

impl StagedFile {
    /// 文件大小（字节）
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// 暂存文件摘要（不含内容，供 UI 展示）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedFileInfo {
    /// 文件名
    pub name: String,
    /// 文件大小（字节）
    pub size: u64,
    /// 内容哈希
    pub content_hash: String,
}

/// 单个候选文件的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// 已加入暂存区
    Staged { name: String, content_hash: String },
    /// 重复内容，已忽略
    Duplicate { name: String, content_hash: String },
    /// 哈希计算或读取失败，已跳过（不影响同批次其他文件）
    Failed { name: String, error: String },
}

impl StageOutcome {
    /// 获取文件名
    pub fn name(&self) -> &str {
        match self {
            StageOutcome::Staged { name, .. } => name,
            StageOutcome::Duplicate { name, .. } => name,
            StageOutcome::Failed { name, .. } => name,
        }
    }
}

/// 一次批量暂存操作的结果汇总
///
/// 部分成功是正常情况：一部分文件入列，另一部分被判重或失败
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    /// 按输入顺序排列的逐文件结果
    pub outcomes: Vec<StageOutcome>,
}

impl StageReport {
    /// 成功入列的文件数
    pub fn staged_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StageOutcome::Staged { .. }))
            .count()
    }

    /// 被判重忽略的文件数
    pub fn duplicate_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StageOutcome::Duplicate { .. }))
            .count()
    }

    /// 处理失败的文件数
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StageOutcome::Failed { .. }))
            .count()
    }
}

/// 批次提交成功的结果
#[derive(Debug, Clone)]
pub struct CommitSummary {
    /// 本批次文件数
    pub file_count: usize,
    /// 本批次总字节数
    pub batch_bytes: u64,
    /// 后端确认保存的文件名列表
    pub accepted_files: Vec<String>,
}

/// 批次操作错误类型
///
/// 所有错误均可恢复，不会破坏暂存区状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// 内容重复（同会话内已暂存过相同哈希）
    DuplicateContent(String),
    /// 暂存区为空，无可提交内容
    EmptyBatch,
    /// 预计总量超过存储配额
    QuotaExceeded { projected: u64, limit: u64 },
    /// 已有一次提交在进行中
    CommitInFlight,
    /// 网络或后端错误（暂存区保持原样，可重试）
    Transport(String),
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::DuplicateContent(name) => write!(f, "检测到重复文件: {}", name),
            BatchError::EmptyBatch => write!(f, "没有可上传的文件"),
            BatchError::QuotaExceeded { projected, limit } => {
                write!(f, "总存储量将达到 {} 字节，超过 {} 字节上限，不允许上传", projected, limit)
            }
            BatchError::CommitInFlight => write!(f, "已有一次上传正在进行中"),
            BatchError::Transport(msg) => write!(f, "上传失败: {}", msg),
        }
    }
}

impl std::error::Error for BatchError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_candidate_from_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"hello filebox").unwrap();
        temp_file.flush().unwrap();

        let candidate = FileCandidate::from_path(temp_file.path()).await.unwrap();
        assert_eq!(candidate.size(), 13);
        assert_eq!(candidate.content, b"hello filebox");
    }

    #[tokio::test]
    async fn test_candidate_from_missing_path() {
        let result = FileCandidate::from_path(Path::new("/nonexistent/file.bin")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_stage_report_counts() {
        let report = StageReport {
            outcomes: vec![
                StageOutcome::Staged {
                    name: "a".to_string(),
                    content_hash: "0".repeat(64),
                },
                StageOutcome::Duplicate {
                    name: "b".to_string(),
                    content_hash: "0".repeat(64),
                },
                StageOutcome::Failed {
                    name: "c".to_string(),
                    error: "读取失败".to_string(),
                },
            ],
        };

        assert_eq!(report.staged_count(), 1);
        assert_eq!(report.duplicate_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.outcomes[1].name(), "b");
    }

    #[test]
    fn test_batch_error_display() {
        let err = BatchError::QuotaExceeded {
            projected: 100,
            limit: 50,
        };
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));

        assert_eq!(BatchError::EmptyBatch.to_string(), "没有可上传的文件");
    }
}
