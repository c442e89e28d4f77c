// 文件列表模块
//
// 已上传文件的列表视图：刷新、排序、搜索、按名去重，
// 以及删除确认和存储用量统计

pub mod delete;
pub mod stats;

use crate::backend::{DashboardClient, DownloadTicket, FileEntry};
use anyhow::Result;
use chrono::NaiveDateTime;
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub use delete::{DeleteCoordinator, DeleteToken, FileRemover};
pub use stats::{summarize, UsageSummary};

/// 列表排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// 按文件名升序（忽略大小写）
    #[default]
    Name,
    /// 按大小降序（大文件在前）
    Size,
    /// 按类型升序
    Type,
    /// 按修改时间降序（最新在前）
    Date,
}

impl SortKey {
    /// 从页面下拉框的取值解析排序方式
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(SortKey::Name),
            "size" => Some(SortKey::Size),
            "type" => Some(SortKey::Type),
            "date" => Some(SortKey::Date),
            _ => None,
        }
    }
}

/// 按指定方式对文件列表原地排序
///
/// 修改时间解析失败的条目按最早时间处理，排在时间排序的末尾
pub fn sort_entries(entries: &mut [FileEntry], key: SortKey) {
    match key {
        SortKey::Name => {
            entries.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
        SortKey::Size => {
            entries.sort_by(|a, b| b.size.cmp(&a.size));
        }
        SortKey::Type => {
            entries.sort_by(|a, b| a.file_type.to_lowercase().cmp(&b.file_type.to_lowercase()));
        }
        SortKey::Date => {
            entries.sort_by(|a, b| {
                let ta = a.modified_time().unwrap_or(NaiveDateTime::UNIX_EPOCH);
                let tb = b.modified_time().unwrap_or(NaiveDateTime::UNIX_EPOCH);
                tb.cmp(&ta)
            });
        }
    }
}

/// 按文件名模糊搜索（忽略大小写的子串匹配）
pub fn search_entries(entries: &[FileEntry], query: &str) -> Vec<FileEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.to_vec();
    }
    entries
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// 按文件名去重，保留首次出现的条目，顺序不变
pub fn dedup_by_name(entries: Vec<FileEntry>) -> Vec<FileEntry> {
    let mut seen: HashSet<String> = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.name.clone()))
        .collect()
}

/// 格式化文件大小为人类可读字符串
///
/// 与页面展示保持一致："0 Bytes"、"1.5 KB"、"2.35 MB"，
/// 保留两位小数并去掉无意义的尾零
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exp = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exp as i32);

    let mut text = format!("{:.2}", value);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }

    format!("{} {}", text, UNITS[exp])
}

/// 文件列表管理器
///
/// 持有后端客户端和最近一次拉取的列表缓存，
/// 排序和搜索都在缓存上进行，不重复请求后端
pub struct FileListManager {
    /// 后端客户端
    client: DashboardClient,
    /// 最近一次拉取的文件列表
    entries: Mutex<Vec<FileEntry>>,
}

impl FileListManager {
    /// 创建文件列表管理器
    pub fn new(client: DashboardClient) -> Self {
        Self {
            client,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// 从后端刷新文件列表
    ///
    /// 后端偶尔会返回重名条目，这里按名去重后再缓存
    pub async fn refresh(&self) -> Result<Vec<FileEntry>> {
        let fetched = self.client.list_files().await?;
        let deduped = dedup_by_name(fetched);
        info!("文件列表已刷新: {} 个文件", deduped.len());

        let mut entries = self.entries.lock().await;
        *entries = deduped.clone();
        Ok(deduped)
    }

    /// 当前缓存的列表按指定方式排序后返回
    pub async fn sorted(&self, key: SortKey) -> Vec<FileEntry> {
        let entries = self.entries.lock().await;
        let mut view = entries.clone();
        sort_entries(&mut view, key);
        view
    }

    /// 在当前缓存中按名搜索
    pub async fn search(&self, query: &str) -> Vec<FileEntry> {
        let entries = self.entries.lock().await;
        let result = search_entries(&entries, query);
        debug!("搜索 \"{}\": 命中 {} 个文件", query, result.len());
        result
    }

    /// 当前缓存的条目数
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// 缓存是否为空
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// 获取文件的下载链接
    pub async fn download_ticket(&self, file_name: &str) -> Result<DownloadTicket> {
        self.client.download_ticket(file_name).await
    }
}
