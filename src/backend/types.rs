// 面板后端API数据类型

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 文件信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// 文件名
    pub name: String,

    /// 文件大小（字节）
    pub size: u64,

    /// 文件类型（后端按扩展名给出）
    #[serde(rename = "type")]
    pub file_type: String,

    /// 最后修改时间（"YYYY-MM-DD HH:MM:SS" 格式字符串）
    pub last_modified: String,
}

impl FileEntry {
    /// 解析最后修改时间
    ///
    /// 后端给出 "2024-01-15 09:30:00" 这类格式；解析失败返回 None，
    /// 排序时按最早时间处理
    pub fn modified_time(&self) -> Option<NaiveDateTime> {
        let trimmed = self.last_modified.trim();
        NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
            .ok()
    }
}

/// 文件列表响应
#[derive(Debug, Deserialize)]
pub struct FileListResponse {
    /// 文件列表
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// 批次上传响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// 后端返回的提示信息
    #[serde(default)]
    pub message: String,

    /// 后端确认保存的文件名列表
    #[serde(default)]
    pub files: Vec<String>,
}

/// 下载链接响应
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadTicket {
    /// 带鉴权的下载URL
    pub download_url: String,

    /// 下载时使用的文件名
    pub filename: String,
}

/// 存储用量响应（/api/storage）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageUsage {
    /// 总配额（字节）
    #[serde(default, rename = "totalStorage")]
    pub total_storage: u64,

    /// 已用量（字节）
    #[serde(default, rename = "usedStorage")]
    pub used_storage: u64,

    /// 文件总数
    #[serde(default)]
    pub files: u64,

    /// 文档数
    #[serde(default)]
    pub documents: u64,

    /// 图片数
    #[serde(default)]
    pub images: u64,

    /// 其他类型数
    #[serde(default)]
    pub others: u64,
}

/// 后端错误响应体
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// 错误信息
    #[serde(default)]
    pub error: String,
}
