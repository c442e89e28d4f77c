// 存储用量统计
//
// 按扩展名把文件分为文档 / 图片 / 其他三类，
// 与面板后端 /api/storage 的口径一致

use crate::backend::{FileEntry, StorageUsage};

/// 文档类扩展名
const DOCUMENT_EXTS: [&str; 4] = [".doc", ".docx", ".pdf", ".txt"];
/// 图片类扩展名
const IMAGE_EXTS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".bmp"];

/// 存储用量汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageSummary {
    /// 文件总数
    pub files: u64,
    /// 文档数
    pub documents: u64,
    /// 图片数
    pub images: u64,
    /// 其他类型数
    pub others: u64,
    /// 已用字节数
    pub used_bytes: u64,
}

impl UsageSummary {
    /// 已用空间占配额的百分比（0.0 - 100.0，超额时截断到 100）
    pub fn percent_used(&self, quota_bytes: u64) -> f64 {
        if quota_bytes == 0 {
            return 100.0;
        }
        let percent = self.used_bytes as f64 / quota_bytes as f64 * 100.0;
        percent.min(100.0)
    }

    /// 配额剩余字节数（超额时为 0）
    pub fn remaining(&self, quota_bytes: u64) -> u64 {
        quota_bytes.saturating_sub(self.used_bytes)
    }

    /// 从后端 /api/storage 响应生成汇总（用于与本地口径对照）
    pub fn from_server(usage: &StorageUsage) -> Self {
        Self {
            files: usage.files,
            documents: usage.documents,
            images: usage.images,
            others: usage.others,
            used_bytes: usage.used_storage,
        }
    }
}

/// 文件是否归为文档类
fn is_document(name: &str) -> bool {
    let lower = name.to_lowercase();
    DOCUMENT_EXTS.iter().any(|ext| lower.ends_with(ext))
}

/// 文件是否归为图片类
fn is_image(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTS.iter().any(|ext| lower.ends_with(ext))
}

/// 在本地文件列表上计算用量汇总
pub fn summarize(entries: &[FileEntry]) -> UsageSummary {
    let mut summary = UsageSummary::default();

    for entry in entries {
        summary.files += 1;
        summary.used_bytes += entry.size;

        if is_document(&entry.name) {
            summary.documents += 1;
        } else if is_image(&entry.name) {
            summary.images += 1;
        } else {
            summary.others += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, size: u64) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            size,
            file_type: String::new(),
            last_modified: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_summarize_classification() {
        let entries = vec![
            entry("report.PDF", 100),
            entry("notes.txt", 50),
            entry("photo.jpeg", 200),
            entry("archive.zip", 400),
        ];

        let summary = summarize(&entries);
        assert_eq!(summary.files, 4);
        assert_eq!(summary.documents, 2);
        assert_eq!(summary.images, 1);
        assert_eq!(summary.others, 1);
        assert_eq!(summary.used_bytes, 750);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary, UsageSummary::default());
    }

    #[test]
    fn test_percent_used_and_remaining() {
        let summary = summarize(&[entry("a.bin", 512)]);
        assert!((summary.percent_used(1024) - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.remaining(1024), 512);

        // 超额截断
        assert!((summary.percent_used(256) - 100.0).abs() < f64::EPSILON);
        assert_eq!(summary.remaining(256), 0);
        assert!((summary.percent_used(0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_server() {
        let usage = StorageUsage {
            total_storage: 1024,
            used_storage: 100,
            files: 3,
            documents: 1,
            images: 1,
            others: 1,
        };
        let summary = UsageSummary::from_server(&usage);
        assert_eq!(summary.files, 3);
        assert_eq!(summary.used_bytes, 100);
    }
}
