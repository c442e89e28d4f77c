// 暂存区状态
//
// 对应页面会话中的三份共享可变状态：
// - 待上传文件列表（插入顺序即展示顺序）
// - 本会话已见过的内容哈希集合
// - 本会话累计已上传字节数
//
// 状态只在进程内存中存活，进程重启后清零（已知限制，不在此修复）

use crate::uploader::types::{StagedFile, StagedFileInfo};
use std::collections::HashSet;

/// 默认存储配额：20 GiB
pub const DEFAULT_QUOTA_BYTES: u64 = 20 * 1024 * 1024 * 1024;

/// 上传暂存区状态
#[derive(Debug, Default)]
pub struct BatchState {
    /// 暂存文件列表（插入顺序）
    staged: Vec<StagedFile>,
    /// 本会话已见过的内容哈希
    seen_hashes: HashSet<String>,
    /// 本会话累计已上传字节数
    uploaded_bytes: u64,
}

impl BatchState {
    /// 创建空状态
    pub fn new() -> Self {
        Self::default()
    }

    /// 暂存文件列表
    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    /// 暂存文件数
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// 已见哈希数
    pub fn seen_hash_len(&self) -> usize {
        self.seen_hashes.len()
    }

    /// 暂存区总字节数
    pub fn staged_bytes(&self) -> u64 {
        self.staged.iter().map(|f| f.size()).sum()
    }

    /// 本会话累计已上传字节数
    pub fn uploaded_bytes(&self) -> u64 {
        self.uploaded_bytes
    }

    /// 该哈希在本会话中是否已出现过
    pub fn is_duplicate(&self, content_hash: &str) -> bool {
        self.seen_hashes.contains(content_hash)
    }

    /// 将文件加入暂存区
    ///
    /// 调用方必须先通过 `is_duplicate` 检查；重复哈希直接拒绝，状态不变
    pub fn stage(&mut self, file: StagedFile) -> bool {
        if self.seen_hashes.contains(&file.content_hash) {
            return false;
        }
        self.seen_hashes.insert(file.content_hash.clone());
        self.staged.push(file);
        true
    }

    /// 按索引移除暂存文件
    ///
    /// 哈希保留在已见集合中：移除后重新添加相同内容仍会被判重，
    /// 直到一次提交成功后整体重置
    pub fn remove(&mut self, index: usize) -> Option<StagedFile> {
        if index >= self.staged.len() {
            return None;
        }
        Some(self.staged.remove(index))
    }

    /// 提交成功后的整体重置
    ///
    /// 累计字节数增加本批次大小，文件列表和哈希集合清空，
    /// 之前暂存过的内容此后可以重新添加
    pub fn finish_commit(&mut self, batch_bytes: u64) {
        self.uploaded_bytes += batch_bytes;
        self.staged.clear();
        self.seen_hashes.clear();
    }

    /// 生成不含内容的暂存列表快照（供 UI 展示）
    pub fn snapshot(&self) -> Vec<StagedFileInfo> {
        self.staged
            .iter()
            .map(|f| StagedFileInfo {
                name: f.name.clone(),
                size: f.size(),
                content_hash: f.content_hash.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploader::hash::digest_sync;

    fn staged_file(name: &str, content: &[u8]) -> StagedFile {
        StagedFile {
            name: name.to_string(),
            content: content.to_vec(),
            content_hash: digest_sync(content),
        }
    }

    #[test]
    fn test_stage_distinct_files() {
        let mut state = BatchState::new();
        assert!(state.stage(staged_file("a.txt", b"alpha")));
        assert!(state.stage(staged_file("b.txt", b"beta")));
        assert!(state.stage(staged_file("c.txt", b"gamma")));

        assert_eq!(state.staged_len(), 3);
        assert_eq!(state.seen_hash_len(), 3);
        assert_eq!(state.staged_bytes(), 5 + 4 + 5);
        // 展示顺序 = 插入顺序
        assert_eq!(state.staged()[0].name, "a.txt");
        assert_eq!(state.staged()[2].name, "c.txt");
    }

    #[test]
    fn test_stage_rejects_duplicate_content() {
        let mut state = BatchState::new();
        assert!(state.stage(staged_file("a.txt", b"same bytes")));
        // 文件名不同但内容相同，仍判重
        assert!(!state.stage(staged_file("b.txt", b"same bytes")));

        assert_eq!(state.staged_len(), 1);
        assert_eq!(state.seen_hash_len(), 1);
    }

    #[test]
    fn test_remove_keeps_hash_blocked() {
        let mut state = BatchState::new();
        state.stage(staged_file("a.txt", b"alpha"));
        state.stage(staged_file("b.txt", b"beta"));

        let removed = state.remove(0).unwrap();
        assert_eq!(removed.name, "a.txt");
        assert_eq!(state.staged_len(), 1);
        assert_eq!(state.staged()[0].name, "b.txt");

        // 哈希仍被占用，重新添加相同内容会被判重
        assert_eq!(state.seen_hash_len(), 2);
        assert!(!state.stage(staged_file("a.txt", b"alpha")));
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut state = BatchState::new();
        state.stage(staged_file("a.txt", b"alpha"));
        assert!(state.remove(5).is_none());
        assert_eq!(state.staged_len(), 1);
    }

    #[test]
    fn test_finish_commit_resets_everything() {
        let mut state = BatchState::new();
        state.stage(staged_file("a.txt", &[0u8; 1024]));
        state.stage(staged_file("b.txt", &[1u8; 2048]));

        let batch_bytes = state.staged_bytes();
        state.finish_commit(batch_bytes);

        assert_eq!(state.uploaded_bytes(), 3072);
        assert_eq!(state.staged_len(), 0);
        assert_eq!(state.seen_hash_len(), 0);
        // 重置后相同内容可以再次暂存
        assert!(state.stage(staged_file("a.txt", &[0u8; 1024])));
    }

    #[test]
    fn test_uploaded_bytes_accumulates_across_commits() {
        let mut state = BatchState::new();
        state.stage(staged_file("a.txt", &[0u8; 100]));
        state.finish_commit(100);
        state.stage(staged_file("b.txt", &[1u8; 200]));
        state.finish_commit(200);

        assert_eq!(state.uploaded_bytes(), 300);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // 任意内容序列：接受当且仅当内容首次出现，字节数与去重后的内容总量一致
            #[test]
            fn staging_dedups_by_content(
                contents in proptest::collection::vec(
                    proptest::collection::vec(any::<u8>(), 0..64),
                    0..16,
                )
            ) {
                let mut state = BatchState::new();
                let mut seen = std::collections::HashSet::new();
                let mut expected_bytes: u64 = 0;

                for (i, content) in contents.iter().enumerate() {
                    let accepted = state.stage(staged_file(&format!("f{}.bin", i), content));
                    let fresh = seen.insert(content.clone());
                    prop_assert_eq!(accepted, fresh);
                    if fresh {
                        expected_bytes += content.len() as u64;
                    }
                }

                prop_assert_eq!(state.staged_len(), seen.len());
                prop_assert_eq!(state.staged_bytes(), expected_bytes);

                // 提交后整体清零，累计字节数只增不减
                let batch_bytes = state.staged_bytes();
                state.finish_commit(batch_bytes);
                prop_assert_eq!(state.uploaded_bytes(), expected_bytes);
                prop_assert_eq!(state.staged_len(), 0);
                prop_assert_eq!(state.seen_hash_len(), 0);
            }
        }
    }

    #[test]
    fn test_snapshot_excludes_content() {
        let mut state = BatchState::new();
        state.stage(staged_file("a.txt", b"alpha"));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name, "a.txt");
        assert_eq!(snapshot[0].size, 5);
        assert_eq!(snapshot[0].content_hash, digest_sync(b"alpha"));
    }
}
