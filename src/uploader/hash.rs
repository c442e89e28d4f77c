// 内容哈希计算
//
// 去重依据是文件完整内容的 SHA-256（小写十六进制），
// 与文件名无关：同名不同内容视为不同文件，不同名同内容视为重复

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// 哈希十六进制字符串长度（SHA-256 = 32 字节 = 64 个字符）
pub const HASH_HEX_LEN: usize = 64;

/// 同步计算内容哈希
///
/// 内容已全部在内存中，按当前规模无需流式分块
pub fn digest_sync(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// 异步计算内容哈希
///
/// 摘要计算放入阻塞线程池，避免大文件卡住调度器；
/// 内容随结果一并返回，调用方无需提前克隆
///
/// # 参数
/// * `content` - 完整文件内容
///
/// # 返回
/// (原内容, 内容哈希)
pub async fn digest_content(content: Vec<u8>) -> Result<(Vec<u8>, String)> {
    tokio::task::spawn_blocking(move || {
        let hash = digest_sync(&content);
        (content, hash)
    })
    .await
    .context("哈希计算任务执行失败")
}
