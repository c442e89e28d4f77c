// 上传批次模块
//
// 页面会话级的上传管线：
// - 内容寻址判重（SHA-256，同内容只暂存一次）
// - 暂存区管理（插入顺序展示，按索引移除）
// - 原子批次提交（一次 multipart 请求，全部成功或整体失败）
// - 20 GiB 会话配额预检

pub mod batch;
pub mod hash;
pub mod manager;
pub mod types;

pub use batch::{BatchState, DEFAULT_QUOTA_BYTES};
pub use hash::{digest_content, digest_sync, HASH_HEX_LEN};
pub use manager::{BatchTransport, UploadBatchManager};
pub use types::{
    BatchError, CommitSummary, FileCandidate, StageOutcome, StageReport, StagedFile,
    StagedFileInfo,
};
