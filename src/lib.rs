// FileBox Rust Library
// 个人文件存储面板 Rust 客户端核心库

// 配置管理模块
pub mod config;

// 日志模块
pub mod logging;

// 面板后端API模块
pub mod backend;

// 上传批次模块
pub mod uploader;

// 文件列表模块
pub mod filelist;

// 事件通知模块
pub mod events;

// 导出常用类型
pub use backend::{DashboardClient, DownloadTicket, FileEntry, StorageUsage, UploadReceipt};
pub use config::{AppConfig, BackendConfig, LogConfig, UploadConfig};
pub use events::{BatchEvent, EventPriority, NoticeLevel};
pub use filelist::{
    format_file_size, DeleteCoordinator, FileListManager, FileRemover, SortKey, UsageSummary,
};
pub use uploader::{
    BatchError, BatchTransport, CommitSummary, FileCandidate, StageOutcome, StageReport,
    StagedFile, StagedFileInfo, UploadBatchManager, DEFAULT_QUOTA_BYTES,
};
