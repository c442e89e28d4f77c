// 面板后端API模块

pub mod client;
pub mod types;

pub use client::DashboardClient;
pub use types::{
    ApiErrorBody, DownloadTicket, FileEntry, FileListResponse, StorageUsage, UploadReceipt,
};
