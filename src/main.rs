use anyhow::Result;
use filebox_rust::{
    config::AppConfig,
    filelist::{self, FileListManager, SortKey},
    logging, DashboardClient, UploadBatchManager,
};
use std::sync::Arc;
use tracing::info;

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load_or_default(CONFIG_PATH).await;
    let _log_guard = logging::init_logging(&config.log);

    info!("FileBox 客户端启动: 后端={}", config.backend.base_url);

    let client = DashboardClient::new(&config.backend)?;
    let manager =
        UploadBatchManager::with_quota(Arc::new(client.clone()), config.upload.quota_bytes);
    let list = FileListManager::new(client.clone());

    // 启动时拉一次列表和用量，确认后端可达
    let entries = list.refresh().await?;
    let sorted = list.sorted(SortKey::Date).await;
    for entry in &sorted {
        info!(
            "{}  {}  {}",
            entry.name,
            filelist::format_file_size(entry.size),
            entry.last_modified
        );
    }

    let summary = filelist::summarize(&entries);
    info!(
        "共 {} 个文件（文档 {} / 图片 {} / 其他 {}），已用 {}，配额 {}",
        summary.files,
        summary.documents,
        summary.images,
        summary.others,
        filelist::format_file_size(summary.used_bytes),
        filelist::format_file_size(manager.quota_bytes()),
    );

    Ok(())
}
