// 面板后端客户端实现

use crate::backend::{
    ApiErrorBody, DownloadTicket, FileEntry, FileListResponse, StorageUsage, UploadReceipt,
};
use crate::config::BackendConfig;
use crate::uploader::{BatchTransport, StagedFile};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 面板后端客户端
///
/// 所有接口共用一个启用了 Cookie 管理的 HTTP 客户端，
/// 登录会话 Cookie 由服务器下发后自动携带
#[derive(Debug, Clone)]
pub struct DashboardClient {
    /// HTTP客户端
    client: Client,
    /// 后端基地址（不含末尾斜杠）
    base_url: String,
}

impl DashboardClient {
    /// 创建新的后端客户端
    ///
    /// # 参数
    /// * `config` - 后端连接配置（基地址、超时、可选的预置会话 Cookie）
    pub fn new(config: &BackendConfig) -> Result<Self> {
        use reqwest::cookie::Jar;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let url = base_url
            .parse::<reqwest::Url>()
            .context(format!("后端基地址无效: {}", base_url))?;

        // 如果配置里带了已有会话 Cookie，先写入 Cookie Jar
        let jar = Arc::new(Jar::default());
        if let Some(ref session_cookie) = config.session_cookie {
            jar.add_cookie_str(session_cookie, &url);
            info!("已预置会话 Cookie");
        }

        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        info!("初始化面板后端客户端成功: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    /// 拼接接口地址
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 从失败响应中提取后端错误信息
    ///
    /// 后端约定返回 `{"error": "..."}`；解析不出来就退回原始响应文本
    async fn extract_error(resp: reqwest::Response) -> String {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) if !parsed.error.is_empty() => parsed.error,
            _ if !body.is_empty() => body,
            _ => format!("HTTP {}", status),
        }
    }

    /// 获取文件列表
    pub async fn list_files(&self) -> Result<Vec<FileEntry>> {
        let resp = self
            .client
            .get(self.url("/files/list"))
            .send()
            .await
            .context("获取文件列表请求失败")?;

        if !resp.status().is_success() {
            let msg = Self::extract_error(resp).await;
            anyhow::bail!("获取文件列表失败: {}", msg);
        }

        let list: FileListResponse = resp.json().await.context("解析文件列表响应失败")?;
        debug!("获取文件列表成功: {} 个文件", list.files.len());
        Ok(list.files)
    }

    /// 获取存储用量
    pub async fn storage_usage(&self) -> Result<StorageUsage> {
        let resp = self
            .client
            .get(self.url("/api/storage"))
            .send()
            .await
            .context("获取存储用量请求失败")?;

        if !resp.status().is_success() {
            let msg = Self::extract_error(resp).await;
            anyhow::bail!("获取存储用量失败: {}", msg);
        }

        resp.json().await.context("解析存储用量响应失败")
    }

    /// 获取文件的下载链接
    ///
    /// 文件名作为路径段传输，需要先做百分号编码
    pub async fn download_ticket(&self, file_name: &str) -> Result<DownloadTicket> {
        let encoded = urlencoding::encode(file_name);
        let resp = self
            .client
            .get(self.url(&format!("/files/download/{}", encoded)))
            .send()
            .await
            .context(format!("获取下载链接请求失败: {}", file_name))?;

        if resp.status() == StatusCode::NOT_FOUND {
            anyhow::bail!("文件不存在: {}", file_name);
        }
        if !resp.status().is_success() {
            let msg = Self::extract_error(resp).await;
            anyhow::bail!("获取下载链接失败: {}", msg);
        }

        let ticket: DownloadTicket = resp.json().await.context("解析下载链接响应失败")?;
        info!("下载链接已就绪: {}", ticket.filename);
        Ok(ticket)
    }

    /// 删除文件
    pub async fn delete_file(&self, file_name: &str) -> Result<()> {
        let encoded = urlencoding::encode(file_name);
        let resp = self
            .client
            .delete(self.url(&format!("/files/delete/{}", encoded)))
            .send()
            .await
            .context(format!("删除文件请求失败: {}", file_name))?;

        if !resp.status().is_success() {
            let msg = Self::extract_error(resp).await;
            warn!("删除文件失败: name={}, 错误: {}", file_name, msg);
            anyhow::bail!("删除文件失败: {}", msg);
        }

        info!("文件已删除: {}", file_name);
        Ok(())
    }

    /// 提交整个上传批次
    ///
    /// 所有暂存文件打包为一次 multipart 请求（字段名统一为 "files"），
    /// 后端视为一次原子调用：要么全部接受，要么整体失败
    pub async fn upload_files(&self, files: &[StagedFile]) -> Result<UploadReceipt> {
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.content.clone())
                .file_name(file.name.clone())
                .mime_str("application/octet-stream")
                .context("构造 multipart 分片失败")?;
            form = form.part("files", part);
        }

        debug!(
            "发送批次上传请求: {} 个文件, {} 字节",
            files.len(),
            files.iter().map(|f| f.size()).sum::<u64>()
        );

        let resp = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .context("批次上传请求失败")?;

        if !resp.status().is_success() {
            let msg = Self::extract_error(resp).await;
            anyhow::bail!("后端拒绝上传: {}", msg);
        }

        let receipt: UploadReceipt = resp.json().await.context("解析上传响应失败")?;
        info!(
            "批次上传成功: {} 个文件, message={}",
            receipt.files.len(),
            receipt.message
        );
        Ok(receipt)
    }
}

#[async_trait]
impl BatchTransport for DashboardClient {
    async fn upload_batch(&self, files: &[StagedFile]) -> Result<UploadReceipt> {
        self.upload_files(files).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    fn test_config() -> BackendConfig {
        BackendConfig {
            base_url: "http://localhost:5000/".to_string(),
            timeout_secs: 5,
            session_cookie: None,
        }
    }

    #[test]
    fn test_client_creation_strips_trailing_slash() {
        let client = DashboardClient::new(&test_config()).unwrap();
        assert_eq!(client.url("/files/list"), "http://localhost:5000/files/list");
    }

    #[test]
    fn test_client_creation_with_session_cookie() {
        let mut config = test_config();
        config.session_cookie = Some("session=abc123; Path=/".to_string());
        assert!(DashboardClient::new(&config).is_ok());
    }

    #[test]
    fn test_client_creation_invalid_base_url() {
        let mut config = test_config();
        config.base_url = "not a url".to_string();
        assert!(DashboardClient::new(&config).is_err());
    }

    #[test]
    fn test_download_path_encoding() {
        let client = DashboardClient::new(&test_config()).unwrap();
        // 含空格和中文的文件名必须编码后再拼入路径
        let encoded = urlencoding::encode("年度 报告.pdf");
        let url = client.url(&format!("/files/download/{}", encoded));
        assert!(!url.contains(' '));
        assert!(url.contains("%20"));
    }
}
