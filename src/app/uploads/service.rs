//! 上传业务服务

use std::path::{Path, PathBuf};

use tracing::{error, info};
use uuid::Uuid;

use super::model::UploadedFile;
use crate::core::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct UploadService {
    uploads_dir: PathBuf,
}

impl UploadService {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// 以服务端生成的文件名保存内容，原始文件名只作为元数据返回
    pub async fn store(
        &self,
        field_name: String,
        original_name: String,
        content_type: Option<String>,
        data: &[u8],
    ) -> ApiResult<UploadedFile> {
        let stored_as = storage_key(&original_name);

        tokio::fs::create_dir_all(&self.uploads_dir)
            .await
            .map_err(|e| {
                error!(dir = %self.uploads_dir.display(), "无法创建上传目录: {}", e);
                upload_failed()
            })?;
        tokio::fs::write(self.uploads_dir.join(&stored_as), data)
            .await
            .map_err(|e| {
                error!(stored_as = %stored_as, "无法保存上传文件: {}", e);
                upload_failed()
            })?;

        info!(original = %original_name, stored_as = %stored_as, size = data.len(), "文件已上传");

        Ok(UploadedFile {
            field_name,
            original_name,
            stored_as,
            content_type,
            size: data.len(),
        })
    }
}

/// 内部 I/O 错误只记日志，客户端收到固定信息
fn upload_failed() -> ApiError {
    ApiError::Upload(UPLOAD_FAILED.to_string())
}

const UPLOAD_FAILED: &str = "Failed to store uploaded file";

/// `<uuid>` 加上原文件名中安全的扩展名
fn storage_key(original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 16)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}
