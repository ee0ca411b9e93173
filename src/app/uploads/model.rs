//! 上传文件元数据

use serde::Serialize;

/// 上传成功后回显的文件信息
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub field_name: String,
    pub original_name: String,
    /// 服务端生成的存储文件名
    pub stored_as: String,
    pub content_type: Option<String>,
    pub size: usize,
}
