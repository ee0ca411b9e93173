//! 上传处理器

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    response::Json,
};
use tracing::debug;

use super::model::UploadedFile;
use crate::core::error::{ApiError, ApiResult};
use crate::AppState;

/// 每个请求只接受一个文件字段，非文件字段被忽略
pub async fn upload_image(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadedFile>> {
    let mut multipart = multipart.map_err(|rejection| ApiError::Upload(rejection.body_text()))?;
    let mut file: Option<(String, String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.body_text()))?
    {
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if file.is_some() {
            return Err(ApiError::Upload(
                "Only one file can be uploaded per request".to_string(),
            ));
        }

        let field_name = field.name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Upload(e.body_text()))?;
        file = Some((field_name, original_name, content_type, data.to_vec()));
    }

    let (field_name, original_name, content_type, data) =
        file.ok_or_else(|| ApiError::Upload("No file found in request".to_string()))?;

    debug!(product_id = %product_id, "收到上传文件");
    let uploaded = state
        .uploads
        .store(field_name, original_name, content_type, &data)
        .await?;

    Ok(Json(uploaded))
}
