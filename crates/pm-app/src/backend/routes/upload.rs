use std::sync::Arc;
use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use tracing::info;
use pm_core::ValidationError;
use crate::backend::schemas::UploadResponse;
use crate::error::AppError;
use crate::storage::Upload;
use crate::studio::Studio;

/// A file part of a multipart form, not yet validated
pub(super) struct FileField {
    bytes: Vec<u8>,
    content_type: Option<String>,
    file_name: Option<String>,
}

impl FileField {
    pub(super) async fn read(field: Field<'_>) -> Result<Self, AppError> {
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?.to_vec();

        Ok(Self { bytes, content_type, file_name })
    }

    pub(super) fn into_upload(self) -> Result<Upload, ValidationError> {
        info!(
            file_name = ?self.file_name,
            size = self.bytes.len(),
            content_type = ?self.content_type,
            "received image"
        );
        Upload::new(self.bytes, self.content_type.as_deref(), self.file_name)
    }
}

pub async fn upload_file(
    State(studio): State<Arc<Studio>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            file = Some(FileField::read(field).await?);
        }
    }

    let upload = file.ok_or(ValidationError::MissingImage)?.into_upload()?;
    let url = studio.upload(upload).await?;

    Ok(Json(UploadResponse {
        success: true,
        url,
        message: "File uploaded successfully".to_string(),
    }))
}
