use std::time::Duration;
use async_trait::async_trait;
use chrono::Utc;
use image::ImageFormat;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;
use pm_core::{MAX_UPLOAD_BYTES, ValidationError};

const ALLOWED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage request failed: {0}")]
    Request(String),
    #[error("Storage rejected upload: {0}")]
    Rejected(String),
}

/// A user supplied image that passed type and size checks
#[derive(Debug, Clone)]
pub struct Upload {
    bytes: Vec<u8>,
    format: ImageFormat,
    file_name: Option<String>,
}

impl Upload {
    /// Validate raw upload bytes. The format is sniffed from the content;
    /// a declared content type, when given, must also be an image type.
    pub fn new(
        bytes: Vec<u8>,
        declared_type: Option<&str>,
        file_name: Option<String>,
    ) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ValidationError::FileTooLarge(bytes.len()));
        }

        if declared_type.is_some_and(|declared| !declared.starts_with("image/")) {
            return Err(ValidationError::UnsupportedFileType);
        }

        let format = image::guess_format(&bytes).map_err(|_| ValidationError::UnsupportedFileType)?;
        if !ALLOWED_FORMATS.contains(&format) {
            return Err(ValidationError::UnsupportedFileType);
        }

        Ok(Self { bytes, format, file_name })
    }

    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("bin")
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Fresh object key: `uploads/<unix millis>-<uuid>.<ext>`
    pub fn object_key(&self) -> String {
        format!(
            "uploads/{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            self.extension()
        )
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Object storage reachable by the generation service
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return a public HTTPS URL for it
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError>;
}

/// Store an upload under a fresh key
pub async fn store_upload(store: &dyn ObjectStore, upload: Upload) -> Result<String, StorageError> {
    let key = upload.object_key();
    let content_type = upload.content_type();
    debug!(%key, size = upload.len(), file_name = ?upload.file_name(), "uploading image");

    let url = store.put(&key, upload.into_bytes(), content_type).await?;
    info!(%url, "image uploaded");
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base URL objects are PUT to
    pub endpoint: String,
    /// Base URL objects are served from
    pub public_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

/// Object store speaking plain HTTP PUT
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    config: StorageConfig,
}

impl HttpObjectStore {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::Request(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        let url = format!("{}/{}", self.config.endpoint.trim_end_matches('/'), key);

        let mut request = self
            .client
            .put(&url)
            .header("Content-Type", content_type)
            .body(bytes);
        if let Some(token) = &self.config.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected(format!("HTTP {}: {}", status, body)));
        }

        Ok(format!("{}/{}", self.config.public_url.trim_end_matches('/'), key))
    }
}
