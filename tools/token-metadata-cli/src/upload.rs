//! Content-addressed uploads with a bounded, flat-delay retry.

use std::{path::Path, time::Duration};

use anyhow::Context as _;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::UploadSection;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file_name} is too large: {size} bytes (max {max} bytes)")]
    TooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },

    #[error("failed to build upload client: {0}")]
    Client(#[source] anyhow::Error),

    #[error("upload of {file_name} failed after {attempts} attempt(s): {source}")]
    Exhausted {
        file_name: String,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },
}

/// Limits applied to every upload of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_image_bytes: u64,
    /// At least 1
    pub retry_attempts: u32,
    pub timeout: Duration,
    /// Fixed wait between attempts; it does not grow with the attempt number.
    pub retry_delay: Duration,
}

impl From<&UploadSection> for UploadPolicy {
    fn from(section: &UploadSection) -> Self {
        Self {
            max_image_bytes: section.image_max_size,
            retry_attempts: section.retry_attempts,
            timeout: Duration::from_millis(section.timeout),
            retry_delay: Duration::from_millis(section.retry_delay),
        }
    }
}

/// A named byte buffer ready for upload.
#[derive(Clone, Debug)]
pub struct GenericFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl GenericFile {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Read a local file, deriving the content type from its extension.
    pub fn read(path: &Path) -> Result<Self, UploadError> {
        let bytes = std::fs::read(path).map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let content_type = content_type_for(&file_name);
        Ok(Self::new(bytes, file_name, content_type))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub uri: String,
    pub size_bytes: u64,
    pub content_type: String,
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// A store that returns a retrievable URI for uploaded bytes.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file: &GenericFile) -> anyhow::Result<String>;
}

/// Upload `file`, retrying failures up to `policy.retry_attempts` times in total.
///
/// Oversized input is rejected before any attempt. The last attempt's error is returned as
/// the source of [`UploadError::Exhausted`].
pub async fn upload(
    uploader: &dyn Uploader,
    file: &GenericFile,
    policy: &UploadPolicy,
) -> Result<UploadedAsset, UploadError> {
    let size = file.bytes.len() as u64;
    if size > policy.max_image_bytes {
        return Err(UploadError::TooLarge {
            file_name: file.file_name.clone(),
            size,
            max: policy.max_image_bytes,
        });
    }

    let attempts = policy.retry_attempts.max(1);
    let mut attempt = 1;
    loop {
        info!(
            file = %file.file_name,
            attempt,
            attempts,
            "uploading ({:.1} KB)",
            size as f64 / 1024.0
        );
        match uploader.upload(file).await {
            Ok(uri) => {
                info!(file = %file.file_name, %uri, "uploaded");
                return Ok(UploadedAsset {
                    uri,
                    size_bytes: size,
                    content_type: file.content_type.clone(),
                });
            }
            Err(source) if attempt >= attempts => {
                return Err(UploadError::Exhausted {
                    file_name: file.file_name.clone(),
                    attempts: attempt,
                    source,
                });
            }
            Err(e) => {
                warn!(file = %file.file_name, attempt, error = %e, "upload attempt failed, retrying");
                tokio::time::sleep(policy.retry_delay).await;
                attempt += 1;
            }
        }
    }
}

// === IPFS uploader ===

/// Upload endpoint settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Base URL of a Kubo-compatible IPFS HTTP API
    pub endpoint: String,
    /// Base URL that serves `/<cid>`
    pub gateway: String,
    /// Sent as a bearer token when present
    pub api_key: Option<String>,
}

impl StorageConfig {
    pub const DEFAULT_GATEWAY: &'static str = "https://ipfs.io/ipfs";
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// [`Uploader`] over the IPFS `POST /api/v0/add` API.
pub struct IpfsUploader {
    http: reqwest::Client,
    storage: StorageConfig,
}

impl IpfsUploader {
    pub fn new(storage: StorageConfig, timeout: Duration) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Client(e.into()))?;
        Ok(Self { http, storage })
    }

    fn add_url(&self) -> String {
        format!(
            "{}/api/v0/add?cid-version=1&pin=true",
            self.storage.endpoint.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Uploader for IpfsUploader {
    async fn upload(&self, file: &GenericFile) -> anyhow::Result<String> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut req = self.http.post(self.add_url()).multipart(form);
        if let Some(key) = self.storage.api_key.as_ref() {
            req = req.bearer_auth(key);
        }

        let res = req
            .send()
            .await
            .with_context(|| format!("POST {}", self.storage.endpoint))?
            .error_for_status()?;
        let added: AddResponse = res.json().await.context("decode add response")?;
        anyhow::ensure!(!added.hash.is_empty(), "add response carried no CID");

        Ok(format!(
            "{}/{}",
            self.storage.gateway.trim_end_matches('/'),
            added.hash
        ))
    }
}
