//! Cloudinary upload client
//!
//! Uploads are signed requests to the `auto` upload endpoint, so the host
//! decides whether a file is an image, a video or a raw asset. Signatures
//! use SHA-1 unless the configuration selects SHA-256, which the account
//! must be set up for as well.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use crate::config::{CloudinaryConfig, SignatureAlgorithm};
use crate::host::{AssetHost, UploadError};
use crate::models::{AssetDescriptor, HostErrorBody};

/// Cloudinary implementation of [`AssetHost`]
#[derive(Clone)]
pub struct CloudinaryClient {
    http: Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    /// Create a client with a default HTTP client
    pub fn new(config: CloudinaryConfig) -> Self {
        Self::with_http_client(Client::new(), config)
    }

    pub fn with_http_client(http: Client, config: CloudinaryConfig) -> Self {
        Self { http, config }
    }

    /// Sign upload parameters
    ///
    /// Parameters are sorted by name, joined as `key=value` pairs with `&`,
    /// suffixed with the API secret and hashed with the configured
    /// [`SignatureAlgorithm`].
    pub fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut params = params.to_vec();
        params.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        match self.config.signature_algorithm {
            SignatureAlgorithm::Sha1 => digest::<Sha1>(&to_sign, &self.config.api_secret),
            SignatureAlgorithm::Sha256 => digest::<Sha256>(&to_sign, &self.config.api_secret),
        }
    }

    async fn build_form(&self, local_file_path: &Path) -> Result<Form, UploadError> {
        let contents = tokio::fs::read(local_file_path).await?;
        let file_name = local_file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
            .to_string();
        let signature = self.sign(&[("timestamp", timestamp.as_str())]);

        Ok(Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .part("file", Part::bytes(contents).file_name(file_name)))
    }
}

fn digest<D: Digest>(to_sign: &str, secret: &str) -> String {
    let mut hasher = D::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl AssetHost for CloudinaryClient {
    async fn upload(&self, local_file_path: &Path) -> Result<AssetDescriptor, UploadError> {
        let form = self.build_form(local_file_path).await?;
        let endpoint = self.config.auto_upload_endpoint();
        info!("Uploading {} to {}", local_file_path.display(), endpoint);

        let response = self.http.post(&endpoint).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<HostErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let descriptor = response.json::<AssetDescriptor>().await?;
        Ok(descriptor)
    }
}
