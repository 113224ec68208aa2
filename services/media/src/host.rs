//! Remote asset host abstraction

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::models::AssetDescriptor;

/// Failure of a single upload attempt
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to read local file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request to asset host failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The host answered with a non-success status
    #[error("Asset host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// A remote service that stores uploaded files
#[async_trait]
pub trait AssetHost: Send + Sync {
    /// Upload a local file, letting the host detect its resource type
    async fn upload(&self, local_file_path: &Path) -> Result<AssetDescriptor, UploadError>;
}
