use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptor the asset host returns for a stored upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Public URL of the stored asset
    pub url: String,
    pub secure_url: Option<String>,
    pub public_id: Option<String>,
    /// `image`, `video` or `raw`, as detected by the host
    pub resource_type: Option<String>,
    pub format: Option<String>,
    pub bytes: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Playback length in seconds for audio and video
    pub duration: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HostErrorBody {
    pub error: HostErrorMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HostErrorMessage {
    pub message: String,
}
