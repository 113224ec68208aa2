use common::ConfigError;
use common::config::{optional_env, required_env};

const DEFAULT_UPLOAD_URL: &str = "https://api.cloudinary.com";
const SIGNATURE_ALGORITHM: &str = "CLOUDINARY_SIGNATURE_ALGORITHM";

/// Digest used to sign upload parameters
///
/// Accounts sign with SHA-1 unless SHA-256 was selected in their security
/// settings; the two must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl std::str::FromStr for SignatureAlgorithm {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            _ => Err(()),
        }
    }
}

/// Cloudinary account configuration
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Base URL of the upload API
    pub upload_url: String,
    pub signature_algorithm: SignatureAlgorithm,
}

impl CloudinaryConfig {
    /// Create a new CloudinaryConfig from environment variables
    ///
    /// # Environment Variables
    /// - `CLOUDINARY_CLOUDNAME`: cloud name of the account
    /// - `CLOUDINARY_API_KEY`: API key
    /// - `CLOUDINARY_API_SECRET`: API secret used to sign uploads
    /// - `CLOUDINARY_UPLOAD_URL`: upload API base (default: "https://api.cloudinary.com")
    /// - `CLOUDINARY_SIGNATURE_ALGORITHM`: `sha1` or `sha256` (default: "sha1")
    pub fn from_env() -> Result<Self, ConfigError> {
        let signature_algorithm = match optional_env(SIGNATURE_ALGORITHM) {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: SIGNATURE_ALGORITHM,
                value,
            })?,
            None => SignatureAlgorithm::default(),
        };

        Ok(Self {
            cloud_name: required_env("CLOUDINARY_CLOUDNAME")?,
            api_key: required_env("CLOUDINARY_API_KEY")?,
            api_secret: required_env("CLOUDINARY_API_SECRET")?,
            upload_url: optional_env("CLOUDINARY_UPLOAD_URL")
                .unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string()),
            signature_algorithm,
        })
    }

    /// Endpoint for uploads with automatic resource type detection
    pub fn auto_upload_endpoint(&self) -> String {
        format!(
            "{}/v1_1/{}/auto/upload",
            self.upload_url.trim_end_matches('/'),
            self.cloud_name
        )
    }
}
