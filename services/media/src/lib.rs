//! Media upload helper for the Vidtube backend
//!
//! Files staged on local storage (avatars, cover images, videos) are pushed
//! to Cloudinary; the staged copy is removed after every upload attempt.

pub mod cloudinary;
pub mod config;
pub mod host;
pub mod models;
pub mod uploader;

pub use cloudinary::CloudinaryClient;
pub use config::{CloudinaryConfig, SignatureAlgorithm};
pub use host::{AssetHost, UploadError};
pub use models::AssetDescriptor;
pub use uploader::upload_local_file;
