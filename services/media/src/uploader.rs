//! Push locally staged files to the asset host

use std::path::Path;
use tracing::{error, info, warn};

use crate::host::AssetHost;
use crate::models::AssetDescriptor;

/// Upload a staged temp file and remove it afterwards
///
/// Returns `None` without touching the filesystem or the network when no
/// path is given. Otherwise the local file is deleted once the upload
/// attempt resolves, whether it succeeded or not. Upload failures are
/// logged and reported as `None`; callers treat `None` as "no asset was
/// produced".
pub async fn upload_local_file<H>(
    host: &H,
    local_file_path: Option<&Path>,
) -> Option<AssetDescriptor>
where
    H: AssetHost + ?Sized,
{
    let path = local_file_path.filter(|path| !path.as_os_str().is_empty())?;

    let result = host.upload(path).await;
    remove_local_file(path).await;

    match result {
        Ok(descriptor) => {
            info!("File is uploaded to asset host: {}", descriptor.url);
            Some(descriptor)
        }
        Err(e) => {
            error!("Error in uploading {} to asset host: {}", path.display(), e);
            None
        }
    }
}

async fn remove_local_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Failed to remove local file {}: {}", path.display(), e);
    }
}
