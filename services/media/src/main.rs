use anyhow::Result;
use media::{CloudinaryClient, CloudinaryConfig, upload_local_file};
use std::path::PathBuf;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

/// Upload staged files given on the command line.
///
/// Each file is removed from local storage after its upload attempt.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .init();

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        anyhow::bail!("usage: media <staged-file>...");
    }

    let config = CloudinaryConfig::from_env()?;
    let client = CloudinaryClient::new(config);
    info!("Uploading {} staged file(s)", paths.len());

    let mut failures = 0;
    for path in &paths {
        match upload_local_file(&client, Some(path.as_path())).await {
            Some(descriptor) => println!("{}", descriptor.url),
            None => {
                warn!("No asset produced for {}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} uploads failed", failures, paths.len());
    }
    Ok(())
}
