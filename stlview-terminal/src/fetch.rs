/// Local file fetcher for model URLs
use std::path::PathBuf;
use stlview_core::{Fetch, FetchError};

/// Reads model bytes from the local filesystem.
///
/// Accepts plain paths and `file://` URLs. Network schemes are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn resolve(url: &str) -> Result<PathBuf, FetchError> {
        let lower = url.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Err(FetchError::UnsupportedUrl(url.to_string()));
        }

        let path = url.strip_prefix("file://").unwrap_or(url);
        if path.is_empty() {
            return Err(FetchError::UnsupportedUrl(url.to_string()));
        }
        Ok(PathBuf::from(path))
    }
}

impl Fetch for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let path = Self::resolve(url)?;
        std::fs::read(&path).map_err(|e| FetchError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
