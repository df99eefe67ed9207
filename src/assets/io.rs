use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{AssetError, Error, Result};

/// Asynchronous byte source for asset files, local or remote.
pub trait AssetReader: Send + Sync {
    /// Reads the resource at `uri`, relative to the reader's root.
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Reads files below a root directory.
#[derive(Debug)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(path.display().to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Fetches resources relative to a base URL.
#[cfg(feature = "http")]
#[derive(Debug)]
pub struct HttpAssetReader {
    root_url: url::Url,
}

#[cfg(feature = "http")]
impl HttpAssetReader {
    /// A base URL not ending in `/` is treated as a file and its last path
    /// segment dropped.
    pub fn new(url_str: &str) -> Result<Self> {
        let url = url::Url::parse(url_str)?;
        let root_url = if url.path().ends_with('/') {
            url
        } else {
            let mut u = url.clone();
            if let Ok(mut segments) = u.path_segments_mut() {
                segments.pop();
                segments.push("");
            }
            u
        };
        Ok(Self { root_url })
    }

    #[inline]
    #[must_use]
    pub fn root_url(&self) -> &url::Url {
        &self.root_url
    }
}

#[cfg(feature = "http")]
impl AssetReader for HttpAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let url = self.root_url.join(uri)?;
        let response = ehttp::fetch_async(ehttp::Request::get(url.as_str()))
            .await
            .map_err(Error::Http)?;
        if !response.ok {
            return Err(AssetError::HttpStatus {
                status: response.status,
                url: url.to_string(),
            }
            .into());
        }
        Ok(response.bytes)
    }
}

/// Closed set of readers, so loads can be spawned without boxing.
#[derive(Debug, Clone)]
pub enum AssetReaderVariant {
    File(Arc<FileAssetReader>),
    #[cfg(feature = "http")]
    Http(Arc<HttpAssetReader>),
}

impl AssetReaderVariant {
    #[must_use]
    pub fn is_url(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    /// Picks a reader for a directory path or a base URL.
    pub fn from_source(source: &str) -> Result<Self> {
        if Self::is_url(source) {
            #[cfg(feature = "http")]
            {
                Ok(Self::Http(Arc::new(HttpAssetReader::new(source)?)))
            }
            #[cfg(not(feature = "http"))]
            {
                Err(Error::InvalidConfig(format!(
                    "'{source}' is a URL but the `http` feature is disabled"
                )))
            }
        } else {
            Ok(Self::File(Arc::new(FileAssetReader::new(source))))
        }
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            Self::File(r) => r.read_bytes(uri).await,
            #[cfg(feature = "http")]
            Self::Http(r) => r.read_bytes(uri).await,
        }
    }
}

/// Directory part of a relative uri including the trailing `/`, or `""`.
#[must_use]
pub fn parent_dir(uri: &str) -> &str {
    uri.rfind('/').map_or("", |i| &uri[..=i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_dir_keeps_trailing_slash() {
        assert_eq!(parent_dir("models/gltf/Walking.glb"), "models/gltf/");
        assert_eq!(parent_dir("Walking.glb"), "");
    }

    #[cfg(feature = "http")]
    #[test]
    fn http_root_drops_file_segment() {
        let reader = HttpAssetReader::new("https://example.com/assets/index.html").unwrap();
        assert_eq!(reader.root_url().as_str(), "https://example.com/assets/");
        let joined = reader.root_url().join("models/gltf/Punching Bag.glb").unwrap();
        assert_eq!(joined.path(), "/assets/models/gltf/Punching%20Bag.glb");
    }
}
