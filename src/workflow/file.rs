//! Image files selected for upload

use crate::error::Result;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Content type used when neither the extension nor the bytes identify the file
const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// An image selected for label generation
///
/// Holds the raw bytes together with the file name and content type that are
/// sent in the multipart upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageFile {
    /// Create an image file from its parts
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read an image from disk
    ///
    /// The content type comes from the extension, falling back to sniffing the
    /// leading bytes when the extension is missing or unknown.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
        let content_type = detect_content_type(path, &bytes);
        debug!(
            "Read {} ({} bytes, {})",
            path.display(),
            bytes.len(),
            content_type
        );
        Ok(Self::new(name, content_type, bytes))
    }

    /// File name sent alongside the upload
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw file contents
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file has no contents
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn detect_content_type(path: &Path, bytes: &[u8]) -> String {
    image::ImageFormat::from_path(path)
        .or_else(|_| image::guess_format(bytes))
        .map_or_else(
            |_| UNKNOWN_CONTENT_TYPE.to_string(),
            |format| format.to_mime_type().to_string(),
        )
}
