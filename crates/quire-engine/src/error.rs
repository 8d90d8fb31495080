use std::path::PathBuf;

/// Bad input to a command. The document is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Link URL is empty")]
    EmptyUrl,
    #[error("Link URL must start with http:// or https://: {0}")]
    InvalidUrl(String),
    #[error("Unsupported image type: {0}")]
    UnsupportedImageType(String),
    #[error("Image is {size} bytes, the limit is {limit}")]
    ImageTooLarge { size: usize, limit: usize },
    #[error("Image file is empty")]
    EmptyImage,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Editor is read-only")]
    ReadOnly,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Reading an image file and inserting it.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("Failed to read image at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Edit(#[from] EditError),
}
