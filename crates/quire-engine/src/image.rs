//! Images uploaded by the user and the policy they are checked against.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{ImageLoadError, ValidationError};

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Which images may enter the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePolicy {
    pub max_bytes: usize,
    /// MIME subtypes of `image/*`, e.g. `png`.
    pub allowed_types: Vec<String>,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        ImagePolicy {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
            allowed_types: ["png", "jpeg", "gif", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ImagePolicy {
    /// True for `image/<subtype>` with an allowed subtype; `jpg` counts as
    /// `jpeg`.
    pub fn allows_mime(&self, mime: &str) -> bool {
        let mime = mime.trim().to_ascii_lowercase();
        let Some(subtype) = mime.strip_prefix("image/") else {
            return false;
        };
        let subtype = if subtype == "jpg" { "jpeg" } else { subtype };
        self.allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(subtype))
    }

    pub fn validate(&self, upload: &ImageUpload) -> Result<(), ValidationError> {
        if upload.bytes.is_empty() {
            return Err(ValidationError::EmptyImage);
        }
        if !self.allows_mime(&upload.mime) {
            return Err(ValidationError::UnsupportedImageType(upload.mime.clone()));
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(ValidationError::ImageTooLarge {
                size: upload.bytes.len(),
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Image file contents picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImageUpload {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// `data:` URI embedding the bytes.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime.trim().to_ascii_lowercase(),
            STANDARD.encode(&self.bytes)
        )
    }

    /// Alt text: the file name without its extension.
    pub fn alt(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Guess an image MIME type from a file extension.
pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Read an image file into an upload. The MIME type is guessed from the
/// extension; unknown extensions get `application/octet-stream`, which no
/// policy accepts.
pub fn read_image_file(path: &Path) -> Result<ImageUpload, ImageLoadError> {
    let bytes = std::fs::read(path).map_err(|source| ImageLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mime = mime_from_extension(path).unwrap_or("application/octet-stream");
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    log::debug!("read {} bytes of {mime} from {}", bytes.len(), path.display());
    Ok(ImageUpload::new(file_name, mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("image/png", true)]
    #[case("IMAGE/JPG", true)]
    #[case("image/webp", true)]
    #[case("image/svg+xml", false)]
    #[case("text/html", false)]
    #[case("png", false)]
    fn default_policy_mime_types(#[case] mime: &str, #[case] allowed: bool) {
        assert_eq!(ImagePolicy::default().allows_mime(mime), allowed);
    }

    #[test]
    fn validation_order() {
        let policy = ImagePolicy {
            max_bytes: 4,
            ..ImagePolicy::default()
        };
        let empty = ImageUpload::new("a.png", "image/png", vec![]);
        assert_eq!(policy.validate(&empty), Err(ValidationError::EmptyImage));

        let pdf = ImageUpload::new("a.pdf", "application/pdf", vec![1]);
        assert_eq!(
            policy.validate(&pdf),
            Err(ValidationError::UnsupportedImageType("application/pdf".into()))
        );

        let big = ImageUpload::new("a.png", "image/png", vec![0; 5]);
        assert_eq!(
            policy.validate(&big),
            Err(ValidationError::ImageTooLarge { size: 5, limit: 4 })
        );

        let ok = ImageUpload::new("a.png", "image/png", vec![0; 4]);
        assert_eq!(policy.validate(&ok), Ok(()));
    }

    #[test]
    fn data_uri_and_alt() {
        let upload = ImageUpload::new("cat photo.png", "image/PNG", b"hi".to_vec());
        assert_eq!(upload.data_uri(), "data:image/png;base64,aGk=");
        assert_eq!(upload.alt(), "cat photo");
    }

    #[test]
    fn read_file_guesses_mime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pixel.JPG");
        std::fs::write(&path, [0xff, 0xd8]).unwrap();

        let upload = read_image_file(&path).unwrap();
        assert_eq!(upload.mime, "image/jpeg");
        assert_eq!(upload.file_name, "pixel.JPG");
        assert_eq!(upload.bytes, vec![0xff, 0xd8]);
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_image_file(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, ImageLoadError::Io { .. }));
    }
}
