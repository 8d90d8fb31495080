pub mod editing;
pub mod error;
pub mod image;
pub mod sanitize;
pub mod serialize;

// Re-export key types for easier usage
pub use editing::*;
pub use error::*;
pub use image::{ImagePolicy, ImageUpload, read_image_file};
pub use sanitize::{SanitizePolicy, sanitize, sanitize_document};
pub use serialize::{plain_text, serialize};
