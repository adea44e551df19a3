// Uploaded image validation and storage for posts, profiles and products.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::config::MediaConfig;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Image data is not valid base64.")]
    Encoding,

    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    InvalidImage,

    #[error("Image size larger than {limit}!")]
    TooLarge { limit: String },

    #[error("Image width larger than {max}px!")]
    TooWide { max: u32 },

    #[error("Image height larger than {max}px!")]
    TooTall { max: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// JSON image payload: `{"filename": "...", "data": "<base64>"}`
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpload {
    #[serde(default)]
    pub filename: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub extension: &'static str,
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url: String,
    max_bytes: usize,
    max_dimension: u32,
}

impl MediaStorage {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            url: config.url.trim_end_matches('/').to_string(),
            max_bytes: config.max_image_bytes,
            max_dimension: config.max_image_dimension,
        }
    }

    /// Size is checked before the image header is read
    pub fn validate(&self, bytes: &[u8]) -> Result<ImageInfo, MediaError> {
        if bytes.len() > self.max_bytes {
            return Err(MediaError::TooLarge {
                limit: size_label(self.max_bytes),
            });
        }

        let reader = image::io::Reader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|_| MediaError::InvalidImage)?;
        let extension = reader
            .format()
            .and_then(|format| format.extensions_str().first().copied())
            .ok_or(MediaError::InvalidImage)?;
        let (width, height) = reader.into_dimensions().map_err(|_| MediaError::InvalidImage)?;

        if height > self.max_dimension {
            return Err(MediaError::TooTall { max: self.max_dimension });
        }
        if width > self.max_dimension {
            return Err(MediaError::TooWide { max: self.max_dimension });
        }

        Ok(ImageInfo { width, height, extension })
    }

    /// Decode, validate and persist an upload, returning the stored location
    pub async fn store(&self, upload: &ImageUpload) -> Result<String, MediaError> {
        let bytes = decode_payload(&upload.data)?;
        let info = self.validate(&bytes)?;

        let file_name = format!("{}.{}", Uuid::new_v4(), info.extension);
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&file_name), &bytes).await?;

        tracing::info!(
            "Stored image {} ({}x{}, {} bytes, uploaded as {:?})",
            file_name,
            info.width,
            info.height,
            bytes.len(),
            upload.filename
        );
        Ok(format!("{}/{}", self.url, file_name))
    }
}

/// Accepts bare base64 or a `data:<mime>;base64,` URL
fn decode_payload(data: &str) -> Result<Vec<u8>, MediaError> {
    let encoded = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    STANDARD.decode(encoded.trim()).map_err(|_| MediaError::Encoding)
}

/// Whole megabytes where exact, otherwise one decimal; kilobytes below 1 MiB
fn size_label(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= MIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{}KB", bytes.div_ceil(KIB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};

    fn storage(root: PathBuf) -> MediaStorage {
        MediaStorage {
            root,
            url: "/media".to_string(),
            max_bytes: 2 * 1024 * 1024,
            max_dimension: 4096,
        }
    }

    fn encode(width: u32, height: u32, format: ImageOutputFormat) -> Vec<u8> {
        let img = ImageBuffer::from_pixel(width, height, Rgb([200u8, 40, 90]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn rejects_oversized_payload_before_decoding() {
        let bytes = vec![0u8; 3 * 1024 * 1024];
        let err = storage(PathBuf::from("unused")).validate(&bytes).unwrap_err();
        assert_eq!(err.to_string(), "Image size larger than 2MB!");
    }

    #[test]
    fn limit_label_never_rounds_to_zero() {
        assert_eq!(size_label(2 * 1024 * 1024), "2MB");
        assert_eq!(size_label(1536 * 1024), "1.5MB");
        assert_eq!(size_label(500 * 1024), "500KB");
        assert_eq!(size_label(1000), "1KB");

        let mut media = storage(PathBuf::from("unused"));
        media.max_bytes = 512 * 1024;
        let err = media.validate(&vec![0u8; 600 * 1024]).unwrap_err();
        assert_eq!(err.to_string(), "Image size larger than 512KB!");
    }

    #[test]
    fn accepts_one_mebibyte_image() {
        // 600x600 RGB bitmap is just over 1 MiB uncompressed
        let bytes = encode(600, 600, ImageOutputFormat::Bmp);
        assert!(bytes.len() > 1024 * 1024);
        let info = storage(PathBuf::from("unused")).validate(&bytes).unwrap();
        assert_eq!((info.width, info.height, info.extension), (600, 600, "bmp"));
    }

    #[test]
    fn rejects_dimensions_over_limit() {
        let media = storage(PathBuf::from("unused"));
        let wide = encode(4097, 1, ImageOutputFormat::Png);
        assert!(matches!(media.validate(&wide), Err(MediaError::TooWide { max: 4096 })));
        let tall = encode(1, 4097, ImageOutputFormat::Png);
        assert!(matches!(media.validate(&tall), Err(MediaError::TooTall { max: 4096 })));
    }

    #[test]
    fn rejects_non_images() {
        let err = storage(PathBuf::from("unused")).validate(b"plain text").unwrap_err();
        assert!(matches!(err, MediaError::InvalidImage));
        assert!(matches!(decode_payload("***"), Err(MediaError::Encoding)));
    }

    #[tokio::test]
    async fn store_writes_file_under_media_root() {
        let root = std::env::temp_dir().join(format!("social-api-media-{}", Uuid::new_v4()));
        let media = storage(root.clone());
        let upload = ImageUpload {
            filename: "pic.png".to_string(),
            data: format!("data:image/png;base64,{}", STANDARD.encode(encode(8, 8, ImageOutputFormat::Png))),
        };

        let location = media.store(&upload).await.unwrap();
        assert!(location.starts_with("/media/"));
        assert!(location.ends_with(".png"));

        let file_name = location.trim_start_matches("/media/");
        assert!(root.join(file_name).exists());
        std::fs::remove_dir_all(root).unwrap();
    }
}
