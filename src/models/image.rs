//! Image format detection and decoding.
//!
//! The format of an uploaded payload is inferred from its content, never
//! from a filename extension: the bytes are sniffed by signature and then
//! fully decoded, so a payload that merely carries a PNG header but is
//! otherwise garbage is rejected up front.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Image formats accepted for upload. Thumbnails are always re-encoded as
/// JPEG regardless of the source format.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("error processing the image: {0}")]
    Undecodable(#[source] image::ImageError),
    #[error("invalid image format `{0}`, only PNG and JPEG formats are allowed")]
    UnsupportedFormat(String),
}

impl ImageFormat {
    /// Lowercase extension used when deriving storage keys.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }

    /// MIME type served alongside the raw bytes (`image/{extension}`).
    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Resolve a key extension back to a format. Only the exact lowercase
    /// extensions this service emits are recognized (`jpg` is not `jpeg`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(ImageFormat::Png),
            "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Sniff and fully decode an image payload.
///
/// - Unrecognizable or corrupt bytes return [`ImageError::Undecodable`].
/// - Recognized formats outside {PNG, JPEG} return
///   [`ImageError::UnsupportedFormat`] without decoding further.
pub fn decode_image(bytes: &[u8]) -> Result<(ImageFormat, image::DynamicImage), ImageError> {
    let sniffed = image::guess_format(bytes).map_err(ImageError::Undecodable)?;
    let format = match sniffed {
        image::ImageFormat::Png => ImageFormat::Png,
        image::ImageFormat::Jpeg => ImageFormat::Jpeg,
        other => return Err(ImageError::UnsupportedFormat(other.to_mime_type().to_string())),
    };
    let pixels = image::load_from_memory_with_format(bytes, sniffed)
        .map_err(ImageError::Undecodable)?;
    Ok((format, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded(format: image::ImageFormat) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(8, 4, image::Rgb([10, 120, 200]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn detects_png_and_jpeg_from_content() {
        let (fmt, pixels) = decode_image(&encoded(image::ImageFormat::Png)).unwrap();
        assert_eq!(fmt, ImageFormat::Png);
        assert_eq!((pixels.width(), pixels.height()), (8, 4));

        let (fmt, _) = decode_image(&encoded(image::ImageFormat::Jpeg)).unwrap();
        assert_eq!(fmt, ImageFormat::Jpeg);
    }

    #[test]
    fn rejects_recognized_but_disallowed_formats() {
        // A GIF signature is enough for sniffing to identify the format.
        let gif_header = b"GIF89a\x01\x00\x01\x00\x80\x00\x00";
        match decode_image(gif_header) {
            Err(ImageError::UnsupportedFormat(mime)) => assert_eq!(mime, "image/gif"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }

        let bmp_header = b"BM\x3a\x00\x00\x00\x00\x00\x00\x00";
        assert!(matches!(
            decode_image(bmp_header),
            Err(ImageError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn rejects_undecodable_payloads() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(ImageError::Undecodable(_))
        ));

        // Valid PNG signature followed by garbage must fail the full decode.
        let mut truncated = encoded(image::ImageFormat::Png);
        truncated.truncate(12);
        assert!(matches!(
            decode_image(&truncated),
            Err(ImageError::Undecodable(_))
        ));
    }
}
