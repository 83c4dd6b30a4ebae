//! Image payloads delivered by the interpreter's image blit events.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};

use crate::error::{ConvertError, Result};

/// Pixel layout of a decoded raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Gray8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }

    fn color_type(self) -> ColorType {
        match self {
            PixelFormat::Gray8 => ColorType::L8,
            PixelFormat::Rgb8 => ColorType::Rgb8,
            PixelFormat::Rgba8 => ColorType::Rgba8,
        }
    }
}

/// Codec of an encoded image resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageCodec {
    Png,
    Jpeg,
}

impl ImageCodec {
    /// File extension used in resource names.
    pub const fn extension(self) -> &'static str {
        match self {
            ImageCodec::Png => "png",
            ImageCodec::Jpeg => "jpg",
        }
    }

    /// Format label of the multimedia resource entry.
    pub const fn format_name(self) -> &'static str {
        match self {
            ImageCodec::Png => "PNG",
            ImageCodec::Jpeg => "JPEG",
        }
    }
}

/// Image handed to `on_image`.
#[derive(Debug, Clone)]
pub enum ImageData {
    /// Decoded pixels, re-encoded as PNG before registration.
    Raster {
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: Vec<u8>,
    },
    /// Already encoded bytes (e.g. a DCTDecode stream) passed through as is.
    Encoded { codec: ImageCodec, bytes: Vec<u8> },
}

impl ImageData {
    /// Produce the bytes stored in the resource manifest.
    pub fn encode(&self) -> Result<(Vec<u8>, ImageCodec)> {
        match self {
            ImageData::Raster {
                width,
                height,
                format,
                pixels,
            } => {
                let expected = (*width as usize)
                    .checked_mul(*height as usize)
                    .and_then(|n| n.checked_mul(format.bytes_per_pixel()));
                if *width == 0 || *height == 0 || expected != Some(pixels.len()) {
                    return Err(ConvertError::ImageEncode(format!(
                        "{width}x{height} {format:?} raster with {} bytes",
                        pixels.len()
                    )));
                }
                let mut png = Vec::new();
                PngEncoder::new(&mut png)
                    .write_image(pixels, *width, *height, format.color_type().into())
                    .map_err(|e| ConvertError::ImageEncode(e.to_string()))?;
                Ok((png, ImageCodec::Png))
            }
            ImageData::Encoded { codec, bytes } => {
                if bytes.is_empty() {
                    return Err(ConvertError::ImageEncode("empty encoded image".into()));
                }
                Ok((bytes.clone(), *codec))
            }
        }
    }
}
