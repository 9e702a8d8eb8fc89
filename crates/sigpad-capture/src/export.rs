//! PNG export of a trimmed signature.
//!
//! The encoded payload is a `data:image/png;base64,...` URL: the form the host
//! page can drop into an `<img>` and the stamping service accepts as-is.

use crate::trim::{PixelRect, TrimmedImage};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use sigpad_core::{ImageRef, SignError};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// A signature ready to be placed and cached.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSignature {
    pub image: ImageRef,
    /// Pixel width of the trimmed raster.
    pub width: u32,
    /// Pixel height of the trimmed raster.
    pub height: u32,
    /// Source region on the capture surface.
    pub bounds: PixelRect,
}

impl CapturedSignature {
    pub fn from_trimmed(trimmed: &TrimmedImage) -> Result<Self, SignError> {
        let image = encode_png_data_url(&trimmed.image)?;
        Ok(Self {
            image,
            width: trimmed.image.width(),
            height: trimmed.image.height(),
            bounds: trimmed.bounds,
        })
    }
}

/// Encode an RGBA raster as a PNG `data:` URL.
pub fn encode_png_data_url(img: &RgbaImage) -> Result<ImageRef, SignError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
        .map_err(|e| SignError::Encode(e.to_string()))?;
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len() * 4 / 3 + 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    B64.encode_string(&png, &mut url);
    Ok(ImageRef::new(url))
}
