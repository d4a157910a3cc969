// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster images — decoding encoded buffers into an RGBA pixel grid and
// re-encoding them as JPEG/PNG at a validated quality factor.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use scanmaster_core::error::{Result, ScanmasterError};
use scanmaster_core::types::{EncodedImage, has_data_url_prefix};
use tracing::{debug, instrument};

/// Quality used when re-encoding after a filter.
pub const FILTER_QUALITY: Quality = Quality(0.85);
/// Quality used after rotation, watermarking, and signing.
pub const OVERLAY_QUALITY: Quality = Quality(0.9);
/// Quality used by `compress` when the caller gives none.
pub const DEFAULT_COMPRESS_QUALITY: Quality = Quality(0.5);

/// A lossy quality factor in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    pub fn new(factor: f32) -> Result<Self> {
        if factor.is_finite() && factor > 0.0 && factor <= 1.0 {
            Ok(Self(factor))
        } else {
            Err(ScanmasterError::InvalidParameter(format!(
                "quality must be in (0, 1], got {factor}"
            )))
        }
    }

    pub fn factor(&self) -> f32 {
        self.0
    }

    /// JPEG encoder quality (1-100).
    pub fn jpeg_percent(&self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        DEFAULT_COMPRESS_QUALITY
    }
}

/// A decoded image: a non-empty grid of RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    /// Wrap a pixel buffer. Width and height must both be positive.
    pub fn new(pixels: RgbaImage) -> Result<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(ScanmasterError::InvalidParameter(format!(
                "image must have positive dimensions, got {}x{}",
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self { pixels })
    }

    /// Wrap a buffer derived from an existing `RasterImage` (rotated, resized
    /// to a positive size, ...), which therefore cannot be empty.
    pub(crate) fn from_nonempty(pixels: RgbaImage) -> Self {
        debug_assert!(pixels.width() > 0 && pixels.height() > 0);
        Self { pixels }
    }

    /// A single-colour image.
    pub fn filled(width: u32, height: u32, colour: Rgba<u8>) -> Result<Self> {
        Self::new(RgbaImage::from_pixel(width, height, colour))
    }

    /// Decode an encoded buffer (JPEG, PNG, ...). A buffer holding a `data:`
    /// URL has its prefix stripped and its payload decoded.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<Self> {
        if has_data_url_prefix(data) {
            let text = std::str::from_utf8(data)
                .map_err(|err| ScanmasterError::Decode(format!("data URL is not text: {err}")))?;
            return Self::from_data_url(text);
        }
        let decoded = image::load_from_memory(data)
            .map_err(|err| ScanmasterError::Decode(err.to_string()))?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(ScanmasterError::Decode("image has no pixels".into()));
        }
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "Image decoded"
        );
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    pub fn from_encoded(image: &EncodedImage) -> Result<Self> {
        Self::decode(image.bytes())
    }

    /// Decode a `data:` URL or bare base64 payload.
    pub fn from_data_url(input: &str) -> Result<Self> {
        Self::from_encoded(&EncodedImage::from_data_url(input)?)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// Colour channels only; alpha is discarded.
    pub fn to_rgb8(&self) -> RgbImage {
        RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let Rgba([r, g, b, _]) = *self.pixels.get_pixel(x, y);
            Rgb([r, g, b])
        })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as JPEG at the given quality.
    #[instrument(skip(self), fields(width = self.width(), height = self.height(), quality = quality.factor()))]
    pub fn encode_jpeg(&self, quality: Quality) -> Result<EncodedImage> {
        let mut buffer = Vec::new();
        let rgb = self.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_percent());
        rgb.write_with_encoder(encoder)
            .map_err(|err| ScanmasterError::Encode(format!("JPEG encoding failed: {err}")))?;
        debug!(bytes = buffer.len(), "JPEG encoded");
        Ok(EncodedImage::jpeg(buffer))
    }

    /// Encode losslessly as PNG (alpha preserved).
    pub fn encode_png(&self) -> Result<EncodedImage> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        DynamicImage::ImageRgba8(self.pixels.clone())
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ScanmasterError::Encode(format!("PNG encoding failed: {err}")))?;
        Ok(EncodedImage::new(buffer, "image/png"))
    }
}
