// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — chains decode, filter, quarter-turn rotation, watermark,
// signature, and re-encode over a single in-memory page.

use image::imageops;
use scanmaster_core::error::Result;
use scanmaster_core::types::{EncodedImage, FilterKind, Rotation};
use tracing::{debug, info, instrument};

use super::filter;
use super::overlay;
use super::raster::{Quality, RasterImage};

/// Image processing pipeline operating on a single in-memory page.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`
/// wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_encoded(&page.original)?
///     .rotate(Rotation::Deg90)
///     .filter(FilterKind::Magic)
///     .to_jpeg(FILTER_QUALITY)?;
/// ```
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    image: RasterImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode raw encoded bytes (JPEG, PNG, etc.).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            image: RasterImage::decode(data)?,
        })
    }

    pub fn from_encoded(image: &EncodedImage) -> Result<Self> {
        Self::from_bytes(image.bytes())
    }

    /// Wrap an already-decoded image.
    pub fn from_raster(image: RasterImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_raster(&self) -> &RasterImage {
        &self.image
    }

    pub fn into_raster(self) -> RasterImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Apply a per-pixel filter.
    pub fn filter(mut self, kind: FilterKind) -> Self {
        filter::apply_in_place(&mut self.image, kind);
        self
    }

    /// Rotate clockwise by a quarter-turn multiple. 90 and 270 swap width and
    /// height; no pixels are cropped or interpolated.
    #[instrument(skip(self), fields(from_w = self.width(), from_h = self.height()))]
    pub fn rotate(self, rotation: Rotation) -> Self {
        info!(degrees = rotation.degrees(), "Rotating image");
        let pixels = self.image.into_pixels();
        let rotated = match rotation {
            Rotation::Deg0 => pixels,
            Rotation::Deg90 => imageops::rotate90(&pixels),
            Rotation::Deg180 => imageops::rotate180(&pixels),
            Rotation::Deg270 => imageops::rotate270(&pixels),
        };
        debug!(
            new_w = rotated.width(),
            new_h = rotated.height(),
            "Rotation complete"
        );
        // A rotation of a non-empty image is non-empty.
        Self {
            image: RasterImage::from_nonempty(rotated),
        }
    }

    /// Draw a diagonal text watermark.
    pub fn watermark(self, text: &str) -> Result<Self> {
        Ok(Self {
            image: overlay::add_watermark(&self.image, text)?,
        })
    }

    /// Stamp a signature into the bottom-right corner.
    pub fn sign(self, signature: &RasterImage) -> Self {
        Self {
            image: overlay::overlay_signature(&self.image, signature),
        }
    }

    // -- Output ---------------------------------------------------------------

    pub fn to_jpeg(&self, quality: Quality) -> Result<EncodedImage> {
        self.image.encode_jpeg(quality)
    }

    pub fn to_png(&self) -> Result<EncodedImage> {
        self.image.encode_png()
    }
}
