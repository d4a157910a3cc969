// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Encoded-in, encoded-out entry points. Each call decodes its inputs, runs one
// transform, and re-encodes as JPEG at the quality that transform calls for.
// Calls share no state, so different images may be processed concurrently.

use scanmaster_core::error::Result;
use scanmaster_core::types::{EncodedImage, FilterKind, Rotation};
use tracing::{info, instrument};

use crate::image::overlay;
use crate::image::processor::ImageProcessor;
use crate::image::raster::{
    DEFAULT_COMPRESS_QUALITY, FILTER_QUALITY, OVERLAY_QUALITY, Quality, RasterImage,
};
use crate::pdf::writer::PdfWriter;

/// Apply a per-pixel filter and re-encode at 0.85.
///
/// `Original` hands back the input untouched, so it stays bit-identical.
#[instrument(skip(image), fields(bytes = image.len()))]
pub fn apply_filter(image: &EncodedImage, filter: FilterKind) -> Result<EncodedImage> {
    if filter == FilterKind::Original {
        return Ok(image.clone());
    }
    ImageProcessor::from_encoded(image)?
        .filter(filter)
        .to_jpeg(FILTER_QUALITY)
}

/// Rotate clockwise by `degrees` (a multiple of 90) and re-encode at 0.9.
#[instrument(skip(image), fields(bytes = image.len()))]
pub fn rotate(image: &EncodedImage, degrees: i32) -> Result<EncodedImage> {
    let rotation = Rotation::from_degrees(degrees)?;
    ImageProcessor::from_encoded(image)?
        .rotate(rotation)
        .to_jpeg(OVERLAY_QUALITY)
}

/// Draw `text` diagonally across the page and re-encode at 0.9.
#[instrument(skip(image, text), fields(bytes = image.len(), text_len = text.len()))]
pub fn add_watermark(image: &EncodedImage, text: &str) -> Result<EncodedImage> {
    ImageProcessor::from_encoded(image)?
        .watermark(text)?
        .to_jpeg(OVERLAY_QUALITY)
}

/// Stamp `signature` bottom-right on `base` and re-encode at 0.9.
#[instrument(skip_all, fields(base_bytes = base.len(), sig_bytes = signature.len()))]
pub fn overlay_signature(base: &EncodedImage, signature: &EncodedImage) -> Result<EncodedImage> {
    let signature = RasterImage::from_encoded(signature)?;
    ImageProcessor::from_encoded(base)?
        .sign(&signature)
        .to_jpeg(OVERLAY_QUALITY)
}

/// Re-encode at `quality` (default 0.5) without any other change.
#[instrument(skip(image), fields(bytes = image.len()))]
pub fn compress(image: &EncodedImage, quality: Option<f32>) -> Result<EncodedImage> {
    let quality = match quality {
        Some(q) => Quality::new(q)?,
        None => DEFAULT_COMPRESS_QUALITY,
    };
    let out = ImageProcessor::from_encoded(image)?.to_jpeg(quality)?;
    info!(
        before = image.len(),
        after = out.len(),
        quality = quality.factor(),
        "Image recompressed"
    );
    Ok(out)
}

/// Build a PDF with one page per image, full width, in order. Free-tier
/// exports get the attribution caption on every page.
pub fn assemble_document(images: &[EncodedImage], watermark_footer: bool) -> Result<Vec<u8>> {
    PdfWriter::default().assemble_document(images, watermark_footer)
}

/// Decode, stamp the footer caption, and hand back pixels ready for a page.
pub(crate) fn export_page(image: &EncodedImage, watermark_footer: bool) -> Result<RasterImage> {
    let raster = RasterImage::from_encoded(image)?;
    if watermark_footer {
        overlay::stamp_footer_caption(&raster, overlay::FOOTER_CAPTION)
    } else {
        Ok(raster)
    }
}
