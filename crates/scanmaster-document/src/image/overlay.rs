// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compositing — diagonal text watermark, bottom-right signature placement,
// and the export footer caption. All operations draw over a copy of the page
// and never change its dimensions.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use scanmaster_core::error::Result;
use tracing::{debug, info, instrument};

use super::raster::RasterImage;
use super::text::render_line;

/// Watermark tint.
pub const WATERMARK_RGB: [u8; 3] = [255, 0, 0];
/// Watermark opacity.
pub const WATERMARK_OPACITY: f32 = 0.3;
/// Watermark baseline angle (negative is counter-clockwise).
pub const WATERMARK_ANGLE_DEGREES: f32 = -45.0;

/// Signature width as a fraction of the page width.
pub const SIGNATURE_WIDTH_RATIO: f64 = 0.3;
/// Signature margin from the right and bottom edges, as a fraction of the
/// page width and height respectively.
pub const SIGNATURE_MARGIN_RATIO: f64 = 0.05;

/// Caption stamped on every exported page for free-plan users.
pub const FOOTER_CAPTION: &str = "Scanned with AI ScanMaster Free";

// Caption metrics are given for a page displayed 794 px wide (A4 at 96 dpi)
// and scaled to the real image width.
const FOOTER_REFERENCE_WIDTH: f32 = 794.0;
const FOOTER_FONT_PX: f32 = 12.0;
const FOOTER_INSET_PX: f32 = 20.0;
const FOOTER_PAD_X_PX: f32 = 8.0;
const FOOTER_PAD_Y_PX: f32 = 4.0;
const FOOTER_CHIP_RGBA: Rgba<u8> = Rgba([255, 255, 255, 204]);
const FOOTER_TEXT_ALPHA: f32 = 0.5;

/// Glyph size used for a watermark on an image `width` pixels wide.
pub fn watermark_font_size(width: u32) -> u32 {
    width / 20
}

/// Draw `text` once across the centre of `image`, rotated 45 degrees
/// counter-clockwise, in bold translucent red.
///
/// Images narrower than 20 pixels get a zero font size and come back
/// unchanged, as does empty text.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn add_watermark(image: &RasterImage, text: &str) -> Result<RasterImage> {
    let font_size = watermark_font_size(image.width());
    info!(font_size, "Adding watermark");

    let diagonal = (image.width() as f64).hypot(image.height() as f64).ceil() as u32;
    let visible = visible_span(text, font_size, diagonal);
    let Some(mask) = render_line(visible, font_size, true)? else {
        debug!("Nothing to draw");
        return Ok(image.clone());
    };

    // Square canvas large enough to hold the text at any angle, text centred.
    let side = (mask.width() as f64).hypot(mask.height() as f64).ceil() as u32 + 2;
    let mut square = GrayImage::new(side, side);
    let left = (side - mask.width()) / 2;
    let top = (side - mask.height()) / 2;
    for (x, y, p) in mask.enumerate_pixels() {
        square.put_pixel(left + x, top + y, *p);
    }

    let rotated = rotate_about_center(
        &square,
        WATERMARK_ANGLE_DEGREES.to_radians(),
        Interpolation::Bilinear,
        Luma([0u8]),
    );

    let mut out = image.clone();
    let origin_x = (image.width() as i64 - side as i64) / 2;
    let origin_y = (image.height() as i64 - side as i64) / 2;
    blend_mask(
        out.pixels_mut(),
        &rotated,
        origin_x,
        origin_y,
        WATERMARK_RGB,
        WATERMARK_OPACITY,
    );

    debug!(side, "Watermark blended");
    Ok(out)
}

/// Where a signature lands on a page, in page pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignaturePlacement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Size a `sig_width` x `sig_height` signature to 30 % of the page width,
/// keeping its aspect ratio, and anchor it bottom-right with a 5 % margin.
pub fn signature_placement(
    page_width: u32,
    page_height: u32,
    sig_width: u32,
    sig_height: u32,
) -> SignaturePlacement {
    let width = page_width as f64 * SIGNATURE_WIDTH_RATIO;
    let height = width * (sig_height as f64 / sig_width.max(1) as f64);
    let x = page_width as f64 - width - page_width as f64 * SIGNATURE_MARGIN_RATIO;
    let y = page_height as f64 - height - page_height as f64 * SIGNATURE_MARGIN_RATIO;

    SignaturePlacement {
        x: x.round() as i64,
        y: y.round() as i64,
        width: (width.round() as u32).max(1),
        height: (height.round() as u32).max(1),
    }
}

/// Composite `signature` over the bottom-right corner of `base`.
///
/// Transparent signature pixels leave the page visible underneath.
#[instrument(skip_all, fields(base_w = base.width(), base_h = base.height(), sig_w = signature.width(), sig_h = signature.height()))]
pub fn overlay_signature(base: &RasterImage, signature: &RasterImage) -> RasterImage {
    let placement = signature_placement(
        base.width(),
        base.height(),
        signature.width(),
        signature.height(),
    );
    info!(?placement, "Placing signature");

    let rows = visible_signature_rows(&placement, signature.height());
    let source = imageops::crop_imm(
        signature.pixels(),
        0,
        rows.skip,
        signature.width(),
        signature.height() - rows.skip,
    )
    .to_image();
    let scaled = imageops::resize(&source, placement.width, rows.height, FilterType::Lanczos3);

    let mut out = base.clone();
    imageops::overlay(out.pixels_mut(), &scaled, placement.x, rows.y);
    out
}

/// The part of a placed signature that is resampled: source rows from
/// `skip` down, drawn `height` pixels tall with the top edge at `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VisibleRows {
    skip: u32,
    height: u32,
    y: i64,
}

/// Drop whole source rows that would land above the page, keeping the bottom
/// edge where the placement puts it. A very tall signature then costs no
/// more than the page height to resample.
fn visible_signature_rows(placement: &SignaturePlacement, sig_height: u32) -> VisibleRows {
    if placement.y >= 0 || sig_height <= 1 {
        return VisibleRows {
            skip: 0,
            height: placement.height,
            y: placement.y,
        };
    }
    let row_px = placement.height as f64 / sig_height as f64;
    let hidden = placement.y.unsigned_abs() as f64;
    let skip = ((hidden / row_px).floor() as u32).min(sig_height - 1);
    let height = (((sig_height - skip) as f64 * row_px).round() as u32).max(1);
    let bottom = placement.y + placement.height as i64;
    VisibleRows {
        skip,
        height,
        y: bottom - height as i64,
    }
}

/// Stamp `caption` bottom-right on a white translucent chip.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn stamp_footer_caption(image: &RasterImage, caption: &str) -> Result<RasterImage> {
    let scale = image.width() as f32 / FOOTER_REFERENCE_WIDTH;
    let font = ((FOOTER_FONT_PX * scale).round() as u32).max(6);
    let Some(text) = render_line(caption, font, false)? else {
        return Ok(image.clone());
    };

    let pad_x = (FOOTER_PAD_X_PX * scale).round() as u32;
    let pad_y = (FOOTER_PAD_Y_PX * scale).round() as u32;
    let inset = (FOOTER_INSET_PX * scale).round() as i64;

    let mut chip = RgbaImage::from_pixel(
        text.width() + 2 * pad_x,
        text.height() + 2 * pad_y,
        FOOTER_CHIP_RGBA,
    );
    for (x, y, p) in text.enumerate_pixels() {
        if p.0[0] > 0 {
            chip.get_pixel_mut(pad_x + x, pad_y + y)
                .blend(&Rgba([0, 0, 0, (255.0 * FOOTER_TEXT_ALPHA) as u8]));
        }
    }

    let x = image.width() as i64 - inset - chip.width() as i64;
    let y = image.height() as i64 - inset - chip.height() as i64;
    debug!(x, y, font, "Footer caption placed");

    let mut out = image.clone();
    imageops::overlay(out.pixels_mut(), &chip, x, y);
    Ok(out)
}

/// Tint `mask` with `rgb` at `opacity` (scaled by coverage) onto `canvas`,
/// with the mask's top-left at (`origin_x`, `origin_y`). Clipped to the canvas.
fn blend_mask(
    canvas: &mut RgbaImage,
    mask: &GrayImage,
    origin_x: i64,
    origin_y: i64,
    rgb: [u8; 3],
    opacity: f32,
) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    for (mx, my, coverage) in mask.enumerate_pixels() {
        let coverage = coverage.0[0];
        if coverage == 0 {
            continue;
        }
        let x = origin_x + mx as i64;
        let y = origin_y + my as i64;
        if x < 0 || y < 0 || x >= cw || y >= ch {
            continue;
        }
        let alpha = opacity * coverage as f32 / 255.0;
        let dst = canvas.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            let blended = dst.0[c] as f32 * (1.0 - alpha) + rgb[c] as f32 * alpha;
            dst.0[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// The middle part of `text` that can possibly be visible once centred on an
/// image whose diagonal is `diagonal` pixels. Glyphs are monospaced, so
/// trimming an equal count from both ends keeps the centre in place.
fn visible_span(text: &str, cell: u32, diagonal: u32) -> &str {
    if cell == 0 {
        return text;
    }
    let total = text.chars().count();
    let mut keep = (diagonal / cell) as usize + 2;
    if keep >= total {
        return text;
    }
    if (total - keep) % 2 == 1 {
        keep += 1;
    }
    let skip = (total - keep) / 2;
    let start = text.char_indices().nth(skip).map_or(text.len(), |(i, _)| i);
    let end = text
        .char_indices()
        .nth(skip + keep)
        .map_or(text.len(), |(i, _)| i);
    &text[start..end]
}
