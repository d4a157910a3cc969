// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-pixel filters: grayscale, "magic" binarization, and lighten.
//
// Every filter maps one RGBA pixel to one RGBA pixel independently of its
// neighbours. Alpha is never touched.

use image::Rgba;
use scanmaster_core::types::FilterKind;
use tracing::{debug, instrument};

use super::raster::RasterImage;

/// `Magic` threshold: pixels whose channel mean is strictly above it turn white.
pub const MAGIC_THRESHOLD: u16 = 110;

/// Multiplier applied to each colour channel by `Lighten`.
pub const LIGHTEN_FACTOR: f32 = 1.3;

/// Apply `filter` to a single pixel.
pub fn filter_pixel(pixel: Rgba<u8>, filter: FilterKind) -> Rgba<u8> {
    let Rgba([r, g, b, a]) = pixel;
    match filter {
        FilterKind::Original => pixel,
        FilterKind::Grayscale => {
            let avg = channel_mean(r, g, b);
            Rgba([avg, avg, avg, a])
        }
        FilterKind::Magic => {
            // mean > 110  <=>  sum > 330, without losing the fraction.
            let sum = r as u16 + g as u16 + b as u16;
            let v = if sum > MAGIC_THRESHOLD * 3 { 255 } else { 0 };
            Rgba([v, v, v, a])
        }
        FilterKind::Lighten => Rgba([lighten(r), lighten(g), lighten(b), a]),
    }
}

/// Apply `filter` to every pixel of `image`, returning a new image.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn apply_filter(image: &RasterImage, filter: FilterKind) -> RasterImage {
    let mut out = image.clone();
    apply_in_place(&mut out, filter);
    out
}

/// Apply `filter` to every pixel of `image` in place.
pub fn apply_in_place(image: &mut RasterImage, filter: FilterKind) {
    if filter == FilterKind::Original {
        return;
    }
    for pixel in image.pixels_mut().pixels_mut() {
        *pixel = filter_pixel(*pixel, filter);
    }
    debug!(%filter, "Filter applied");
}

/// Mean of three channels, rounded to nearest. A third never lands on .5,
/// so `(sum + 1) / 3` is exact rounding.
fn channel_mean(r: u8, g: u8, b: u8) -> u8 {
    ((r as u16 + g as u16 + b as u16 + 1) / 3) as u8
}

fn lighten(channel: u8) -> u8 {
    (channel as f32 * LIGHTEN_FACTOR).round().min(255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn sample_image() -> RasterImage {
        let pixels = RgbaImage::from_fn(16, 9, |x, y| {
            Rgba([(x * 16) as u8, (y * 28) as u8, ((x + y) * 7) as u8, 200])
        });
        RasterImage::new(pixels).expect("image")
    }

    #[test]
    fn original_is_identity() {
        let image = sample_image();
        assert_eq!(apply_filter(&image, FilterKind::Original), image);
    }

    #[test]
    fn grayscale_sets_all_channels_to_mean() {
        let image = sample_image();
        let out = apply_filter(&image, FilterKind::Grayscale);
        for (src, dst) in image.pixels().pixels().zip(out.pixels().pixels()) {
            let mean = (src[0] as f32 + src[1] as f32 + src[2] as f32) / 3.0;
            assert_eq!(dst[0], dst[1]);
            assert_eq!(dst[1], dst[2]);
            assert!((dst[0] as f32 - mean).abs() <= 0.5, "{src:?} -> {dst:?}");
            assert_eq!(dst[3], src[3]);
        }
    }

    #[test]
    fn grayscale_of_white_is_white() {
        let image = RasterImage::filled(1000, 800, Rgba([255, 255, 255, 255])).expect("image");
        let out = apply_filter(&image, FilterKind::Grayscale);
        assert_eq!(out.dimensions(), (1000, 800));
        assert!(out.pixels().pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn magic_is_strictly_binary() {
        let image = sample_image();
        let out = apply_filter(&image, FilterKind::Magic);
        for (src, dst) in image.pixels().pixels().zip(out.pixels().pixels()) {
            let mean = (src[0] as f32 + src[1] as f32 + src[2] as f32) / 3.0;
            let expected = if mean > 110.0 { 255 } else { 0 };
            assert_eq!(dst.0, [expected, expected, expected, src[3]]);
        }
    }

    #[test]
    fn magic_threshold_is_exclusive() {
        // Mean exactly 110 stays black; 110.33 turns white.
        assert_eq!(filter_pixel(Rgba([110, 110, 110, 255]), FilterKind::Magic)[0], 0);
        assert_eq!(filter_pixel(Rgba([111, 110, 110, 255]), FilterKind::Magic)[0], 255);
    }

    #[test]
    fn magic_keeps_a_single_black_pixel() {
        let mut image = RasterImage::filled(1000, 800, Rgba([255, 255, 255, 255])).expect("image");
        image.pixels_mut().put_pixel(500, 400, Rgba([0, 0, 0, 255]));

        let out = apply_filter(&image, FilterKind::Magic);
        for (x, y, p) in out.pixels().enumerate_pixels() {
            if (x, y) == (500, 400) {
                assert_eq!(p.0, [0, 0, 0, 255]);
            } else {
                assert_eq!(p.0, [255, 255, 255, 255]);
            }
        }
    }

    #[test]
    fn lighten_scales_and_clamps() {
        let out = filter_pixel(Rgba([100, 200, 0, 7]), FilterKind::Lighten);
        assert_eq!(out, Rgba([130, 255, 0, 7]));
    }
}
