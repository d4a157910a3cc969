// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page editing — capture, filter choice, and clockwise rotation of a single
// scanned page. Rotation is baked into the page's original capture; the
// processed image is always `filter` applied to that original.

use scanmaster_core::error::Result;
use scanmaster_core::types::{EncodedImage, FilterKind, Rotation, ScannedPage};
use tracing::{info, instrument};

use crate::image::raster::{FILTER_QUALITY, OVERLAY_QUALITY};
use crate::image::processor::ImageProcessor;
use crate::pipeline;

/// Create a page from a fresh capture after checking that it decodes.
#[instrument(skip(image), fields(bytes = image.len(), mime = image.mime()))]
pub fn capture_page(image: EncodedImage) -> Result<ScannedPage> {
    let decoded = ImageProcessor::from_encoded(&image)?;
    let page = ScannedPage::new(image);
    info!(page = %page.id, width = decoded.width(), height = decoded.height(), "Page captured");
    Ok(page)
}

/// Switch the page to `filter`, re-deriving the processed image from the
/// original. The page is left untouched if processing fails.
#[instrument(skip(page), fields(page = %page.id))]
pub fn set_filter(page: &mut ScannedPage, filter: FilterKind) -> Result<()> {
    let processed = pipeline::apply_filter(&page.original, filter)?;
    page.processed = processed;
    page.filter = filter;
    Ok(())
}

/// Turn the page 90 degrees clockwise.
///
/// The rotated capture replaces the original and the current filter is
/// re-applied to it. Both images are produced before the page is touched, so
/// a failure leaves it as it was.
#[instrument(skip(page), fields(page = %page.id, rotation = page.rotation.degrees()))]
pub fn rotate_clockwise(page: &mut ScannedPage) -> Result<()> {
    let rotated = ImageProcessor::from_encoded(&page.original)?.rotate(Rotation::Deg90);
    let original = rotated.to_jpeg(OVERLAY_QUALITY)?;
    let processed = if page.filter == FilterKind::Original {
        original.clone()
    } else {
        rotated.filter(page.filter).to_jpeg(FILTER_QUALITY)?
    };

    page.original = original;
    page.processed = processed;
    page.rotation = page.rotation.then(Rotation::Deg90);
    info!(total = page.rotation.degrees(), "Page rotated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::raster::RasterImage;
    use image::{Rgba, RgbaImage};
    use scanmaster_core::error::ScanmasterError;

    fn capture(width: u32, height: u32) -> ScannedPage {
        let pixels = RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([30, 30, 30, 255])
            } else {
                Rgba([220, 220, 220, 255])
            }
        });
        let encoded = RasterImage::new(pixels)
            .expect("image")
            .encode_png()
            .expect("png");
        capture_page(encoded).expect("capture")
    }

    fn dims(image: &EncodedImage) -> (u32, u32) {
        RasterImage::from_encoded(image).expect("decode").dimensions()
    }

    #[test]
    fn fresh_page_is_unfiltered() {
        let page = capture(20, 10);
        assert_eq!(page.filter, FilterKind::Original);
        assert_eq!(page.rotation, Rotation::Deg0);
        assert_eq!(page.processed, page.original);
    }

    #[test]
    fn capture_rejects_undecodable_bytes() {
        let result = capture_page(EncodedImage::new(vec![1, 2, 3], "image/jpeg"));
        assert!(matches!(result, Err(ScanmasterError::Decode(_))));
    }

    #[test]
    fn filter_keeps_original_and_back_to_original_restores_it() {
        let mut page = capture(20, 10);
        let original = page.original.clone();

        set_filter(&mut page, FilterKind::Magic).expect("magic");
        assert_eq!(page.filter, FilterKind::Magic);
        assert_eq!(page.original, original);
        assert_ne!(page.processed, original);

        set_filter(&mut page, FilterKind::Original).expect("original");
        assert_eq!(page.processed, original);
    }

    #[test]
    fn rotation_is_baked_in_and_accumulates() {
        let mut page = capture(40, 20);
        set_filter(&mut page, FilterKind::Grayscale).expect("filter");

        rotate_clockwise(&mut page).expect("rotate");
        assert_eq!(page.rotation, Rotation::Deg90);
        assert_eq!(dims(&page.original), (20, 40));
        assert_eq!(dims(&page.processed), (20, 40));
        assert_eq!(page.filter, FilterKind::Grayscale);

        for _ in 0..3 {
            rotate_clockwise(&mut page).expect("rotate");
        }
        assert_eq!(page.rotation, Rotation::Deg0);
        assert_eq!(dims(&page.original), (40, 20));
    }

    #[test]
    fn rotated_processed_image_is_filtered() {
        let mut page = capture(40, 20);
        set_filter(&mut page, FilterKind::Magic).expect("filter");
        rotate_clockwise(&mut page).expect("rotate");

        let processed = RasterImage::from_encoded(&page.processed).expect("decode");
        // JPEG ringing aside, binarized output stays near black or white.
        let mid = processed.pixel(10, 30);
        assert!(mid[0] < 40 || mid[0] > 215, "not binary: {mid:?}");
    }
}
