// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bitmap text rendering with the embedded 8x8 font. Produces coverage masks
// that the overlay code tints and blends onto pages.

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{GrayImage, Luma};
use scanmaster_core::error::{Result, ScanmasterError};

/// Largest mask we are willing to allocate.
const MAX_MASK_PIXELS: u64 = 64 * 1024 * 1024;

/// Render `text` as a single line of glyph cells, each `cell` pixels square.
///
/// Ink pixels are 255, background 0. Returns `Ok(None)` when there is nothing
/// to draw (empty text or a zero-sized cell). `bold` widens every stroke to the
/// right by roughly a twelfth of the cell.
pub fn render_line(text: &str, cell: u32, bold: bool) -> Result<Option<GrayImage>> {
    let glyphs: Vec<[u8; 8]> = text.chars().map(glyph_for).collect();
    if glyphs.is_empty() || cell == 0 {
        return Ok(None);
    }

    let width = (glyphs.len() as u64) * cell as u64;
    let height = cell as u64;
    if width * height > MAX_MASK_PIXELS || width > u32::MAX as u64 {
        return Err(ScanmasterError::Render(format!(
            "text mask of {width}x{height} pixels is too large"
        )));
    }

    let mut mask = GrayImage::new(width as u32, cell);
    for (index, glyph) in glyphs.iter().enumerate() {
        let origin_x = index as u32 * cell;
        for py in 0..cell {
            let bits = glyph[(py * 8 / cell) as usize];
            for px in 0..cell {
                let col = px * 8 / cell;
                // font8x8 stores the leftmost pixel in the least significant bit.
                if (bits >> col) & 1 == 1 {
                    mask.put_pixel(origin_x + px, py, Luma([255]));
                }
            }
        }
    }

    if bold {
        embolden(&mut mask, (cell / 12).max(1));
    }
    Ok(Some(mask))
}

/// Smear ink `stroke` pixels to the right.
fn embolden(mask: &mut GrayImage, stroke: u32) {
    let (width, height) = mask.dimensions();
    for y in 0..height {
        // Walk right-to-left so freshly inked pixels don't cascade.
        for x in (0..width).rev() {
            if mask.get_pixel(x, y).0[0] == 0 {
                continue;
            }
            for dx in 1..=stroke {
                if x + dx < width {
                    mask.put_pixel(x + dx, y, Luma([255]));
                }
            }
        }
    }
}

fn glyph_for(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}
