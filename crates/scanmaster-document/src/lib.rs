// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanmaster-document — The ScanMaster image pipeline.
//
// Provides per-pixel filters (grayscale, magic binarization, lighten),
// quarter-turn rotation, watermark and signature compositing, recompression,
// page editing, and multi-page PDF export.

pub mod image;
pub mod pdf;
pub mod pipeline;
pub mod scan;

// Re-export the primary items so callers can use `scanmaster_document::PdfWriter` etc.
pub use self::image::processor::ImageProcessor;
pub use self::image::raster::{Quality, RasterImage};
pub use pdf::writer::PdfWriter;
pub use pipeline::{
    add_watermark, apply_filter, assemble_document, compress, overlay_signature, rotate,
};
