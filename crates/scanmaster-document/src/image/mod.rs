// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding, per-pixel filters, rotation, text and signature
// compositing, and JPEG/PNG re-encoding.

pub mod filter;
pub mod overlay;
pub mod processor;
pub mod raster;
pub mod text;

pub use processor::ImageProcessor;
pub use raster::{Quality, RasterImage};
