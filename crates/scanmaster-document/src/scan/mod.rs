// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning — per-page editing state kept in step with the image pipeline.

pub mod page;

pub use page::{capture_page, rotate_clockwise, set_filter};
