// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for ScanMaster.

use thiserror::Error;

use crate::types::MeteredFeature;

/// Top-level error type for all ScanMaster operations.
#[derive(Debug, Error)]
pub enum ScanmasterError {
    // -- Image pipeline errors --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to render overlay: {0}")]
    Render(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("PDF export failed: {0}")]
    Pdf(String),

    // -- Remote assistant errors --
    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("translation failed: {0}")]
    Translation(String),

    #[error("no text assistant is configured")]
    AssistantUnavailable,

    #[error("daily {feature} limit of {limit} reached")]
    QuotaExceeded { feature: MeteredFeature, limit: u32 },

    // -- Library --
    #[error("not found: {0}")]
    NotFound(String),

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanmasterError>;
