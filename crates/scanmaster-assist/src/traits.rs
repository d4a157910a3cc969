// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator interfaces. Implementations typically wrap a hosted model; the
// flows in `workflow` only ever see these traits.

use std::future::Future;

use scanmaster_core::error::Result;
use scanmaster_core::types::EncodedImage;

/// Reads the text off a page image.
pub trait TextRecognizer: Send + Sync {
    /// Recognised text, layout preserved where possible. Remote failures are
    /// `ScanmasterError::Ocr`.
    fn recognize(&self, image: &EncodedImage) -> impl Future<Output = Result<String>> + Send;
}

/// Translates text into a named language ("Spanish", "Japanese", ...).
pub trait Translator: Send + Sync {
    /// Remote failures are `ScanmasterError::Translation`.
    fn translate(
        &self,
        text: &str,
        language_name: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Produces a title, tags, and one-line summary for document text.
pub trait Summarizer: Send + Sync {
    /// Raw JSON of the form `{"title": ..., "tags": [...], "summary": ...}`.
    /// Callers validate it with `SmartDetails::parse`.
    fn summarize(&self, excerpt: &str) -> impl Future<Output = Result<String>> + Send;
}
