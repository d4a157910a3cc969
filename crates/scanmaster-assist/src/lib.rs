// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ScanMaster Assist — the remote text services (OCR, translation,
// summarization) seen through narrow async traits, plus the free-plan usage
// gate, retry with backoff, and the flows that tie them to a document.

pub mod details;
pub mod quota;
pub mod retry;
pub mod stub;
pub mod traits;
pub mod workflow;

pub use details::SmartDetails;
pub use quota::UsageGate;
pub use retry::{RetryConfig, retry_with_backoff};
pub use stub::OfflineAssistant;
pub use traits::{Summarizer, TextRecognizer, Translator};
pub use workflow::{recognize_document, translate_text};
