// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assistant used when no remote service is configured.

use scanmaster_core::error::{Result, ScanmasterError};
use scanmaster_core::types::EncodedImage;
use tracing::debug;

use crate::traits::{Summarizer, TextRecognizer, Translator};

/// Every call fails with `AssistantUnavailable`. Summaries therefore fall
/// back to the default details.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAssistant;

impl TextRecognizer for OfflineAssistant {
    async fn recognize(&self, _image: &EncodedImage) -> Result<String> {
        debug!("no text recognizer configured");
        Err(ScanmasterError::AssistantUnavailable)
    }
}

impl Translator for OfflineAssistant {
    async fn translate(&self, _text: &str, _language_name: &str) -> Result<String> {
        debug!("no translator configured");
        Err(ScanmasterError::AssistantUnavailable)
    }
}

impl Summarizer for OfflineAssistant {
    async fn summarize(&self, _excerpt: &str) -> Result<String> {
        Err(ScanmasterError::AssistantUnavailable)
    }
}
