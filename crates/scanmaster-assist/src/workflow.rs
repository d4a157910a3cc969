// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assistant flows — OCR-and-summarize a saved document, and translate its
// text — with quota checks before the call and usage recorded only after a
// successful one.

use scanmaster_core::error::{Result, ScanmasterError};
use scanmaster_core::types::{DocumentRecord, LanguageCode, MeteredFeature, UsageStats};
use tracing::{info, instrument, warn};

use crate::details::{SmartDetails, clean_recognized_text, summary_excerpt};
use crate::quota::UsageGate;
use crate::retry::{RetryConfig, retry_with_backoff};
use crate::traits::{Summarizer, TextRecognizer, Translator};

/// Extract the text of `document`'s first page and fill in its title, tags,
/// and summary.
///
/// Documents that already have text are left alone and cost nothing. The OCR
/// call is retried on transient failures; once it succeeds the run is
/// counted, and a failed or malformed summary falls back to the default
/// details instead of failing the flow.
#[instrument(skip_all, fields(document = %document.id, plan = %gate.plan()))]
pub async fn recognize_document<A>(
    assistant: &A,
    document: &mut DocumentRecord,
    gate: &UsageGate,
    stats: &mut UsageStats,
    retry: &RetryConfig,
) -> Result<()>
where
    A: TextRecognizer + Summarizer,
{
    if document.extracted_text.is_some() {
        info!("Text already extracted");
        return Ok(());
    }
    gate.check(stats, MeteredFeature::Ocr)?;

    let page = document
        .pages
        .first()
        .ok_or_else(|| ScanmasterError::InvalidParameter("document has no pages".into()))?;

    let raw = retry_with_backoff(retry, "ocr", || assistant.recognize(&page.processed)).await?;
    let text = clean_recognized_text(&raw);
    gate.record(stats, MeteredFeature::Ocr);
    info!(chars = text.chars().count(), "Text recognised");

    let details = match assistant.summarize(summary_excerpt(&text)).await {
        Ok(raw) => SmartDetails::parse_or_fallback(&raw),
        Err(err) => {
            warn!(%err, "summarization failed, using defaults");
            SmartDetails::fallback()
        }
    };

    document.extracted_text = Some(text);
    document.title = details.title;
    document.tags = details.tags;
    document.summary = (!details.summary.is_empty()).then_some(details.summary);
    Ok(())
}

/// Translate `text` into `language`.
#[instrument(skip_all, fields(language = language.code(), plan = %gate.plan()))]
pub async fn translate_text<A>(
    assistant: &A,
    text: &str,
    language: LanguageCode,
    gate: &UsageGate,
    stats: &mut UsageStats,
    retry: &RetryConfig,
) -> Result<String>
where
    A: Translator,
{
    if text.trim().is_empty() {
        return Err(ScanmasterError::InvalidParameter("there is no text to translate".into()));
    }
    gate.check(stats, MeteredFeature::Translation)?;

    let translated = retry_with_backoff(retry, "translate", || {
        assistant.translate(text, language.display_name())
    })
    .await?;
    gate.record(stats, MeteredFeature::Translation);
    info!(chars = translated.chars().count(), "Text translated");
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use chrono::NaiveDate;
    use scanmaster_core::types::{EncodedImage, FreeLimits, ScannedPage, UserPlan};

    use crate::stub::OfflineAssistant;

    /// Scripted assistant: fails OCR `ocr_failures` times, then answers.
    struct FakeAssistant {
        ocr_failures: AtomicU32,
        ocr_calls: AtomicU32,
        ocr_reply: String,
        summary_reply: Result<String>,
        seen_excerpt: Mutex<Option<String>>,
        seen_language: Mutex<Option<String>>,
    }

    impl FakeAssistant {
        fn new(ocr_reply: &str, summary_reply: Result<String>) -> Self {
            Self {
                ocr_failures: AtomicU32::new(0),
                ocr_calls: AtomicU32::new(0),
                ocr_reply: ocr_reply.to_owned(),
                summary_reply,
                seen_excerpt: Mutex::new(None),
                seen_language: Mutex::new(None),
            }
        }
    }

    impl TextRecognizer for FakeAssistant {
        async fn recognize(&self, _image: &EncodedImage) -> Result<String> {
            self.ocr_calls.fetch_add(1, Ordering::SeqCst);
            let left = self.ocr_failures.load(Ordering::SeqCst);
            if left > 0 {
                self.ocr_failures.store(left - 1, Ordering::SeqCst);
                return Err(ScanmasterError::Ocr("503 from model".into()));
            }
            Ok(self.ocr_reply.clone())
        }
    }

    impl Summarizer for FakeAssistant {
        async fn summarize(&self, excerpt: &str) -> Result<String> {
            *self.seen_excerpt.lock().expect("lock") = Some(excerpt.to_owned());
            match &self.summary_reply {
                Ok(raw) => Ok(raw.clone()),
                Err(_) => Err(ScanmasterError::Ocr("summary service down".into())),
            }
        }
    }

    impl Translator for FakeAssistant {
        async fn translate(&self, text: &str, language_name: &str) -> Result<String> {
            *self.seen_language.lock().expect("lock") = Some(language_name.to_owned());
            Ok(format!("[{language_name}] {text}"))
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    fn stats() -> UsageStats {
        UsageStats::new(NaiveDate::from_ymd_opt(2026, 6, 1).expect("date"))
    }

    fn document() -> DocumentRecord {
        DocumentRecord::new(vec![ScannedPage::new(EncodedImage::jpeg(vec![0xFF, 0xD8, 0xFF]))])
    }

    fn free() -> UsageGate {
        UsageGate::new(UserPlan::Free, FreeLimits::default())
    }

    #[tokio::test]
    async fn ocr_fills_text_and_details() {
        let assistant = FakeAssistant::new(
            "```text\nACME Corp\nTotal: $12\n```",
            Ok(r#"{"title":"ACME Receipt","tags":["Receipt","Shopping"],"summary":"A receipt."}"#.into()),
        );
        let mut doc = document();
        let mut usage = stats();

        recognize_document(&assistant, &mut doc, &free(), &mut usage, &fast_retry())
            .await
            .expect("recognize");

        assert_eq!(doc.extracted_text.as_deref(), Some("ACME Corp\nTotal: $12"));
        assert_eq!(doc.title, "ACME Receipt");
        assert_eq!(doc.tags, vec!["Receipt", "Shopping"]);
        assert_eq!(doc.summary.as_deref(), Some("A receipt."));
        assert_eq!(usage.ocr_count_today, 1);
    }

    #[tokio::test]
    async fn bad_summary_falls_back_without_failing() {
        let assistant = FakeAssistant::new("Hello", Ok("not json at all".into()));
        let mut doc = document();
        let mut usage = stats();
        recognize_document(&assistant, &mut doc, &free(), &mut usage, &fast_retry())
            .await
            .expect("recognize");

        assert_eq!(doc.extracted_text.as_deref(), Some("Hello"));
        assert_eq!(doc.title, "Scanned Document");
        assert_eq!(doc.tags, vec!["Scan"]);
        assert_eq!(doc.summary, None);
    }

    #[tokio::test]
    async fn failing_summarizer_falls_back() {
        let assistant = FakeAssistant::new("Hello", Err(ScanmasterError::AssistantUnavailable));
        let mut doc = document();
        let mut usage = stats();
        recognize_document(&assistant, &mut doc, &free(), &mut usage, &fast_retry())
            .await
            .expect("recognize");
        assert_eq!(doc.title, "Scanned Document");
    }

    #[tokio::test]
    async fn summary_sees_only_an_excerpt() {
        let long = "x".repeat(5_000);
        let assistant = FakeAssistant::new(&long, Ok("{}".into()));
        let mut doc = document();
        let mut usage = stats();
        recognize_document(&assistant, &mut doc, &free(), &mut usage, &fast_retry())
            .await
            .expect("recognize");

        let seen = assistant.seen_excerpt.lock().expect("lock").clone().expect("called");
        assert_eq!(seen.len(), 1500);
        assert_eq!(doc.extracted_text.map(|t| t.len()), Some(5_000));
    }

    #[tokio::test]
    async fn transient_ocr_failures_are_retried_and_counted_once() {
        let assistant = FakeAssistant::new("Hello", Ok("{}".into()));
        assistant.ocr_failures.store(2, Ordering::SeqCst);
        let mut doc = document();
        let mut usage = stats();

        recognize_document(&assistant, &mut doc, &free(), &mut usage, &fast_retry())
            .await
            .expect("third attempt succeeds");
        assert_eq!(assistant.ocr_calls.load(Ordering::SeqCst), 3);
        assert_eq!(usage.ocr_count_today, 1);
    }

    #[tokio::test]
    async fn failed_ocr_is_not_counted() {
        let mut doc = document();
        let mut usage = stats();
        let result =
            recognize_document(&OfflineAssistant, &mut doc, &free(), &mut usage, &fast_retry())
                .await;
        assert!(matches!(result, Err(ScanmasterError::AssistantUnavailable)));
        assert_eq!(usage.ocr_count_today, 0);
        assert_eq!(doc.extracted_text, None);
    }

    #[tokio::test]
    async fn quota_blocks_before_calling_out() {
        let assistant = FakeAssistant::new("Hello", Ok("{}".into()));
        let mut doc = document();
        let mut usage = stats();
        usage.ocr_count_today = 5;

        let result =
            recognize_document(&assistant, &mut doc, &free(), &mut usage, &fast_retry()).await;
        assert!(matches!(result, Err(ScanmasterError::QuotaExceeded { limit: 5, .. })));
        assert_eq!(assistant.ocr_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn already_recognised_documents_cost_nothing() {
        let assistant = FakeAssistant::new("new text", Ok("{}".into()));
        let mut doc = document();
        doc.extracted_text = Some("old text".into());
        let mut usage = stats();

        recognize_document(&assistant, &mut doc, &free(), &mut usage, &fast_retry())
            .await
            .expect("no-op");
        assert_eq!(doc.extracted_text.as_deref(), Some("old text"));
        assert_eq!(assistant.ocr_calls.load(Ordering::SeqCst), 0);
        assert_eq!(usage.ocr_count_today, 0);
    }

    #[tokio::test]
    async fn empty_document_is_rejected() {
        let assistant = FakeAssistant::new("x", Ok("{}".into()));
        let mut doc = DocumentRecord::new(Vec::new());
        let mut usage = stats();
        let result =
            recognize_document(&assistant, &mut doc, &free(), &mut usage, &fast_retry()).await;
        assert!(matches!(result, Err(ScanmasterError::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn translation_uses_language_name_and_counts() {
        let assistant = FakeAssistant::new("", Ok("{}".into()));
        let mut usage = stats();
        let out = translate_text(
            &assistant,
            "Hola",
            LanguageCode::Ja,
            &free(),
            &mut usage,
            &fast_retry(),
        )
        .await
        .expect("translate");

        assert_eq!(out, "[Japanese] Hola");
        assert_eq!(
            assistant.seen_language.lock().expect("lock").as_deref(),
            Some("Japanese")
        );
        assert_eq!(usage.translation_count_today, 1);
    }

    #[tokio::test]
    async fn pro_translation_is_not_metered() {
        let assistant = FakeAssistant::new("", Ok("{}".into()));
        let mut usage = stats();
        usage.translation_count_today = 3;
        let gate = UsageGate::new(UserPlan::Pro, FreeLimits::default());

        translate_text(&assistant, "Hi", LanguageCode::Fr, &gate, &mut usage, &fast_retry())
            .await
            .expect("translate");
        assert_eq!(usage.translation_count_today, 3);
    }

    #[tokio::test]
    async fn blank_text_is_not_sent() {
        let mut usage = stats();
        let result = translate_text(
            &OfflineAssistant,
            "   ",
            LanguageCode::Es,
            &free(),
            &mut usage,
            &fast_retry(),
        )
        .await;
        assert!(matches!(result, Err(ScanmasterError::InvalidParameter(_))));
    }
}
