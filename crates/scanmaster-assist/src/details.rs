// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Model output handling — strict decoding of summary JSON and cleanup of
// recognised text.

use scanmaster_core::error::{Result, ScanmasterError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Characters of document text sent for summarization.
pub const SUMMARY_EXCERPT_CHARS: usize = 1500;

/// Shown in place of an empty OCR result.
pub const NO_TEXT_DETECTED: &str = "No text detected.";

const FALLBACK_TITLE: &str = "Scanned Document";
const FALLBACK_TAG: &str = "Scan";

/// Title, tags, and summary generated for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmartDetails {
    pub title: String,
    pub tags: Vec<String>,
    pub summary: String,
}

impl SmartDetails {
    /// Used whenever summarization fails or returns something unusable.
    pub fn fallback() -> Self {
        Self {
            title: FALLBACK_TITLE.to_owned(),
            tags: vec![FALLBACK_TAG.to_owned()],
            summary: String::new(),
        }
    }

    /// Decode a summary response. The input must be exactly one JSON object
    /// with `title`, `tags`, and `summary` and nothing else; the title and
    /// every tag must be non-blank and at least one tag is required.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut details: Self = serde_json::from_str(raw.trim())?;

        details.title = details.title.trim().to_owned();
        if details.title.is_empty() {
            return Err(ScanmasterError::InvalidParameter("summary title is empty".into()));
        }

        details.tags = details.tags.iter().map(|t| t.trim().to_owned()).collect();
        if details.tags.is_empty() || details.tags.iter().any(String::is_empty) {
            return Err(ScanmasterError::InvalidParameter(
                "summary tags must be a non-empty list of non-empty strings".into(),
            ));
        }

        details.summary = details.summary.trim().to_owned();
        Ok(details)
    }

    /// `parse`, falling back to the defaults on any error.
    pub fn parse_or_fallback(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|err| {
            warn!(%err, "summary response rejected, using defaults");
            Self::fallback()
        })
    }
}

/// The leading part of `text` that is sent for summarization.
pub fn summary_excerpt(text: &str) -> &str {
    match text.char_indices().nth(SUMMARY_EXCERPT_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Strip a Markdown code fence the model may have wrapped around its answer
/// (optionally tagged `text`). An empty answer becomes `NO_TEXT_DETECTED`.
pub fn clean_recognized_text(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("text") => &rest[4..],
            _ => rest,
        };
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    if text.is_empty() {
        NO_TEXT_DETECTED.to_owned()
    } else {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_details_parse() {
        let raw = r#"{"title":" Electric Bill ","tags":["Utilities","Bill"],"summary":"March statement."}"#;
        let details = SmartDetails::parse(raw).expect("parse");
        assert_eq!(details.title, "Electric Bill");
        assert_eq!(details.tags, vec!["Utilities", "Bill"]);
        assert_eq!(details.summary, "March statement.");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = r#"{"title":"A","tags":["B"],"summary":"","confidence":0.9}"#;
        assert!(SmartDetails::parse(raw).is_err());
    }

    #[test]
    fn missing_fields_are_rejected() {
        assert!(SmartDetails::parse(r#"{"title":"A","tags":["B"]}"#).is_err());
    }

    #[test]
    fn fenced_json_is_not_trusted() {
        let raw = "```json\n{\"title\":\"A\",\"tags\":[\"B\"],\"summary\":\"\"}\n```";
        assert_eq!(SmartDetails::parse_or_fallback(raw), SmartDetails::fallback());
    }

    #[test]
    fn blank_title_or_tags_fall_back() {
        let blank_title = r#"{"title":"  ","tags":["B"],"summary":"x"}"#;
        let no_tags = r#"{"title":"A","tags":[],"summary":"x"}"#;
        let blank_tag = r#"{"title":"A","tags":["B",""],"summary":"x"}"#;
        for raw in [blank_title, no_tags, blank_tag] {
            assert_eq!(SmartDetails::parse_or_fallback(raw), SmartDetails::fallback());
        }
    }

    #[test]
    fn fallback_matches_documented_defaults() {
        let fallback = SmartDetails::fallback();
        assert_eq!(fallback.title, "Scanned Document");
        assert_eq!(fallback.tags, vec!["Scan"]);
        assert_eq!(fallback.summary, "");
    }

    #[test]
    fn excerpt_is_capped_by_characters() {
        let long = "é".repeat(2000);
        assert_eq!(summary_excerpt(&long).chars().count(), 1500);
        assert_eq!(summary_excerpt("short"), "short");
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(clean_recognized_text("```text\nHello\nWorld\n```"), "Hello\nWorld");
        assert_eq!(clean_recognized_text("```TEXT Hi```"), "Hi");
        assert_eq!(clean_recognized_text("```\nplain\n```"), "plain");
        assert_eq!(clean_recognized_text("no fence"), "no fence");
    }

    #[test]
    fn empty_recognition_has_placeholder() {
        assert_eq!(clean_recognized_text(""), NO_TEXT_DETECTED);
        assert_eq!(clean_recognized_text("```\n```"), NO_TEXT_DETECTED);
    }
}
