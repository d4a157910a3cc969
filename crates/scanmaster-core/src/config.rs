// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

use crate::types::{FreeLimits, LanguageCode, PageLayout, PaperSize};

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Paper size used when exporting documents.
    pub paper_size: PaperSize,
    /// How exported pages are sized.
    pub page_layout: PageLayout,
    /// Quality factor in (0, 1] used by "compress" when none is given.
    pub compress_quality: f32,
    /// Default translation target.
    pub target_language: LanguageCode,
    /// Daily allowances on the free plan.
    pub free_limits: FreeLimits,
    /// Retry policy for remote assistant calls.
    pub retry: RetrySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            page_layout: PageLayout::FitWidth,
            compress_quality: 0.5,
            target_language: LanguageCode::En,
            free_limits: FreeLimits::default(),
            retry: RetrySettings::default(),
        }
    }
}

/// Backoff settings for OCR and translation calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "compress_quality": 0.3, "target_language": "Fr" }"#)
                .expect("parse");
        assert_eq!(config.compress_quality, 0.3);
        assert_eq!(config.target_language, LanguageCode::Fr);
        assert_eq!(config.paper_size, PaperSize::A4);
        assert_eq!(config.free_limits.ocr_daily, 5);
        assert_eq!(config.retry.max_retries, 2);
    }
}
