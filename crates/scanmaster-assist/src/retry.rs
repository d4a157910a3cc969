// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retry engine with exponential backoff + jitter for remote assistant calls.
//
// Classifies errors into Transient (auto-retry), UserAction (wait for user),
// and Permanent (give up). Only transient errors trigger automatic retries.

use std::future::Future;
use std::time::Duration;

use scanmaster_core::config::RetrySettings;
use scanmaster_core::error::{Result, ScanmasterError};
use tracing::{debug, info, warn};

/// How an error should be handled by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network blip or overloaded service.
    Transient,
    /// Needs the user (upgrade, recapture, pick another file).
    UserAction,
    /// Retrying cannot help.
    Permanent,
}

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call.
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff).
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetrySettings::default().into()
    }
}

impl From<RetrySettings> for RetryConfig {
    fn from(settings: RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }
}

/// Result of evaluating whether to retry.
#[derive(Debug)]
pub enum RetryDecision {
    /// Retry after this delay.
    RetryAfter(Duration),
    /// Do not retry — error is permanent or user action needed.
    GiveUp(ErrorClass),
    /// Maximum retries exhausted.
    Exhausted,
}

/// Classify a `ScanmasterError` into an `ErrorClass` for retry decisions.
pub fn classify_error(err: &ScanmasterError) -> ErrorClass {
    match err {
        // Transient — remote service hiccups, busy database
        ScanmasterError::Ocr(_) => ErrorClass::Transient,
        ScanmasterError::Translation(_) => ErrorClass::Transient,
        ScanmasterError::Database(_) => ErrorClass::Transient,

        // User action needed
        ScanmasterError::QuotaExceeded { .. } => ErrorClass::UserAction,
        ScanmasterError::Decode(_) => ErrorClass::UserAction,
        ScanmasterError::NotFound(_) => ErrorClass::UserAction,

        // Permanent — bad input, nothing configured, local faults
        ScanmasterError::AssistantUnavailable => ErrorClass::Permanent,
        ScanmasterError::InvalidParameter(_) => ErrorClass::Permanent,
        ScanmasterError::Render(_) => ErrorClass::Permanent,
        ScanmasterError::Encode(_) => ErrorClass::Permanent,
        ScanmasterError::Pdf(_) => ErrorClass::Permanent,
        ScanmasterError::IntegrityMismatch { .. } => ErrorClass::Permanent,
        ScanmasterError::Serialization(_) => ErrorClass::Permanent,

        // IO errors depend on the kind
        ScanmasterError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                ErrorClass::UserAction
            }
            _ => ErrorClass::Transient,
        },
    }
}

/// Decide whether to retry based on the error class and attempt count.
pub fn should_retry(err: &ScanmasterError, attempt: u32, config: &RetryConfig) -> RetryDecision {
    match classify_error(err) {
        ErrorClass::Permanent => {
            info!("permanent error — not retrying");
            RetryDecision::GiveUp(ErrorClass::Permanent)
        }
        ErrorClass::UserAction => {
            info!("user action required — not auto-retrying");
            RetryDecision::GiveUp(ErrorClass::UserAction)
        }
        ErrorClass::Transient => {
            if attempt >= config.max_retries {
                warn!(attempt, max = config.max_retries, "retry limit exhausted");
                RetryDecision::Exhausted
            } else {
                let delay = compute_delay(attempt, config);
                debug!(attempt, delay_ms = delay.as_millis(), "scheduling retry");
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// runs out of retries. The last error is returned.
pub async fn retry_with_backoff<T, F, Fut>(
    config: &RetryConfig,
    label: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    info!(label, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => match should_retry(&err, attempt, config) {
                RetryDecision::RetryAfter(delay) => {
                    warn!(label, attempt, %err, delay_ms = delay.as_millis(), "call failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp(_) | RetryDecision::Exhausted => return Err(err),
            },
        }
    }
}

/// Compute exponential backoff delay with jitter.
///
/// delay = min(base * 2^attempt + jitter, max_delay)
fn compute_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let base_ms = config.base_delay.as_millis() as u64;
    let exp_ms = base_ms.saturating_mul(1u64 << attempt.min(10));
    let total_ms = exp_ms.saturating_add(jitter(base_ms, attempt));
    let capped_ms = total_ms.min(config.max_delay.as_millis() as u64);
    Duration::from_millis(capped_ms)
}

/// Deterministic jitter in [0, base) spread by a multiplicative hash of the
/// attempt number.
fn jitter(base_ms: u64, attempt: u32) -> u64 {
    let hash = (attempt as u64).wrapping_mul(6364136223846793005);
    hash % base_ms.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[test]
    fn remote_failures_are_transient() {
        assert_eq!(
            classify_error(&ScanmasterError::Ocr("503".into())),
            ErrorClass::Transient
        );
        assert_eq!(
            classify_error(&ScanmasterError::Translation("timeout".into())),
            ErrorClass::Transient
        );
    }

    #[test]
    fn missing_assistant_is_permanent() {
        assert!(matches!(
            should_retry(&ScanmasterError::AssistantUnavailable, 0, &RetryConfig::default()),
            RetryDecision::GiveUp(ErrorClass::Permanent)
        ));
    }

    #[test]
    fn retry_respects_max() {
        let config = RetryConfig {
            max_retries: 3,
            ..Default::default()
        };
        let err = ScanmasterError::Ocr("connection reset".into());
        assert!(matches!(should_retry(&err, 0, &config), RetryDecision::RetryAfter(_)));
        assert!(matches!(should_retry(&err, 3, &config), RetryDecision::Exhausted));
    }

    #[test]
    fn delay_increases_with_attempts() {
        let config = RetryConfig::default();
        let d0 = compute_delay(0, &config);
        let d1 = compute_delay(1, &config);
        let d2 = compute_delay(2, &config);
        assert!(d1 > d0);
        assert!(d2 > d1);
    }

    #[test]
    fn delay_capped_at_max() {
        let config = RetryConfig::default();
        assert!(compute_delay(20, &config) <= Duration::from_millis(8_000));
    }

    #[test]
    fn settings_convert() {
        let config: RetryConfig = RetrySettings {
            max_retries: 4,
            base_delay_ms: 250,
            max_delay_ms: 1_000,
        }
        .into();
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.base_delay, Duration::from_millis(250));
        assert_eq!(config.max_delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn transient_failure_then_success() {
        let calls = AtomicU32::new(0);
        let value = retry_with_backoff(&fast(), "ocr", || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ScanmasterError::Ocr("busy".into()))
            } else {
                Ok("text")
            }
        })
        .await
        .expect("second attempt succeeds");
        assert_eq!(value, "text");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(&fast(), "translate", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ScanmasterError::Translation("down".into()))
        })
        .await;
        assert!(matches!(result, Err(ScanmasterError::Translation(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(&fast(), "ocr", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ScanmasterError::AssistantUnavailable)
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
