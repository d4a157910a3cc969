// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The taxonomy uses four severity levels that drive presentation.

use crate::error::ScanmasterError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Network blip or busy backend — retrying may help.
    Transient,
    /// User must do something (recapture, pick another file).
    ActionRequired,
    /// Cannot be fixed by retrying or user action.
    Permanent,
    /// The free plan's allowance is used up.
    UpgradeRequired,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying again could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ScanmasterError` into a `HumanError`.
pub fn humanize_error(err: &ScanmasterError) -> HumanError {
    match err {
        // -- Image pipeline --
        ScanmasterError::Decode(_) => HumanError {
            message: "We couldn't read this image.".into(),
            suggestion: "The picture may be damaged or in an unusual format. Try capturing the page again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanmasterError::Render(_) => HumanError {
            message: "We couldn't draw on this page.".into(),
            suggestion: "Try a shorter watermark text, or try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanmasterError::Encode(_) => HumanError {
            message: "We couldn't save the edited image.".into(),
            suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanmasterError::InvalidParameter(detail) => HumanError {
            message: "That option isn't supported.".into(),
            suggestion: format!("Check the value and try again. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanmasterError::Pdf(_) => HumanError {
            message: "The PDF couldn't be created.".into(),
            suggestion: "Try exporting again, or export fewer pages at once.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Remote assistant --
        ScanmasterError::Ocr(_) => HumanError {
            message: "Failed to extract text.".into(),
            suggestion: "Please try again. Scanning with better lighting and the text in focus also helps.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanmasterError::Translation(_) => HumanError {
            message: "Translation failed.".into(),
            suggestion: "Check your connection and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanmasterError::AssistantUnavailable => HumanError {
            message: "Text recognition isn't available.".into(),
            suggestion: "No AI service is set up on this device.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanmasterError::QuotaExceeded { feature, limit } => HumanError {
            message: format!("You've used all {limit} free {feature} runs for today."),
            suggestion: "Upgrade to Pro for unlimited use, or come back tomorrow.".into(),
            retriable: false,
            severity: Severity::UpgradeRequired,
        },

        // -- Library --
        ScanmasterError::NotFound(_) => HumanError {
            message: "That document couldn't be found.".into(),
            suggestion: "It may have been deleted. Refresh the list and try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Storage --
        ScanmasterError::Database(_) => HumanError {
            message: "The app's data storage had a problem.".into(),
            suggestion: "Try closing and reopening the app. Your documents should still be there.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanmasterError::IntegrityMismatch { .. } => HumanError {
            message: "Saved data has been changed or damaged.".into(),
            suggestion: "The stored copy doesn't match what was saved. You may need to reset the library in Settings.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanmasterError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or try a different location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanmasterError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}
