// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the person holding the camera.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Programming errors (precondition violations) still get a message, but are
// flagged `Severity::Internal` so the caller can log rather than nag.

use crate::error::ScannerError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// User must do something (grant camera access, reposition the document).
    ActionRequired,
    /// Cannot be fixed by the user — missing camera, unreadable file.
    Permanent,
    /// A bug in the calling code; not the user's fault.
    Internal,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ScannerError` into a `HumanError`.
pub fn humanize_error(err: &ScannerError) -> HumanError {
    match err {
        ScannerError::Acquisition(detail) => humanize_acquisition_error(detail),

        ScannerError::PlatformUnavailable => HumanError {
            message: "This device has no camera we can use.".into(),
            suggestion: "Try scanning a photo from a file instead.".into(),
            severity: Severity::Permanent,
        },

        ScannerError::DegenerateGeometry(_) => HumanError {
            message: "The corners don't form a usable shape.".into(),
            suggestion: "Drag the four corners so they sit on the corners of the document, without crossing or lining up.".into(),
            severity: Severity::ActionRequired,
        },

        ScannerError::PreconditionViolation(detail) => HumanError {
            message: "Something went wrong inside the scanner.".into(),
            suggestion: format!("Please restart the scan. (Detail: {detail})"),
            severity: Severity::Internal,
        },

        ScannerError::DimensionMismatch { .. } => HumanError {
            message: "The camera changed resolution mid-scan.".into(),
            suggestion: "Please restart the scan.".into(),
            severity: Severity::Internal,
        },

        ScannerError::ImageError(detail) => HumanError {
            message: "We couldn't read this picture.".into(),
            suggestion: format!("Try a JPEG or PNG photo instead. ({detail})"),
            severity: Severity::Permanent,
        },

        ScannerError::InvalidConfig(detail) => HumanError {
            message: "The scanner settings are invalid.".into(),
            suggestion: format!("Fix the settings file, or delete it to use defaults. ({detail})"),
            severity: Severity::ActionRequired,
        },

        ScannerError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "We couldn't find that file.".into(),
                suggestion: "Check the file name and try again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We aren't allowed to open that file.".into(),
                suggestion: "Check the file's permissions and try again.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "A file couldn't be read or written.".into(),
                suggestion: format!("Try again. (Detail: {io_err})"),
                severity: Severity::Permanent,
            },
        },

        ScannerError::Serialization(detail) => HumanError {
            message: "The scanner settings file is damaged.".into(),
            suggestion: format!("Delete the settings file to use defaults. ({detail})"),
            severity: Severity::ActionRequired,
        },
    }
}

/// Classify a camera acquisition failure detail string.
fn humanize_acquisition_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("denied") || lower.contains("permission") || lower.contains("notallowed") {
        HumanError {
            message: "Camera access was blocked.".into(),
            suggestion: "Allow camera access for this app in your settings, then start the scan again.".into(),
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("not found") || lower.contains("no camera") || lower.contains("notfound") {
        HumanError {
            message: "No camera was found.".into(),
            suggestion: "Connect a camera, or scan a photo from a file instead.".into(),
            severity: Severity::Permanent,
        }
    } else if lower.contains("in use") || lower.contains("busy") || lower.contains("notreadable") {
        HumanError {
            message: "The camera is busy.".into(),
            suggestion: "Close any other app that is using the camera, then start the scan again.".into(),
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "The camera couldn't be started.".into(),
            suggestion: format!("Start the scan again. (Detail: {detail})"),
            severity: Severity::Permanent,
        }
    }
}
