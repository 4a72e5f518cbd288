// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
///
/// Finding nothing in a frame is not an error; it is a `None` detection.
#[derive(Debug, Error)]
pub enum ScannerError {
    // -- Acquisition --
    #[error("camera acquisition failed: {0}")]
    Acquisition(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Programming errors at the pipeline boundary --
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("frame dimensions {actual_width}x{actual_height} do not match session dimensions {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    // -- Geometry --
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    // -- Image / configuration --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScannerError {
    /// Build a `DimensionMismatch` from `(width, height)` pairs.
    pub fn dimension_mismatch(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: actual.0,
            actual_height: actual.1,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScannerError>;
