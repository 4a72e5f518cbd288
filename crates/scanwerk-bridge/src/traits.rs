// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait for frame acquisition.

use image::RgbaImage;
use scanwerk_core::FrameSize;
use scanwerk_core::error::Result;

/// Supplies one RGBA-8 frame per capture tick.
///
/// Every frame from a given source has the same dimensions for the source's
/// lifetime. Acquisition failures surface as `ScannerError::Acquisition` or
/// `ScannerError::PlatformUnavailable`; callers do not retry.
pub trait FrameSource: Send {
    /// Human-readable source name (e.g. "Desktop (stub)", a file name).
    fn source_name(&self) -> &str;

    /// Dimensions every frame from this source will have.
    fn frame_size(&self) -> FrameSize;

    /// Grab the next frame.
    fn next_frame(&mut self) -> Result<RgbaImage>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn source_name(&self) -> &str {
        (**self).source_name()
    }

    fn frame_size(&self) -> FrameSize {
        (**self).frame_size()
    }

    fn next_frame(&mut self) -> Result<RgbaImage> {
        (**self).next_frame()
    }
}
