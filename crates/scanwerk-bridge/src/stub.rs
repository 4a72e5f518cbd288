// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub camera for desktop/CI builds where no native camera is available.
//
// Every frame request fails with `PlatformUnavailable`.

use image::RgbaImage;
use scanwerk_core::FrameSize;
use scanwerk_core::error::{Result, ScannerError};

use crate::traits::FrameSource;

/// Nominal preview size reported by the stub.
const STUB_FRAME_SIZE: FrameSize = FrameSize::new(640, 480);

/// Camera that is never available.
#[derive(Debug, Default)]
pub struct StubCamera;

impl FrameSource for StubCamera {
    fn source_name(&self) -> &str {
        "Desktop (stub)"
    }

    fn frame_size(&self) -> FrameSize {
        STUB_FRAME_SIZE
    }

    fn next_frame(&mut self) -> Result<RgbaImage> {
        tracing::warn!("FrameSource::next_frame called on stub camera");
        Err(ScannerError::PlatformUnavailable)
    }
}
