// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Still-image frame source — replays decoded photos as if they were camera
// frames, cycling through them one per tick.

use image::RgbaImage;
use scanwerk_core::FrameSize;
use scanwerk_core::error::{Result, ScannerError};
use tracing::debug;

use crate::traits::FrameSource;

/// Replays a fixed list of same-sized frames forever.
#[derive(Debug, Clone)]
pub struct StillImageSource {
    name: String,
    size: FrameSize,
    frames: Vec<RgbaImage>,
    cursor: usize,
}

impl StillImageSource {
    /// A source that returns `frame` on every tick.
    pub fn new(name: impl Into<String>, frame: RgbaImage) -> Self {
        Self {
            name: name.into(),
            size: FrameSize::new(frame.width(), frame.height()),
            frames: vec![frame],
            cursor: 0,
        }
    }

    /// A source cycling through `frames` in order.
    ///
    /// All frames must share the first frame's dimensions.
    pub fn from_frames(name: impl Into<String>, frames: Vec<RgbaImage>) -> Result<Self> {
        let first = frames.first().ok_or_else(|| {
            ScannerError::PreconditionViolation("still-image source needs at least one frame".into())
        })?;
        let size = FrameSize::new(first.width(), first.height());
        for frame in &frames[1..] {
            size.ensure_matches(frame.width(), frame.height())?;
        }
        Ok(Self {
            name: name.into(),
            size,
            frames,
            cursor: 0,
        })
    }
}

impl FrameSource for StillImageSource {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn frame_size(&self) -> FrameSize {
        self.size
    }

    fn next_frame(&mut self) -> Result<RgbaImage> {
        let frame = self.frames[self.cursor].clone();
        debug!(source = %self.name, index = self.cursor, "Still frame served");
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(frame)
    }
}
