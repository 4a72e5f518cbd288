// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Size/position guidance — tells the user to zoom or move until the detected
// object sits inside the target envelope.

use scanwerk_core::{
    Bounds, Detection, DetectionResult, Direction, FrameSize, GuidanceConfig, Point, Quadrilateral,
};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::geometry::{CornerSelector, ExtremalCornerSelector};

/// Reference card proportions for the guidance overlay (credit-card-like).
const CARD_WIDTH: f64 = 280.0;
const CARD_HEIGHT: f64 = 180.0;

/// A static target rectangle drawn over the live preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuidanceBox {
    pub quad: Quadrilateral,
}

impl GuidanceBox {
    /// A 280:180 rectangle scaled to enclose `area` px², centred on the canvas.
    pub fn card_frame(canvas: FrameSize, area: f64) -> Self {
        let scale = (area / (CARD_WIDTH * CARD_HEIGHT)).sqrt();
        let w = CARD_WIDTH * scale;
        let h = CARD_HEIGHT * scale;
        let x = canvas.width as f64 / 2.0 - w / 2.0;
        let y = canvas.height as f64 / 2.0 - h / 2.0;

        let pt = |px: f64, py: f64| Point::new(px as f32, py as f32);
        Self {
            quad: Quadrilateral::new([pt(x, y), pt(x + w, y), pt(x + w, y + h), pt(x, y + h)]),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.quad.bounds()
    }
}

/// The min-size and max-size overlays for one canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuidanceFrames {
    pub canvas: FrameSize,
    pub min_box: GuidanceBox,
    pub max_box: GuidanceBox,
}

impl GuidanceFrames {
    pub fn new(canvas: FrameSize, config: &GuidanceConfig) -> Self {
        Self {
            canvas,
            min_box: GuidanceBox::card_frame(canvas, config.min_area),
            max_box: GuidanceBox::card_frame(canvas, config.max_area),
        }
    }
}

/// Per-frame guidance verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GuidanceStatus {
    NoObject,
    TooSmall { area: f64 },
    TooLarge { area: f64 },
    /// The detection crosses this side of the max-size box.
    OutOfBounds(Direction),
    InRange,
}

impl GuidanceStatus {
    /// Only an in-range detection may be frozen for correction.
    pub fn is_acceptable(&self) -> bool {
        matches!(self, Self::InRange)
    }

    /// The status line shown to the user.
    pub fn message(&self) -> String {
        match self {
            Self::NoObject => "No object detected.".into(),
            Self::TooSmall { area } => {
                format!("Object Detected. Please zoom in. current area: {area}")
            }
            Self::TooLarge { area } => {
                format!("Object Detected. Please zoom out. current area: {area}")
            }
            Self::OutOfBounds(Direction::Left) => "Move right".into(),
            Self::OutOfBounds(Direction::Right) => "Move left".into(),
            Self::OutOfBounds(Direction::Up) => "Move up".into(),
            Self::OutOfBounds(Direction::Down) => "Move down".into(),
            Self::InRange => "Object detected in range.".into(),
        }
    }
}

/// What the caller's feedback display consumes each frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuidanceReport {
    pub status: GuidanceStatus,
    pub message: String,
    pub acceptable: bool,
}

impl From<GuidanceStatus> for GuidanceReport {
    fn from(status: GuidanceStatus) -> Self {
        Self {
            message: status.message(),
            acceptable: status.is_acceptable(),
            status,
        }
    }
}

/// Evaluates detections against a fixed area window and guidance overlay.
///
/// Holds no per-frame state; only the overlays persist, and they are
/// rebuilt by [`resize`](Self::resize) when the canvas changes.
pub struct GuidanceEvaluator {
    config: GuidanceConfig,
    frames: GuidanceFrames,
    selector: Box<dyn CornerSelector>,
}

impl GuidanceEvaluator {
    pub fn new(canvas: FrameSize, config: GuidanceConfig) -> Self {
        Self::with_selector(canvas, config, Box::new(ExtremalCornerSelector))
    }

    /// Use a different strategy for the representative corners whose bounds
    /// are checked against the max-size box.
    pub fn with_selector(
        canvas: FrameSize,
        config: GuidanceConfig,
        selector: Box<dyn CornerSelector>,
    ) -> Self {
        Self {
            frames: GuidanceFrames::new(canvas, &config),
            config,
            selector,
        }
    }

    pub fn frames(&self) -> &GuidanceFrames {
        &self.frames
    }

    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }

    /// Recompute the overlays for a new canvas size.
    pub fn resize(&mut self, canvas: FrameSize) {
        if canvas != self.frames.canvas {
            debug!(width = canvas.width, height = canvas.height, "Guidance frames resized");
            self.frames = GuidanceFrames::new(canvas, &self.config);
        }
    }

    /// Classify one frame's detection.
    ///
    /// Area is checked first (too small, then too large). Position is then
    /// checked against the max-size box in the order left, right, up, down;
    /// the first violated side is the only one reported.
    #[instrument(skip_all)]
    pub fn evaluate(&self, detection: &DetectionResult) -> GuidanceReport {
        let status = match detection {
            None => GuidanceStatus::NoObject,
            Some(d) => self.classify(d),
        };
        debug!(?status, "Guidance evaluated");
        status.into()
    }

    fn classify(&self, detection: &Detection) -> GuidanceStatus {
        let area = detection.area;
        if area < self.config.min_area {
            return GuidanceStatus::TooSmall { area };
        }
        if area > self.config.max_area {
            return GuidanceStatus::TooLarge { area };
        }

        let selected = self.selector.select(&detection.quad.corners);
        let corners = if selected.is_empty() {
            &detection.quad.corners[..]
        } else {
            &selected[..]
        };
        let object = Bounds::of(corners);
        let envelope = self.frames.max_box.bounds();

        if object.min_x < envelope.min_x {
            GuidanceStatus::OutOfBounds(Direction::Left)
        } else if object.max_x > envelope.max_x {
            GuidanceStatus::OutOfBounds(Direction::Right)
        } else if object.min_y < envelope.min_y {
            GuidanceStatus::OutOfBounds(Direction::Up)
        } else if object.max_y > envelope.max_y {
            GuidanceStatus::OutOfBounds(Direction::Down)
        } else {
            GuidanceStatus::InRange
        }
    }
}

impl std::fmt::Debug for GuidanceEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuidanceEvaluator")
            .field("config", &self.config)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
