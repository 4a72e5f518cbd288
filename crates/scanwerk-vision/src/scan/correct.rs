// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive corner correction — drag the four corners of a frozen frame,
// re-rectify on release.

use chrono::{DateTime, Utc};
use image::RgbaImage;
use scanwerk_core::error::{Result, ScannerError};
use scanwerk_core::{FrameSize, Point, Quadrilateral, ScannerConfig, SessionId};
use tracing::{debug, info, instrument, warn};

use crate::image::annotate::{draw_corner_handles, draw_outline, OUTLINE_COLOR};
use crate::scan::rectify::PerspectiveRectifier;

const OUTLINE_THICKNESS: u32 = 1;

/// Pointer interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    /// Index into the corner array of the handle being dragged.
    Dragging(usize),
}

/// A frozen frame whose four corners the user can drag before committing.
///
/// Rectification runs on [`begin`](Self::begin) and on every pointer
/// release, never during a drag. Corners are used in the order the user
/// leaves them; they are not re-sorted after a drag.
#[derive(Debug, Clone)]
pub struct InteractiveCorrector {
    id: SessionId,
    frozen_at: DateTime<Utc>,
    frame: RgbaImage,
    corners: [Point; 4],
    state: DragState,
    handle_radius: f32,
    rectifier: PerspectiveRectifier,
    overlay: RgbaImage,
    rectified: Option<RgbaImage>,
}

impl InteractiveCorrector {
    /// Snapshot `frame` and the (already canonically ordered) `quad`, render
    /// the handles, and produce a first rectification.
    ///
    /// A degenerate initial quad is not an error here: the session opens
    /// without a rectified image and the user can drag corners to fix it.
    #[instrument(skip(frame, config), fields(width = frame.width(), height = frame.height()))]
    pub fn begin(frame: RgbaImage, quad: Quadrilateral, config: &ScannerConfig) -> Self {
        let size = FrameSize::new(frame.width(), frame.height());
        let rectifier = PerspectiveRectifier::for_frame(size, config);
        let overlay = frame.clone();

        let mut corrector = Self {
            id: SessionId::new(),
            frozen_at: Utc::now(),
            frame,
            corners: quad.corners,
            state: DragState::Idle,
            handle_radius: config.corner_handle_radius,
            rectifier,
            overlay,
            rectified: None,
        };
        corrector.render();
        if let Err(err) = corrector.rectify() {
            warn!(session = %corrector.id, error = %err, "Initial rectification failed");
        }
        info!(session = %corrector.id, "Correction session started");
        corrector
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn frozen_at(&self) -> DateTime<Utc> {
        self.frozen_at
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// The frozen frame with the current outline and handles drawn on it.
    pub fn overlay(&self) -> &RgbaImage {
        &self.overlay
    }

    /// The most recent successful rectification, if any.
    pub fn rectified(&self) -> Option<&RgbaImage> {
        self.rectified.as_ref()
    }

    /// Select the first corner within the handle radius of `pos`.
    ///
    /// Returns whether a corner was selected. A miss leaves the state as it
    /// was; there is no nearest-corner fallback.
    pub fn pointer_down(&mut self, pos: Point) -> Result<bool> {
        ensure_finite(pos)?;
        let hit = self
            .corners
            .iter()
            .position(|c| c.distance(&pos) < self.handle_radius);
        if let Some(index) = hit {
            self.state = DragState::Dragging(index);
            debug!(index, x = pos.x, y = pos.y, "Corner selected");
        }
        Ok(hit.is_some())
    }

    /// Move the selected corner to `pos` and redraw.
    ///
    /// Positions outside the frame are stored as given; the warp fills the
    /// part of the output that maps off-frame with transparent black.
    pub fn pointer_move(&mut self, pos: Point) -> Result<()> {
        ensure_finite(pos)?;
        if let DragState::Dragging(index) = self.state {
            self.corners[index] = pos;
            self.render();
        }
        Ok(())
    }

    /// End any drag and re-rectify with the current corners.
    ///
    /// On degenerate corners the error is returned and the previous
    /// rectified image is kept.
    pub fn pointer_up(&mut self) -> Result<&RgbaImage> {
        self.state = DragState::Idle;
        self.rectify()
    }

    /// Touch start using only the first active touch; no touches is a no-op.
    pub fn touch_start(&mut self, touches: &[Point]) -> Result<bool> {
        match touches.first() {
            Some(&pos) => self.pointer_down(pos),
            None => Ok(false),
        }
    }

    /// Touch move using only the first active touch.
    pub fn touch_move(&mut self, touches: &[Point]) -> Result<()> {
        match touches.first() {
            Some(&pos) => self.pointer_move(pos),
            None => Ok(()),
        }
    }

    pub fn touch_end(&mut self) -> Result<&RgbaImage> {
        self.pointer_up()
    }

    /// Final rectification with the current corners, ending the session.
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn commit(mut self) -> Result<RgbaImage> {
        self.state = DragState::Idle;
        self.rectify()?;
        info!("Correction session committed");
        self.rectified.ok_or_else(|| {
            ScannerError::PreconditionViolation("no rectified image after commit".into())
        })
    }

    fn rectify(&mut self) -> Result<&RgbaImage> {
        let quad = Quadrilateral::new(self.corners);
        let rectified = self.rectifier.rectify(&self.frame, &quad)?;
        Ok(self.rectified.insert(rectified.image))
    }

    fn render(&mut self) {
        self.overlay.clone_from(&self.frame);
        draw_outline(&mut self.overlay, &self.corners, OUTLINE_COLOR, OUTLINE_THICKNESS);
        draw_corner_handles(&mut self.overlay, &self.corners, self.handle_radius);
    }
}

fn ensure_finite(pos: Point) -> Result<()> {
    if pos.x.is_finite() && pos.y.is_finite() {
        Ok(())
    } else {
        Err(ScannerError::PreconditionViolation(format!(
            "pointer position {pos:?} is not finite"
        )))
    }
}
