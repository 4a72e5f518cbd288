// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan session state — one explicit object holding either the live-capture
// phase or the corner-correction phase, never both.

use image::RgbaImage;
use scanwerk_core::error::{Result, ScannerError};
use scanwerk_core::{Detection, DetectionResult, FrameSize, ScannerConfig, SessionId};
use scanwerk_vision::image::{annotate_detection, draw_guidance_frames};
use scanwerk_vision::{
    FrameDetector, GuidanceEvaluator, GuidanceReport, InteractiveCorrector, PerspectiveRectifier,
};
use tracing::{debug, info, warn};

/// Which of the two mutually exclusive phases the session is in.
#[derive(Debug)]
pub enum Phase {
    /// Frames are being detected and annotated every tick.
    Streaming,
    /// Capture is suspended while the user adjusts corners.
    Correcting(Box<InteractiveCorrector>),
}

/// Everything the display needs after one live tick.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub detection: DetectionResult,
    /// Guidance verdict, only in guidance mode.
    pub report: Option<GuidanceReport>,
    /// Source frame with the detection outline (and guidance boxes) drawn.
    pub annotated: RgbaImage,
    /// Live rectification preview, only in document mode.
    pub rectified: Option<RgbaImage>,
    /// Whether this frame may be frozen for correction.
    pub acceptable: bool,
}

/// The last acceptable frame and its detection, held for freezing.
#[derive(Debug, Clone)]
struct Candidate {
    frame: RgbaImage,
    detection: Detection,
}

/// State for one scanning session.
#[derive(Debug)]
pub struct ScanSession {
    id: SessionId,
    config: ScannerConfig,
    detector: FrameDetector,
    rectifier: PerspectiveRectifier,
    guidance: Option<GuidanceEvaluator>,
    phase: Phase,
    candidate: Option<Candidate>,
    status_message: Option<String>,
}

impl ScanSession {
    /// Create a session for frames of `frame_size`. The config is validated.
    pub fn new(frame_size: FrameSize, config: ScannerConfig) -> Result<Self> {
        config.validate()?;
        let session = Self {
            id: SessionId::new(),
            detector: FrameDetector::new(frame_size, &config),
            rectifier: PerspectiveRectifier::for_frame(frame_size, &config),
            guidance: config
                .guidance
                .map(|g| GuidanceEvaluator::new(frame_size, g)),
            config,
            phase: Phase::Streaming,
            candidate: None,
            status_message: None,
        };
        info!(
            session = %session.id,
            mode = ?session.config.mode,
            width = frame_size.width,
            height = frame_size.height,
            "Scan session created"
        );
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn frame_size(&self) -> FrameSize {
        self.detector.frame_size()
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.phase, Phase::Streaming)
    }

    /// Latest status line for the feedback display.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Whether a frame is ready to be frozen.
    #[cfg(test)]
    pub fn has_candidate(&self) -> bool {
        self.candidate.is_some()
    }

    /// Run one live tick: detect, evaluate, annotate.
    ///
    /// In guidance mode a frame is acceptable only when in range. In document
    /// mode any detection that rectifies cleanly is acceptable; a degenerate
    /// detection is logged and live capture simply continues.
    pub fn process_frame(&mut self, frame: RgbaImage) -> Result<FrameOutcome> {
        if !self.is_streaming() {
            return Err(ScannerError::PreconditionViolation(
                "frame submitted while correcting corners".into(),
            ));
        }

        let detection = self.detector.detect(&frame)?;
        let mut annotated = annotate_detection(&frame, &detection);

        let (report, rectified, acceptable) = match &self.guidance {
            Some(evaluator) => {
                draw_guidance_frames(&mut annotated, evaluator.frames());
                let report = evaluator.evaluate(&detection);
                let acceptable = report.acceptable;
                self.status_message = Some(report.message.clone());
                (Some(report), None, acceptable)
            }
            None => {
                let rectified = detection.as_ref().and_then(|d| {
                    match self.rectifier.rectify(&frame, &d.quad) {
                        Ok(r) => Some(r.image),
                        Err(err) => {
                            warn!(error = %err, "Live rectification skipped");
                            None
                        }
                    }
                });
                let acceptable = rectified.is_some();
                (None, rectified, acceptable)
            }
        };

        self.candidate = match detection {
            Some(d) if acceptable => Some(Candidate {
                frame,
                detection: d,
            }),
            _ => None,
        };
        debug!(
            detected = detection.is_some(),
            acceptable, "Frame processed"
        );

        Ok(FrameOutcome {
            detection,
            report,
            annotated,
            rectified,
            acceptable,
        })
    }

    /// Freeze the last acceptable frame and hand it to a correction session.
    pub fn freeze(&mut self) -> Result<&mut InteractiveCorrector> {
        if !self.is_streaming() {
            return Err(ScannerError::PreconditionViolation(
                "already correcting corners".into(),
            ));
        }
        let candidate = self.candidate.take().ok_or_else(|| {
            ScannerError::PreconditionViolation("no acceptable frame to freeze".into())
        })?;

        let corrector =
            InteractiveCorrector::begin(candidate.frame, candidate.detection.quad, &self.config);
        info!(session = %self.id, correction = %corrector.id(), "Frame frozen");
        self.status_message = Some("Drag the corners to adjust, then confirm.".into());
        self.phase = Phase::Correcting(Box::new(corrector));

        match &mut self.phase {
            Phase::Correcting(corrector) => Ok(&mut **corrector),
            Phase::Streaming => Err(ScannerError::PreconditionViolation(
                "correction phase lost after freeze".into(),
            )),
        }
    }

    /// The active correction session, if any.
    pub fn corrector_mut(&mut self) -> Option<&mut InteractiveCorrector> {
        match &mut self.phase {
            Phase::Correcting(corrector) => Some(&mut **corrector),
            Phase::Streaming => None,
        }
    }

    /// Abandon any correction and go back to live capture.
    pub fn restart(&mut self) {
        if let Phase::Correcting(corrector) = &self.phase {
            info!(correction = %corrector.id(), "Correction discarded");
        }
        self.phase = Phase::Streaming;
        self.candidate = None;
        self.status_message = None;
    }

    /// Finish correction: rectify once more and return the final raster.
    ///
    /// The session returns to live capture whether or not the final
    /// rectification succeeds.
    pub fn commit(&mut self) -> Result<RgbaImage> {
        let Phase::Correcting(corrector) = std::mem::replace(&mut self.phase, Phase::Streaming)
        else {
            return Err(ScannerError::PreconditionViolation(
                "nothing to commit outside correction".into(),
            ));
        };
        self.status_message = None;
        (*corrector).commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use scanwerk_core::{GuidanceConfig, Point, ScanMode};

    const SIZE: FrameSize = FrameSize::new(640, 480);

    /// 640x480 dark frame with a light 300x200 rectangle in the centre.
    fn document_frame() -> RgbaImage {
        RgbaImage::from_fn(640, 480, |x, y| {
            if (170..470).contains(&x) && (140..340).contains(&y) {
                Rgba([230, 230, 230, 255])
            } else {
                Rgba([20, 20, 20, 255])
            }
        })
    }

    fn blank_frame() -> RgbaImage {
        RgbaImage::from_pixel(640, 480, Rgba([128, 128, 128, 255]))
    }

    #[test]
    fn document_mode_accepts_detected_frame() {
        let mut session = ScanSession::new(SIZE, ScannerConfig::default()).unwrap();
        let outcome = session.process_frame(document_frame()).unwrap();

        let area = outcome.detection.expect("rectangle detected").area;
        assert!((area - 60_000.0).abs() < 6_000.0, "area {area}");
        assert!(outcome.acceptable);
        assert!(outcome.report.is_none());
        assert_eq!(outcome.rectified.unwrap().dimensions(), (640, 480));
        assert!(session.has_candidate());
    }

    #[test]
    fn blank_frame_clears_candidate() {
        let mut session = ScanSession::new(SIZE, ScannerConfig::default()).unwrap();
        session.process_frame(document_frame()).unwrap();
        let outcome = session.process_frame(blank_frame()).unwrap();
        assert!(outcome.detection.is_none());
        assert!(!outcome.acceptable);
        assert!(!session.has_candidate());
        assert!(session.freeze().is_err());
    }

    #[test]
    fn guidance_mode_reports_status() {
        let mut config = ScannerConfig::for_mode(ScanMode::Card);
        config.guidance = Some(GuidanceConfig {
            min_area: 20_000.0,
            max_area: 100_000.0,
        });
        let mut session = ScanSession::new(SIZE, config).unwrap();
        let outcome = session.process_frame(document_frame()).unwrap();
        let report = outcome.report.unwrap();
        assert!(report.acceptable, "{}", report.message);
        assert_eq!(session.status_message(), Some("Object detected in range."));
        assert!(outcome.rectified.is_none());
    }

    #[test]
    fn freeze_suspends_capture_until_restart() {
        let mut session = ScanSession::new(SIZE, ScannerConfig::default()).unwrap();
        session.process_frame(document_frame()).unwrap();
        session.freeze().unwrap();
        assert!(!session.is_streaming());
        assert!(matches!(
            session.process_frame(document_frame()),
            Err(ScannerError::PreconditionViolation(_))
        ));

        session.restart();
        assert!(session.is_streaming());
        assert!(session.corrector_mut().is_none());
        assert!(session.process_frame(document_frame()).is_ok());
    }

    #[test]
    fn end_to_end_freeze_drag_commit() {
        let mut session = ScanSession::new(SIZE, ScannerConfig::default()).unwrap();
        session.process_frame(document_frame()).unwrap();

        let corrector = session.freeze().unwrap();
        let top_left = corrector.corners()[0];
        assert!(corrector.pointer_down(top_left).unwrap());
        corrector
            .pointer_move(Point::new(top_left.x + 1.0, top_left.y + 1.0))
            .unwrap();
        corrector.pointer_up().unwrap();

        let out = session.commit().unwrap();
        assert!(session.is_streaming());
        assert_eq!(out.dimensions(), (640, 480));

        // Content fills the padded rectangle (50,50)-(590,430).
        let light = |x: u32, y: u32| out.get_pixel(x, y).0[0] > 150;
        assert!(light(70, 70));
        assert!(light(570, 410));
        assert!(light(320, 240));
        // The padding band maps back onto the dark surround, still inside the
        // source frame, so it is opaque rather than background.
        let padding = out.get_pixel(20, 20);
        assert!(padding.0[0] < 100, "{padding:?}");
        assert_eq!(padding.0[3], 255);
    }

    #[test]
    fn commit_outside_correction_is_rejected() {
        let mut session = ScanSession::new(SIZE, ScannerConfig::default()).unwrap();
        assert!(matches!(
            session.commit(),
            Err(ScannerError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ScannerConfig {
            target_frame_rate: 0,
            ..Default::default()
        };
        assert!(matches!(
            ScanSession::new(SIZE, config),
            Err(ScannerError::InvalidConfig(_))
        ));
    }
}
