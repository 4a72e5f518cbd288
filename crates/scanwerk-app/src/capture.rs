// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture loop — pulls one frame per tick from a `FrameSource` and feeds it
// through the scan session at a fixed rate. Late ticks are skipped, not
// queued.

use std::time::Duration;

use scanwerk_bridge::FrameSource;
use scanwerk_core::error::Result;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::state::{FrameOutcome, ScanSession};

/// Drives a [`ScanSession`] from a frame source.
pub struct CaptureLoop<S: FrameSource> {
    source: S,
    session: ScanSession,
    period: Duration,
    ticks: u64,
}

impl<S: FrameSource> CaptureLoop<S> {
    /// The session must have been created for the source's frame size.
    pub fn new(source: S, session: ScanSession) -> Result<Self> {
        let size = source.frame_size();
        session
            .frame_size()
            .ensure_matches(size.width, size.height)?;
        let period = frame_period(session.config().target_frame_rate);
        Ok(Self {
            source,
            session,
            period,
            ticks: 0,
        })
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn into_session(self) -> ScanSession {
        self.session
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One tick: grab a frame and process it. Acquisition errors are
    /// returned as-is; there is no retry.
    pub fn tick(&mut self) -> Result<FrameOutcome> {
        let frame = self.source.next_frame()?;
        let outcome = self.session.process_frame(frame)?;
        self.ticks += 1;
        Ok(outcome)
    }

    /// Tick at the target rate until a frame is acceptable.
    ///
    /// Returns `None` if `max_ticks` pass without an acceptable frame.
    #[instrument(skip(self), fields(source = self.source.source_name(), period_ms = self.period.as_millis() as u64))]
    pub async fn run_until_acceptable(&mut self, max_ticks: Option<u64>) -> Result<Option<FrameOutcome>> {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut remaining = max_ticks;
        loop {
            if remaining == Some(0) {
                info!(ticks = self.ticks, "No acceptable frame within tick budget");
                return Ok(None);
            }
            interval.tick().await;

            let outcome = self.tick()?;
            if let Some(report) = &outcome.report {
                debug!(message = %report.message, "Guidance");
            }
            if outcome.acceptable {
                info!(ticks = self.ticks, "Acceptable frame captured");
                return Ok(Some(outcome));
            }
            remaining = remaining.map(|n| n - 1);
        }
    }
}

/// Tick period for `fps` frames per second (at least 1 fps).
pub fn frame_period(fps: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(fps.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use scanwerk_bridge::{StillImageSource, StubCamera};
    use scanwerk_core::{FrameSize, ScannerConfig, ScannerError};

    const SIZE: FrameSize = FrameSize::new(320, 240);

    fn blank() -> RgbaImage {
        RgbaImage::from_pixel(320, 240, Rgba([90, 90, 90, 255]))
    }

    fn page() -> RgbaImage {
        RgbaImage::from_fn(320, 240, |x, y| {
            if (80..240).contains(&x) && (60..180).contains(&y) {
                Rgba([240, 240, 240, 255])
            } else {
                Rgba([15, 15, 15, 255])
            }
        })
    }

    fn session() -> ScanSession {
        ScanSession::new(SIZE, ScannerConfig::default()).unwrap()
    }

    #[test]
    fn period_follows_frame_rate() {
        assert_eq!(frame_period(10), Duration::from_millis(100));
        assert_eq!(frame_period(0), Duration::from_secs(1));
    }

    #[test]
    fn mismatched_source_is_rejected() {
        let source = StillImageSource::new("small", RgbaImage::new(10, 10));
        assert!(matches!(
            CaptureLoop::new(source, session()),
            Err(ScannerError::DimensionMismatch { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn runs_until_document_appears() {
        let source =
            StillImageSource::from_frames("seq", vec![blank(), blank(), page()]).unwrap();
        let mut capture = CaptureLoop::new(source, session()).unwrap();

        let outcome = capture.run_until_acceptable(Some(10)).await.unwrap();
        let outcome = outcome.expect("page frame accepted");
        assert!(outcome.detection.is_some());
        assert_eq!(capture.ticks(), 3);
        assert!(capture.session().has_candidate());
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_tick_budget() {
        let source = StillImageSource::new("blank", blank());
        let mut capture = CaptureLoop::new(source, session()).unwrap();
        assert!(capture.run_until_acceptable(Some(4)).await.unwrap().is_none());
        assert_eq!(capture.ticks(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn acquisition_failure_stops_the_loop() {
        let session = ScanSession::new(FrameSize::new(640, 480), ScannerConfig::default()).unwrap();
        let mut capture = CaptureLoop::new(StubCamera, session).unwrap();
        assert!(matches!(
            capture.run_until_acceptable(None).await,
            Err(ScannerError::PlatformUnavailable)
        ));
        assert_eq!(capture.ticks(), 0);
    }
}
