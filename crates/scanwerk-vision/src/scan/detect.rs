// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-frame quadrilateral detection — grayscale, blur, adaptive Canny,
// morphological closing, external contours, polygon approximation.

use image::{GrayImage, RgbaImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::close;
use scanwerk_core::error::Result;
use scanwerk_core::{Detection, DetectionResult, FrameSize, Point, Quadrilateral, ScannerConfig};
use tracing::{debug, instrument, trace};

use crate::geometry::{approximate_polygon, polygon_area, polygon_perimeter, sort_corners};

/// Gaussian sigma equivalent to a 5x5 kernel with automatic sigma.
const BLUR_SIGMA: f32 = 1.1;

/// Canny thresholds as multiples of the mean blurred intensity.
const LOW_THRESHOLD_SCALE: f64 = 0.66;
const HIGH_THRESHOLD_SCALE: f64 = 1.33;

/// L-infinity radius of the closing element: 2 gives a 5x5 all-ones square.
const CLOSE_RADIUS: u8 = 2;

/// Finds the largest four-sided contour in a camera frame.
///
/// A detector is bound to one frame size for the lifetime of a capture
/// session; frames of any other size are rejected.
#[derive(Debug, Clone)]
pub struct FrameDetector {
    frame_size: FrameSize,
    min_contour_area: f64,
    approx_epsilon_ratio: f64,
}

impl FrameDetector {
    pub fn new(frame_size: FrameSize, config: &ScannerConfig) -> Self {
        Self {
            frame_size,
            min_contour_area: config.min_contour_area,
            approx_epsilon_ratio: config.approx_epsilon_ratio,
        }
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame_size
    }

    /// Run the full pipeline on one RGBA frame.
    ///
    /// ## Pipeline
    ///
    /// 1. Convert to grayscale
    /// 2. Gaussian blur (5x5 equivalent)
    /// 3. Canny with thresholds at 0.66x / 1.33x the mean blurred intensity
    /// 4. Morphological close with a 5x5 square
    /// 5. Trace external contours only
    /// 6. Keep the largest contour (above the area floor) whose polygon
    ///    approximation has exactly four vertices
    ///
    /// `Ok(None)` means nothing usable was found in this frame.
    #[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn detect(&self, frame: &RgbaImage) -> Result<DetectionResult> {
        self.frame_size.ensure_matches(frame.width(), frame.height())?;

        let closed = edge_map(frame);
        let contours = external_contours(&closed);
        debug!(contours = contours.len(), "External contours traced");

        let result = select_largest_quad(
            &contours,
            self.min_contour_area,
            self.approx_epsilon_ratio,
        );
        match &result {
            Some(detection) => debug!(
                area = detection.area,
                top_left = ?detection.quad.top_left(),
                bottom_right = ?detection.quad.bottom_right(),
                "Quadrilateral detected"
            ),
            None => trace!("No quadrilateral in frame"),
        }
        Ok(result)
    }
}

/// Stages 1-4: the closed edge map a frame's contours are traced from.
pub fn edge_map(frame: &RgbaImage) -> GrayImage {
    let gray = image::imageops::grayscale(frame);
    let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);

    let (low, high) = canny_thresholds(&blurred);
    trace!(low, high, "Canny thresholds");
    let edges = canny(&blurred, low, high);

    close(&edges, Norm::LInf, CLOSE_RADIUS)
}

/// Mean pixel value of a grayscale image; 0 for an empty image.
pub fn mean_intensity(gray: &GrayImage) -> f64 {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = gray.as_raw().iter().map(|&v| v as u64).sum();
    sum as f64 / count as f64
}

/// Adaptive Canny thresholds `(0.66 * mean, 1.33 * mean)`.
///
/// Floored at 1.0 so an all-black frame (mean 0) does not mark every
/// zero-gradient pixel as an edge.
pub fn canny_thresholds(blurred: &GrayImage) -> (f32, f32) {
    let mean = mean_intensity(blurred);
    let low = (LOW_THRESHOLD_SCALE * mean).max(1.0);
    let high = (HIGH_THRESHOLD_SCALE * mean).max(1.0);
    (low as f32, high as f32)
}

/// Outer borders that are not nested inside any other border, in tracer
/// emission order (raster scan order of each border's first pixel).
pub fn external_contours(edges: &GrayImage) -> Vec<Vec<Point>> {
    find_contours::<u32>(edges)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| Point::new(p.x as f32, p.y as f32))
                .collect()
        })
        .collect()
}

/// Running maximum over contours in the given order.
///
/// A contour is skipped if its area is below `min_area` or its
/// approximation (tolerance `epsilon_ratio * perimeter`) does not have
/// exactly four vertices. The current best is replaced only by a strictly
/// larger area, so among equal areas the earliest contour wins.
pub fn select_largest_quad(
    contours: &[Vec<Point>],
    min_area: f64,
    epsilon_ratio: f64,
) -> DetectionResult {
    let mut best: Option<Detection> = None;
    let mut best_area = 0.0f64;

    for (index, contour) in contours.iter().enumerate() {
        let area = polygon_area(contour);
        if area < min_area {
            continue;
        }

        let epsilon = epsilon_ratio * polygon_perimeter(contour, true);
        let poly = approximate_polygon(contour, epsilon);
        trace!(index, area, vertices = poly.len(), "Contour approximated");

        let Ok(corners) = <[Point; 4]>::try_from(poly.as_slice()) else {
            continue;
        };

        if area > best_area {
            best_area = area;
            best = Some(Detection {
                quad: Quadrilateral::new(sort_corners(corners)),
                area,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use scanwerk_core::ScannerError;

    const DARK: Rgba<u8> = Rgba([30, 30, 30, 255]);
    const LIGHT: Rgba<u8> = Rgba([235, 235, 235, 255]);

    /// Dark frame with one light axis-aligned rectangle `[x0, x1) x [y0, y1)`.
    fn frame_with_rect(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                LIGHT
            } else {
                DARK
            }
        })
    }

    fn detector(w: u32, h: u32) -> FrameDetector {
        FrameDetector::new(FrameSize::new(w, h), &ScannerConfig::default())
    }

    fn square(x: f32, y: f32, side: f32) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + side, y),
            Point::new(x + side, y + side),
            Point::new(x, y + side),
        ]
    }

    #[test]
    fn blank_frame_detects_nothing() {
        let frame = RgbaImage::from_pixel(320, 240, Rgba([128, 128, 128, 255]));
        assert!(detector(320, 240).detect(&frame).unwrap().is_none());
    }

    #[test]
    fn black_frame_detects_nothing() {
        let frame = RgbaImage::from_pixel(320, 240, Rgba([0, 0, 0, 255]));
        assert!(detector(320, 240).detect(&frame).unwrap().is_none());
    }

    #[test]
    fn single_rectangle_area_within_five_percent() {
        let frame = frame_with_rect(400, 300, 100, 80, 300, 220);
        let detection = detector(400, 300)
            .detect(&frame)
            .unwrap()
            .expect("rectangle should be detected");

        let true_area = 200.0 * 140.0;
        let rel = (detection.area - true_area).abs() / true_area;
        assert!(rel < 0.05, "area {} vs {true_area}", detection.area);

        let q = detection.quad;
        assert!((q.top_left().x - 100.0).abs() < 4.0 && (q.top_left().y - 80.0).abs() < 4.0);
        assert!((q.bottom_right().x - 300.0).abs() < 4.0 && (q.bottom_right().y - 220.0).abs() < 4.0);
    }

    #[test]
    fn mismatched_frame_size_is_rejected() {
        let frame = RgbaImage::from_pixel(100, 100, DARK);
        let err = detector(640, 480).detect(&frame).unwrap_err();
        assert!(matches!(err, ScannerError::DimensionMismatch { .. }));
    }

    #[test]
    fn thresholds_scale_with_mean() {
        let gray = GrayImage::from_pixel(10, 10, image::Luma([100]));
        assert_eq!(mean_intensity(&gray), 100.0);
        let (low, high) = canny_thresholds(&gray);
        assert!((low - 66.0).abs() < 1e-3);
        assert!((high - 133.0).abs() < 1e-3);
    }

    #[test]
    fn selection_skips_small_and_non_quad_contours() {
        let small = square(0.0, 0.0, 10.0);
        let triangle = vec![Point::new(0.0, 0.0), Point::new(500.0, 0.0), Point::new(250.0, 400.0)];
        let big = square(50.0, 50.0, 100.0);

        let detection = select_largest_quad(&[small, triangle, big.clone()], 5_000.0, 0.02)
            .expect("the big square qualifies");
        assert_eq!(detection.area, 10_000.0);
        assert_eq!(detection.quad.corners.to_vec(), big);
    }

    #[test]
    fn selection_keeps_first_of_equal_areas() {
        let first = square(0.0, 0.0, 100.0);
        let second = square(200.0, 200.0, 100.0);
        let detection = select_largest_quad(&[first.clone(), second], 5_000.0, 0.02).unwrap();
        assert_eq!(detection.quad.top_left(), first[0]);
    }

    #[test]
    fn selection_replaces_on_strictly_larger() {
        let smaller = square(0.0, 0.0, 100.0);
        let larger = square(200.0, 200.0, 120.0);
        let detection = select_largest_quad(&[smaller, larger.clone()], 5_000.0, 0.02).unwrap();
        assert_eq!(detection.quad.top_left(), larger[0]);
    }

    #[test]
    fn nothing_qualifies_gives_none() {
        assert!(select_largest_quad(&[], 5_000.0, 0.02).is_none());
        assert!(select_largest_quad(&[square(0.0, 0.0, 10.0)], 5_000.0, 0.02).is_none());
    }
}
