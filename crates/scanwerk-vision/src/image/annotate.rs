// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview annotation — detection outlines, guidance overlays, and the
// draggable corner handles of a correction session.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use scanwerk_core::{DetectionResult, Point};

use crate::scan::guidance::GuidanceFrames;

pub const DETECTION_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const HANDLE_COLOR: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const GUIDANCE_MIN_COLOR: Rgba<u8> = Rgba([0xff, 0xa5, 0x00, 255]);
pub const GUIDANCE_MAX_COLOR: Rgba<u8> = Rgba([0x00, 0xc8, 0x53, 255]);

const DETECTION_THICKNESS: u32 = 3;
const GUIDANCE_THICKNESS: u32 = 3;

/// Draw a closed polygon through `corners` with roughly `thickness` px lines.
pub fn draw_outline(canvas: &mut RgbaImage, corners: &[Point], color: Rgba<u8>, thickness: u32) {
    if corners.len() < 2 {
        return;
    }
    let half = (thickness.max(1) as i32 - 1) / 2;
    for (i, start) in corners.iter().enumerate() {
        let end = corners[(i + 1) % corners.len()];
        for offset in -half..=half {
            let o = offset as f32;
            draw_line_segment_mut(canvas, (start.x + o, start.y), (end.x + o, end.y), color);
            draw_line_segment_mut(canvas, (start.x, start.y + o), (end.x, end.y + o), color);
        }
    }
}

/// Filled handles of `radius` px with a dark rim, one per corner.
pub fn draw_corner_handles(canvas: &mut RgbaImage, corners: &[Point], radius: f32) {
    let r = radius.round().max(1.0) as i32;
    for corner in corners {
        let center = (corner.x.round() as i32, corner.y.round() as i32);
        draw_filled_circle_mut(canvas, center, r, HANDLE_COLOR);
        draw_hollow_circle_mut(canvas, center, r, OUTLINE_COLOR);
    }
}

/// Draw the min and max guidance boxes.
pub fn draw_guidance_frames(canvas: &mut RgbaImage, frames: &GuidanceFrames) {
    draw_outline(canvas, &frames.min_box.quad.corners, GUIDANCE_MIN_COLOR, GUIDANCE_THICKNESS);
    draw_outline(canvas, &frames.max_box.quad.corners, GUIDANCE_MAX_COLOR, GUIDANCE_THICKNESS);
}

/// Copy of `frame` with the detected quadrilateral (if any) outlined.
pub fn annotate_detection(frame: &RgbaImage, detection: &DetectionResult) -> RgbaImage {
    let mut annotated = frame.clone();
    if let Some(d) = detection {
        draw_outline(&mut annotated, &d.quad.corners, DETECTION_COLOR, DETECTION_THICKNESS);
    }
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::{Detection, Quadrilateral};

    const BG: Rgba<u8> = Rgba([10, 10, 10, 255]);

    fn quad() -> Quadrilateral {
        Quadrilateral::new([
            Point::new(10.0, 10.0),
            Point::new(50.0, 10.0),
            Point::new(50.0, 40.0),
            Point::new(10.0, 40.0),
        ])
    }

    #[test]
    fn detection_outline_is_drawn_on_a_copy() {
        let frame = RgbaImage::from_pixel(64, 64, BG);
        let detection = Some(Detection { quad: quad(), area: 1200.0 });
        let annotated = annotate_detection(&frame, &detection);

        assert_eq!(*frame.get_pixel(30, 10), BG);
        assert_eq!(*annotated.get_pixel(30, 10), DETECTION_COLOR);
        assert_eq!(*annotated.get_pixel(50, 25), DETECTION_COLOR);
        assert_eq!(*annotated.get_pixel(30, 25), BG);
    }

    #[test]
    fn no_detection_leaves_frame_unchanged() {
        let frame = RgbaImage::from_pixel(16, 16, BG);
        assert_eq!(annotate_detection(&frame, &None), frame);
    }

    #[test]
    fn handles_are_filled_around_each_corner() {
        let mut canvas = RgbaImage::from_pixel(64, 64, BG);
        draw_corner_handles(&mut canvas, &quad().corners, 5.0);
        assert_eq!(*canvas.get_pixel(10, 10), HANDLE_COLOR);
        assert_eq!(*canvas.get_pixel(52, 42), HANDLE_COLOR);
        assert_eq!(*canvas.get_pixel(30, 25), BG);
    }
}
