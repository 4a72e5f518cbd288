// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering and four-corner selection.

use scanwerk_core::Point;

/// Order four points as `[top-left, top-right, bottom-right, bottom-left]`.
///
/// The points are stably sorted by ascending `y`; the first two form the top
/// pair and the last two the bottom pair, and each pair is then sorted by
/// ascending `x`.
///
/// This labels corners correctly only for roughly axis-aligned shapes. Past
/// about 45° of rotation the "top pair" stops being the top edge and corners
/// are mislabelled. Tests pin that behaviour; changing it changes which
/// corner the rectified output treats as top-left.
pub fn sort_corners(points: [Point; 4]) -> [Point; 4] {
    let mut by_y = points;
    by_y.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut top = [by_y[0], by_y[1]];
    let mut bottom = [by_y[2], by_y[3]];
    top.sort_by(|a, b| a.x.total_cmp(&b.x));
    bottom.sort_by(|a, b| a.x.total_cmp(&b.x));

    [top[0], top[1], bottom[1], bottom[0]]
}

/// Strategy for reducing an arbitrary point set to four representative
/// corners.
///
/// Implementations must be deterministic and return points taken from (or
/// expressed in) the input's coordinate space. Fewer than four input points
/// yields an empty vector.
pub trait CornerSelector: Send + Sync {
    /// Pick four corners from `points`, or return an empty vector.
    fn select(&self, points: &[Point]) -> Vec<Point>;
}

/// Picks the extremes of `x + y` and `x - y`.
///
/// Returns `[top-left, top-right, bottom-right, bottom-left]` in image
/// coordinates. Ties go to the earliest point in the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtremalCornerSelector;

impl CornerSelector for ExtremalCornerSelector {
    fn select(&self, points: &[Point]) -> Vec<Point> {
        if points.len() < 4 {
            return Vec::new();
        }

        let sum = |p: &Point| p.x + p.y;
        let diff = |p: &Point| p.x - p.y;

        let mut top_left = points[0];
        let mut top_right = points[0];
        let mut bottom_right = points[0];
        let mut bottom_left = points[0];

        for p in &points[1..] {
            if sum(p) < sum(&top_left) {
                top_left = *p;
            }
            if diff(p) > diff(&top_right) {
                top_right = *p;
            }
            if sum(p) > sum(&bottom_right) {
                bottom_right = *p;
            }
            if diff(p) < diff(&bottom_left) {
                bottom_left = *p;
            }
        }

        vec![top_left, top_right, bottom_right, bottom_left]
    }
}

/// Takes the first four points as given.
///
/// Only meaningful when the input is already a four-vertex polygon.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingPointsSelector;

impl CornerSelector for LeadingPointsSelector {
    fn select(&self, points: &[Point]) -> Vec<Point> {
        if points.len() < 4 {
            return Vec::new();
        }
        points[..4].to_vec()
    }
}
