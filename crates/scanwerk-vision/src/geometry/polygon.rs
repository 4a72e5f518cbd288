// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Polygon measurements and closed-curve simplification.

use scanwerk_core::Point;

/// Signed shoelace area. Positive when the vertices run clockwise in image
/// coordinates (y pointing down).
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice_area += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    twice_area / 2.0
}

/// Enclosed area in px², independent of winding direction.
pub fn polygon_area(points: &[Point]) -> f64 {
    signed_area(points).abs()
}

/// Total length of the polyline, including the closing edge when `closed`.
pub fn polygon_perimeter(points: &[Point], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let open: f64 = points
        .windows(2)
        .map(|w| w[0].distance(&w[1]) as f64)
        .sum();
    if closed {
        open + points[points.len() - 1].distance(&points[0]) as f64
    } else {
        open
    }
}

/// Simplify a closed contour with Douglas-Peucker.
///
/// Every dropped point lies within `epsilon` px of the kept polygon. The
/// contour is split at its first point and the point farthest from it, both
/// halves are simplified independently, and the first point is dropped at
/// the end if it turns out to sit on a straight run.
pub fn approximate_polygon(contour: &[Point], epsilon: f64) -> Vec<Point> {
    let n = contour.len();
    if n < 3 {
        return contour.to_vec();
    }

    let first = contour[0];
    let mut far = 0;
    let mut far_dist = 0.0f32;
    for (i, p) in contour.iter().enumerate().skip(1) {
        let d = first.distance(p);
        if d > far_dist {
            far = i;
            far_dist = d;
        }
    }
    if far == 0 {
        // Every point coincides with the first one.
        return vec![first];
    }

    let mut result = Vec::with_capacity(8);
    simplify_open(&contour[..=far], epsilon, &mut result);

    let mut tail: Vec<Point> = contour[far..].to_vec();
    tail.push(first);
    simplify_open(&tail, epsilon, &mut result);

    if result.len() > 3 {
        let prev = result[result.len() - 1];
        let next = result[1];
        if line_distance(result[0], prev, next) <= epsilon {
            result.remove(0);
        }
    }

    result
}

/// Douglas-Peucker over an open polyline. Appends every kept point except
/// the final endpoint, so consecutive chains can be concatenated.
fn simplify_open(points: &[Point], epsilon: f64, out: &mut Vec<Point>) {
    let n = points.len();
    if n == 0 {
        return;
    }
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    // Explicit stack: contours can be thousands of points long.
    let mut stack = vec![(0usize, n - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut max_dist = 0.0f64;
        let mut index = start;
        for i in start + 1..end {
            let d = line_distance(points[i], points[start], points[end]);
            if d > max_dist {
                max_dist = d;
                index = i;
            }
        }
        if max_dist > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    out.extend(
        points[..n - 1]
            .iter()
            .zip(&keep[..n - 1])
            .filter(|(_, k)| **k)
            .map(|(p, _)| *p),
    );
}

/// Perpendicular distance from `p` to the line through `a` and `b`, or the
/// plain distance to `a` when the two coincide.
fn line_distance(p: Point, a: Point, b: Point) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let dx = bx - ax;
    let dy = by - ay;
    let len = (dx * dx + dy * dy).sqrt();
    if len < f64::EPSILON {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    ((px - ax) * dy - (py - ay) * dx).abs() / len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    /// Walk the border of an axis-aligned rectangle one pixel at a time,
    /// clockwise, starting at `start_offset` steps past the top-left corner.
    fn rect_contour(w: u32, h: u32, start_offset: usize) -> Vec<Point> {
        let mut pts = Vec::new();
        for x in 0..w {
            pts.push(p(x as f32, 0.0));
        }
        for y in 0..h {
            pts.push(p(w as f32, y as f32));
        }
        for x in (1..=w).rev() {
            pts.push(p(x as f32, h as f32));
        }
        for y in (1..=h).rev() {
            pts.push(p(0.0, y as f32));
        }
        pts.rotate_left(start_offset);
        pts
    }

    #[test]
    fn rectangle_area_is_exact() {
        let rect = [p(10.0, 20.0), p(310.0, 20.0), p(310.0, 220.0), p(10.0, 220.0)];
        assert!((polygon_area(&rect) - 60_000.0).abs() < 1e-6);
    }

    #[test]
    fn area_ignores_winding() {
        let cw = [p(0.0, 0.0), p(4.0, 0.0), p(4.0, 3.0), p(0.0, 3.0)];
        let mut ccw = cw;
        ccw.reverse();
        assert_eq!(polygon_area(&cw), 12.0);
        assert_eq!(polygon_area(&ccw), 12.0);
        assert_eq!(signed_area(&cw), -signed_area(&ccw));
    }

    #[test]
    fn degenerate_inputs_have_zero_area() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(polygon_area(&[p(1.0, 1.0), p(5.0, 5.0)]), 0.0);
    }

    #[test]
    fn perimeter_closed_and_open() {
        let rect = [p(0.0, 0.0), p(3.0, 0.0), p(3.0, 4.0), p(0.0, 4.0)];
        assert!((polygon_perimeter(&rect, true) - 14.0).abs() < 1e-9);
        assert!((polygon_perimeter(&rect, false) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn dense_rectangle_reduces_to_four_corners() {
        let contour = rect_contour(300, 200, 0);
        let eps = 0.02 * polygon_perimeter(&contour, true);
        let poly = approximate_polygon(&contour, eps);
        assert_eq!(poly.len(), 4, "got {poly:?}");
        for corner in [p(0.0, 0.0), p(300.0, 0.0), p(300.0, 200.0), p(0.0, 200.0)] {
            assert!(poly.contains(&corner), "missing {corner:?} in {poly:?}");
        }
    }

    #[test]
    fn starting_mid_edge_still_gives_four_corners() {
        let contour = rect_contour(300, 200, 137);
        let eps = 0.02 * polygon_perimeter(&contour, true);
        let poly = approximate_polygon(&contour, eps);
        assert_eq!(poly.len(), 4, "got {poly:?}");
    }

    #[test]
    fn triangle_stays_a_triangle() {
        let mut contour = Vec::new();
        for i in 0..100 {
            contour.push(p(i as f32, 0.0));
        }
        for i in 0..100 {
            contour.push(p(100.0 - i as f32 * 0.5, i as f32));
        }
        for i in 0..100 {
            contour.push(p(50.0 - i as f32 * 0.5, 100.0 - i as f32));
        }
        let eps = 0.02 * polygon_perimeter(&contour, true);
        assert_eq!(approximate_polygon(&contour, eps).len(), 3);
    }

    #[test]
    fn tiny_inputs_pass_through() {
        assert!(approximate_polygon(&[], 1.0).is_empty());
        let two = [p(0.0, 0.0), p(1.0, 1.0)];
        assert_eq!(approximate_polygon(&two, 1.0), two.to_vec());
    }
}
