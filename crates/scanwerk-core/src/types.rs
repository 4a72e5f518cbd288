// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk scanner pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScannerError;

/// A pixel coordinate in the space of one specific raster.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Width and height of a raster in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Fail with `DimensionMismatch` unless `(width, height)` equals `self`.
    pub fn ensure_matches(&self, width: u32, height: u32) -> Result<(), ScannerError> {
        if self.width == width && self.height == height {
            Ok(())
        } else {
            Err(ScannerError::dimension_mismatch(
                (self.width, self.height),
                (width, height),
            ))
        }
    }
}

/// Four corner points, in whatever order the producer established.
///
/// Detection always stores them canonically as
/// `[top-left, top-right, bottom-right, bottom-left]`. The interactive
/// corrector may hand back corners in the order the user left them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadrilateral {
    pub corners: [Point; 4],
}

impl Quadrilateral {
    pub const fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }

    /// Axis-aligned bounds of the four corners.
    pub fn bounds(&self) -> Bounds {
        Bounds::of(&self.corners)
    }
}

impl TryFrom<&[Point]> for Quadrilateral {
    type Error = ScannerError;

    fn try_from(points: &[Point]) -> Result<Self, Self::Error> {
        let corners: [Point; 4] = points.try_into().map_err(|_| {
            ScannerError::PreconditionViolation(format!(
                "a quadrilateral needs exactly 4 points, got {}",
                points.len()
            ))
        })?;
        Ok(Self { corners })
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Bounds {
    /// Bounds of a point set. An empty set yields inverted infinite bounds.
    pub fn of(points: &[Point]) -> Self {
        points.iter().fold(
            Self {
                min_x: f32::INFINITY,
                max_x: f32::NEG_INFINITY,
                min_y: f32::INFINITY,
                max_y: f32::NEG_INFINITY,
            },
            |b, p| Self {
                min_x: b.min_x.min(p.x),
                max_x: b.max_x.max(p.x),
                min_y: b.min_y.min(p.y),
                max_y: b.max_y.max(p.y),
            },
        )
    }
}

/// A quadrilateral accepted by the frame detector, with its contour area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub quad: Quadrilateral,
    /// Area of the source contour in px².
    pub area: f64,
}

/// Per-frame detector output. `None` is the normal "still searching" state.
pub type DetectionResult = Option<Detection>;

/// Detection preset. Card mode uses a larger minimum contour area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    #[default]
    Document,
    Card,
}

impl ScanMode {
    /// Default minimum contour area in px² for this mode.
    pub fn default_min_contour_area(&self) -> f64 {
        match self {
            Self::Document => 5_000.0,
            Self::Card => 10_000.0,
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = ScannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" | "doc" => Ok(Self::Document),
            "card" => Ok(Self::Card),
            other => Err(ScannerError::InvalidConfig(format!(
                "unknown scan mode {other:?} (expected \"document\" or \"card\")"
            ))),
        }
    }
}

/// Unique identifier for a correction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side of the guidance envelope a detection crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_from_slice_requires_four_points() {
        let three = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let err = Quadrilateral::try_from(&three[..]).unwrap_err();
        assert!(matches!(err, ScannerError::PreconditionViolation(_)));

        let four = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let quad = Quadrilateral::try_from(&four[..]).unwrap();
        assert_eq!(quad.corners, four);
    }

    #[test]
    fn frame_size_mismatch_is_reported() {
        let size = FrameSize::new(640, 480);
        assert!(size.ensure_matches(640, 480).is_ok());
        let err = size.ensure_matches(320, 240).unwrap_err();
        assert!(matches!(
            err,
            ScannerError::DimensionMismatch {
                expected_width: 640,
                actual_width: 320,
                ..
            }
        ));
    }

    #[test]
    fn bounds_cover_all_points() {
        let b = Bounds::of(&[Point::new(3.0, 7.0), Point::new(-1.0, 2.0), Point::new(5.0, 4.0)]);
        assert_eq!((b.min_x, b.max_x, b.min_y, b.max_y), (-1.0, 5.0, 2.0, 7.0));
    }

    #[test]
    fn scan_mode_parses_and_has_area_preset() {
        assert_eq!("card".parse::<ScanMode>().unwrap(), ScanMode::Card);
        assert_eq!("Document".parse::<ScanMode>().unwrap(), ScanMode::Document);
        assert!("poster".parse::<ScanMode>().is_err());
        assert_eq!(ScanMode::Card.default_min_contour_area(), 10_000.0);
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
