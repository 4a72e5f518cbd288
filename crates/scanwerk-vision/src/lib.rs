// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-vision — The image pipeline behind the Scanwerk scanner.
//
// Provides point-set geometry (corner ordering, areas, polygon approximation),
// per-frame quadrilateral detection, perspective rectification, size/position
// guidance, and the interactive corner-correction session.

pub mod geometry;
pub mod image;
pub mod scan;

// Re-export the primary types so callers can use `scanwerk_vision::FrameDetector` etc.
pub use geometry::corners::{CornerSelector, ExtremalCornerSelector, LeadingPointsSelector, sort_corners};
pub use geometry::polygon::{approximate_polygon, polygon_area, polygon_perimeter};
pub use scan::correct::{DragState, InteractiveCorrector};
pub use scan::detect::FrameDetector;
pub use scan::guidance::{GuidanceBox, GuidanceEvaluator, GuidanceFrames, GuidanceReport, GuidanceStatus};
pub use scan::rectify::{Homography, PerspectiveRectifier, compute_homography, warp};
