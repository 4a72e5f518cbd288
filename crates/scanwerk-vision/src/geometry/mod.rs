// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry over point sets — corner ordering and selection, polygon area,
// perimeter, and Douglas-Peucker approximation.

pub mod corners;
pub mod polygon;

pub use corners::{CornerSelector, ExtremalCornerSelector, LeadingPointsSelector, sort_corners};
pub use polygon::{approximate_polygon, polygon_area, polygon_perimeter, signed_area};
