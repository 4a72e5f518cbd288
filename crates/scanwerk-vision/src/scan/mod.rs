// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — per-frame quadrilateral detection, perspective
// rectification, size/position guidance, and interactive corner correction.

pub mod correct;
pub mod detect;
pub mod guidance;
pub mod rectify;

pub use correct::{DragState, InteractiveCorrector};
pub use detect::FrameDetector;
pub use guidance::{GuidanceBox, GuidanceEvaluator, GuidanceFrames, GuidanceReport, GuidanceStatus};
pub use rectify::{Homography, PerspectiveRectifier, compute_homography, warp};
