// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — frame decode/encode and preview annotation.

pub mod annotate;
pub mod frame;

pub use annotate::{annotate_detection, draw_corner_handles, draw_guidance_frames, draw_outline};
pub use frame::{decode_frame, encode_png, open_frame, save_frame};
