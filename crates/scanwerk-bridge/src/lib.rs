// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — frame acquisition bridges.
//
// The vision core never talks to a camera. It is fed one RGBA frame per tick
// through the `FrameSource` trait; this crate holds the platform camera
// dispatch and the still-image source used for photos and tests.

pub mod still;
pub mod stub;
pub mod traits;

pub use still::StillImageSource;
pub use stub::StubCamera;
pub use traits::FrameSource;

/// The live camera for the target platform.
///
/// No native camera backend is wired up yet, so every platform gets the
/// stub, which fails acquisition on the first frame.
pub fn camera_source() -> Box<dyn FrameSource> {
    Box::new(stub::StubCamera::default())
}
