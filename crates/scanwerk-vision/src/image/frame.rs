// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame I/O — decode still photos into RGBA frames and encode rectified
// output, using the `image` crate.

use image::{DynamicImage, ImageFormat, RgbaImage};
use scanwerk_core::error::ScannerError;
use tracing::{debug, info, instrument};

/// Decode raw encoded bytes (JPEG, PNG, etc.) into an RGBA frame.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_frame(data: &[u8]) -> Result<RgbaImage, ScannerError> {
    let img = image::load_from_memory(data).map_err(|err| {
        ScannerError::ImageError(format!("failed to decode frame: {}", err))
    })?;
    debug!(
        width = img.width(),
        height = img.height(),
        "Frame decoded from bytes"
    );
    Ok(img.to_rgba8())
}

/// Load an RGBA frame from a file path.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open_frame(path: impl AsRef<std::path::Path>) -> Result<RgbaImage, ScannerError> {
    let img = image::open(path.as_ref()).map_err(|err| {
        ScannerError::ImageError(format!(
            "failed to open {}: {}",
            path.as_ref().display(),
            err
        ))
    })?;
    info!(
        width = img.width(),
        height = img.height(),
        "Frame loaded"
    );
    Ok(img.to_rgba8())
}

/// Encode a frame as PNG bytes.
pub fn encode_png(frame: &RgbaImage) -> Result<Vec<u8>, ScannerError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    DynamicImage::ImageRgba8(frame.clone())
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| ScannerError::ImageError(format!("PNG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Write a frame to a file. The format is inferred from the file extension.
pub fn save_frame(
    frame: &RgbaImage,
    path: impl AsRef<std::path::Path>,
) -> Result<(), ScannerError> {
    frame.save(path.as_ref()).map_err(|err| {
        ScannerError::ImageError(format!(
            "failed to save frame to {}: {}",
            path.as_ref().display(),
            err
        ))
    })
}
