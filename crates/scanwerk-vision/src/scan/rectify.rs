// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — four-point homography onto a padded output
// rectangle, and an inverse-mapped warp of the source frame through it.

use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scanwerk_core::error::{Result, ScannerError};
use scanwerk_core::{FrameSize, Point, Quadrilateral, ScannerConfig};
use tracing::{debug, instrument, warn};

/// Pixels that map outside the source frame.
const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A corner triple whose area is below this fraction of its longest side
/// squared is treated as collinear. Scale-invariant: a 1000 px edge with a
/// sub-pixel bulge is as degenerate as a 10 px one.
const MIN_TRIANGLE_ASPECT: f64 = 1e-3;

/// A projective transform from source-frame to output coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Homography {
    projection: Projection,
}

impl Homography {
    /// The homography taking each `src[i]` to `dst[i]`.
    ///
    /// Fails with `DegenerateGeometry` when three points of either set are
    /// (nearly) collinear or no projective transform fits the points.
    pub fn from_correspondences(src: &[Point; 4], dst: &[Point; 4]) -> Result<Self> {
        ensure_general_position(src, "source")?;
        ensure_general_position(dst, "destination")?;

        let projection = Projection::from_control_points(control_points(src), control_points(dst))
            .ok_or_else(|| {
                ScannerError::DegenerateGeometry("no projective transform fits the corners".into())
            })?;
        Ok(Self { projection })
    }

    /// Apply the transform to a point. `None` if it maps to infinity.
    pub fn map(&self, p: Point) -> Option<Point> {
        let (x, y) = self.projection * (p.x, p.y);
        (x.is_finite() && y.is_finite()).then(|| Point::new(x, y))
    }

    /// The transform from output back to source coordinates.
    pub fn inverse(&self) -> Self {
        Self {
            projection: self.projection.invert(),
        }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}

fn control_points(points: &[Point; 4]) -> [(f32, f32); 4] {
    points.map(|p| (p.x, p.y))
}

/// Output rectangle inset by `padding`, ordered `[TL, TR, BR, BL]`.
pub fn destination_corners(width: u32, height: u32, padding: f32) -> Result<[Point; 4]> {
    let (w, h) = (width as f32, height as f32);
    if !(padding >= 0.0) || 2.0 * padding >= w || 2.0 * padding >= h {
        return Err(ScannerError::PreconditionViolation(format!(
            "padding {padding} leaves no room in a {width}x{height} output"
        )));
    }
    Ok([
        Point::new(padding, padding),
        Point::new(w - padding, padding),
        Point::new(w - padding, h - padding),
        Point::new(padding, h - padding),
    ])
}

/// Homography mapping `quad` (in its stored corner order) onto the padded
/// `dst_width x dst_height` rectangle.
pub fn compute_homography(
    quad: &Quadrilateral,
    dst_width: u32,
    dst_height: u32,
    padding: f32,
) -> Result<Homography> {
    let dst = destination_corners(dst_width, dst_height, padding)?;
    Homography::from_correspondences(&quad.corners, &dst)
}

/// Resample `src` through `homography` (source → output) into a new
/// `dst_width x dst_height` raster. Each output pixel is pulled from the
/// source via the inverse transform with bilinear interpolation; pixels
/// with no source are transparent black.
pub fn warp(
    src: &RgbaImage,
    homography: &Homography,
    dst_width: u32,
    dst_height: u32,
) -> Result<RgbaImage> {
    if dst_width == 0 || dst_height == 0 {
        return Err(ScannerError::PreconditionViolation(format!(
            "cannot warp into an empty {dst_width}x{dst_height} raster"
        )));
    }
    let mut output = RgbaImage::new(dst_width, dst_height);
    warp_into(src, homography.projection(), Interpolation::Bilinear, BACKGROUND, &mut output);
    Ok(output)
}

/// A rectified raster together with the transform that produced it.
#[derive(Debug, Clone)]
pub struct Rectified {
    pub image: RgbaImage,
    pub homography: Homography,
}

/// Rectifies quadrilaterals into a fixed-size, padded output raster.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveRectifier {
    output_size: FrameSize,
    padding: f32,
}

impl PerspectiveRectifier {
    pub fn new(output_size: FrameSize, padding: f32) -> Self {
        Self {
            output_size,
            padding,
        }
    }

    /// Output the same size as the source frame, padding from config.
    pub fn for_frame(frame_size: FrameSize, config: &ScannerConfig) -> Self {
        Self::new(frame_size, config.rectification_padding)
    }

    pub fn output_size(&self) -> FrameSize {
        self.output_size
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    /// Compute the homography for `quad` and warp `frame` through it.
    #[instrument(skip(self, frame), fields(
        out_w = self.output_size.width,
        out_h = self.output_size.height,
        padding = self.padding,
    ))]
    pub fn rectify(&self, frame: &RgbaImage, quad: &Quadrilateral) -> Result<Rectified> {
        let FrameSize { width, height } = self.output_size;
        let homography = match compute_homography(quad, width, height, self.padding) {
            Ok(h) => h,
            Err(err) => {
                warn!(error = %err, corners = ?quad.corners, "Rectification rejected");
                return Err(err);
            }
        };
        let image = warp(frame, &homography, width, height)?;
        debug!("Rectification complete");
        Ok(Rectified { image, homography })
    }

    /// Like [`rectify`](Self::rectify), for callers holding a bare point
    /// list. Anything other than exactly four points is rejected.
    pub fn rectify_points(&self, frame: &RgbaImage, points: &[Point]) -> Result<Rectified> {
        let quad = Quadrilateral::try_from(points)?;
        self.rectify(frame, &quad)
    }
}

/// Reject point sets with any (near-)collinear triple.
fn ensure_general_position(points: &[Point; 4], which: &str) -> Result<()> {
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    for (i, j, k) in TRIPLES {
        let (a, b, c) = (points[i], points[j], points[k]);
        let longest = squared_distance(a, b)
            .max(squared_distance(b, c))
            .max(squared_distance(a, c));
        let aspect = if longest > 0.0 {
            triangle_area(a, b, c) / longest
        } else {
            0.0
        };
        if !(aspect >= MIN_TRIANGLE_ASPECT) {
            return Err(ScannerError::DegenerateGeometry(format!(
                "{which} corners {i}, {j}, {k} are collinear (area/edge² {aspect:.2e})"
            )));
        }
    }
    Ok(())
}

fn squared_distance(a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x as f64 - a.x as f64, b.y as f64 - a.y as f64);
    dx * dx + dy * dy
}

fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    let (abx, aby) = (b.x as f64 - a.x as f64, b.y as f64 - a.y as f64);
    let (acx, acy) = (c.x as f64 - a.x as f64, c.y as f64 - a.y as f64);
    (abx * acy - aby * acx).abs() / 2.0
}
