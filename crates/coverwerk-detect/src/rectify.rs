// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: canonical vertex order, target sizing, the
// projective solve and bilinear resampling through imageproc's warp.

use coverwerk_core::{CoverwerkError, Result};
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, instrument};

use crate::geometry::{OrderedQuad, Polygon};

/// Colour written where the destination maps outside the source image.
pub const OUT_OF_BOUNDS_FILL: Rgb<u8> = Rgb([0, 0, 0]);

/// Replicated border added around the source before warping.
///
/// Bilinear sampling needs both neighbours inside the image, so without it
/// the last row and column of the source could never be reached.
const BORDER: u32 = 1;

/// An upright image produced from a quadrilateral region.
#[derive(Debug, Clone)]
pub struct Rectification {
    pub image: RgbImage,
    pub quad: OrderedQuad,
    /// Maps source coordinates onto the destination rectangle.
    pub projection: Projection,
}

/// Straightens a quadrilateral region of an image.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rectifier;

impl Rectifier {
    /// Destination size for a quad.
    ///
    /// Pixel coordinates name pixel centres, so a quad whose corners sit on
    /// the centres of columns 10 and 49 spans 39 units yet covers 40 pixels.
    /// The longer of each pair of opposite edges is rounded to whole units
    /// and one is added, which makes a full-frame quad of a `W x H` image
    /// come back as exactly `W x H`.
    pub fn target_size(quad: &OrderedQuad) -> Result<(u32, u32)> {
        let width = quad.top_edge().max(quad.bottom_edge());
        let height = quad.left_edge().max(quad.right_edge());
        if !width.is_finite() || !height.is_finite() || width < 1.0 || height < 1.0 {
            return Err(CoverwerkError::DegenerateQuad(format!(
                "edge spans {width:.2} x {height:.2} are too small"
            )));
        }
        Ok((width.round() as u32 + 1, height.round() as u32 + 1))
    }

    /// Projection taking `quad` onto `[0, width-1] x [0, height-1]`.
    pub fn projection_for(quad: &OrderedQuad, width: u32, height: u32) -> Result<Projection> {
        let area = Polygon::new(quad.points().to_vec()).area();
        if area.is_nan() || area < 1.0 {
            return Err(CoverwerkError::DegenerateQuad(format!(
                "quad encloses {area:.2} square pixels"
            )));
        }
        let (w, h) = (width.saturating_sub(1) as f32, height.saturating_sub(1) as f32);
        let from = quad.points().map(|p| (p.x as f32, p.y as f32));
        let to = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        Projection::from_control_points(from, to).ok_or_else(|| {
            CoverwerkError::DegenerateQuad(format!("no projective transform for {quad:?}"))
        })
    }

    /// Order the polygon's vertices, solve the projection and resample.
    ///
    /// Destination pixels whose source lies more than a pixel outside the
    /// image get [`OUT_OF_BOUNDS_FILL`].
    #[instrument(skip(image, polygon), fields(width = image.width(), height = image.height()))]
    pub fn rectify(image: &RgbImage, polygon: &Polygon) -> Result<Rectification> {
        let quad = OrderedQuad::from_polygon(polygon).ok_or_else(|| {
            CoverwerkError::DegenerateQuad(format!("expected 4 vertices, got {}", polygon.len()))
        })?;
        let (width, height) = Self::target_size(&quad)?;
        let projection = Self::projection_for(&quad, width, height)?;

        // The padded source is shifted by the border, so undo that first.
        let offset = BORDER as f32;
        let padded_projection = Projection::translate(-offset, -offset).and_then(projection);

        debug!(width, height, "Resampling rectified region");
        let mut out = RgbImage::new(width, height);
        warp_into(
            &pad(image),
            &padded_projection,
            Interpolation::Bilinear,
            OUT_OF_BOUNDS_FILL,
            &mut out,
        );
        Ok(Rectification {
            image: out,
            quad,
            projection,
        })
    }
}

/// Copy of `image` with its edge pixels repeated [`BORDER`] times outwards.
fn pad(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let clamp = |v: u32, len: u32| v.saturating_sub(BORDER).min(len - 1);
    RgbImage::from_fn(width + 2 * BORDER, height + 2 * BORDER, |x, y| {
        *image.get_pixel(clamp(x, width), clamp(y, height))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    fn polygon(points: [(f64, f64); 4]) -> Polygon {
        Polygon::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    /// Resampling runs in `f32`, so channels may land a little under the source.
    fn assert_close(actual: &Rgb<u8>, expected: &Rgb<u8>, at: (u32, u32)) {
        let near = actual.0.iter().zip(expected.0).all(|(&a, e)| a.abs_diff(e) <= 2);
        assert!(near, "at {at:?}: {actual:?} vs {expected:?}");
    }

    #[test]
    fn full_frame_rectangle_round_trips() {
        let src = gradient(64, 48);
        // Vertex order deliberately scrambled.
        let quad = polygon([(63.0, 47.0), (0.0, 0.0), (0.0, 47.0), (63.0, 0.0)]);
        let out = Rectifier::rectify(&src, &quad).unwrap();
        assert_eq!(out.image.dimensions(), (64, 48));
        for (x, y, p) in out.image.enumerate_pixels() {
            assert_close(p, src.get_pixel(x, y), (x, y));
        }
    }

    #[test]
    fn sub_rectangle_is_cropped() {
        let src = gradient(80, 60);
        let quad = polygon([(10.0, 5.0), (49.0, 5.0), (49.0, 44.0), (10.0, 44.0)]);
        let out = Rectifier::rectify(&src, &quad).unwrap();
        assert_eq!(out.image.dimensions(), (40, 40));
        for (x, y, p) in out.image.enumerate_pixels() {
            assert_close(p, src.get_pixel(x + 10, y + 5), (x, y));
        }
    }

    #[test]
    fn projection_maps_corners_onto_the_output_frame() {
        let quad = OrderedQuad::from_points([
            Point::new(60.0, 40.0),
            Point::new(240.0, 60.0),
            Point::new(230.0, 270.0),
            Point::new(50.0, 250.0),
        ]);
        let (w, h) = Rectifier::target_size(&quad).unwrap();
        let projection = Rectifier::projection_for(&quad, w, h).unwrap();
        let (right, bottom) = ((w - 1) as f32, (h - 1) as f32);
        let frame = [(0.0, 0.0), (right, 0.0), (right, bottom), (0.0, bottom)];
        for (corner, (fx, fy)) in quad.points().iter().zip(frame) {
            let (x, y) = projection * (corner.x as f32, corner.y as f32);
            assert!(
                (x - fx).abs() < 0.01 && (y - fy).abs() < 0.01,
                "{corner:?} -> ({x}, {y})"
            );
        }
    }

    #[test]
    fn target_size_uses_longer_opposite_edges() {
        let quad = OrderedQuad::from_points([
            Point::new(10.0, 10.0),
            Point::new(110.0, 20.0),
            Point::new(100.0, 220.0),
            Point::new(20.0, 200.0),
        ]);
        let (w, h) = Rectifier::target_size(&quad).unwrap();
        let top = quad.top_edge();
        let bottom = quad.bottom_edge();
        assert_eq!(w, top.max(bottom).round() as u32 + 1);
        let right = quad.right_edge();
        assert_eq!(h, quad.left_edge().max(right).round() as u32 + 1);
    }

    #[test]
    fn degenerate_quads_are_rejected() {
        let src = gradient(20, 20);
        let point = polygon([(5.0, 5.0); 4]);
        assert!(matches!(
            Rectifier::rectify(&src, &point),
            Err(CoverwerkError::DegenerateQuad(_))
        ));

        let line = polygon([(0.0, 0.0), (5.0, 5.0), (10.0, 10.0), (15.0, 15.0)]);
        assert!(matches!(
            Rectifier::rectify(&src, &line),
            Err(CoverwerkError::DegenerateQuad(_))
        ));

        let triangle = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(9.0, 0.0), Point::new(0.0, 9.0)]);
        assert!(Rectifier::rectify(&src, &triangle).is_err());
    }

    #[test]
    fn outside_pixels_use_fill_color() {
        let src = RgbImage::from_pixel(40, 40, Rgb([200, 200, 200]));
        // Quad extends well beyond the left edge of the source.
        let quad = polygon([(-30.0, 0.0), (39.0, 0.0), (39.0, 39.0), (-30.0, 39.0)]);
        let out = Rectifier::rectify(&src, &quad).unwrap();
        assert_eq!(*out.image.get_pixel(0, 10), OUT_OF_BOUNDS_FILL);
        let (w, _) = out.image.dimensions();
        assert_close(out.image.get_pixel(w - 1, 10), &Rgb([200, 200, 200]), (w - 1, 10));
    }

    #[test]
    fn skewed_quad_output_is_upright_and_sized() {
        let corners = [(60.0, 40.0), (240.0, 60.0), (230.0, 270.0), (50.0, 250.0)];
        let quad = polygon(corners);
        let ordered = OrderedQuad::from_polygon(&quad).unwrap();
        let inside = |x: f64, y: f64| {
            let p = ordered.points();
            (0..4).all(|i| {
                let (a, b) = (p[i], p[(i + 1) % 4]);
                (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x) >= 0.0
            })
        };
        let src = RgbImage::from_fn(300, 300, |x, y| {
            if inside(x as f64, y as f64) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });

        let (w, h) = Rectifier::target_size(&ordered).unwrap();
        let out = Rectifier::rectify(&src, &quad).unwrap();
        assert_eq!(out.image.dimensions(), (w, h));
        assert!(w > 170 && h > 200);
        for (x, y) in [(w / 2, h / 2), (w / 4, h / 4)] {
            assert_close(out.image.get_pixel(x, y), &Rgb([255, 255, 255]), (x, y));
        }
    }
}
