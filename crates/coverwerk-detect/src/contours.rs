// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External contour extraction and per-contour polygon simplification.

use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point as PixelPoint;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::geometry::Polygon;

/// Simplification tolerance as a fraction of each contour's own arc length.
pub const SIMPLIFY_TOLERANCE: f64 = 0.02;

/// One external boundary: the traced pixels and their simplified outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracedContour {
    boundary: Polygon,
    outline: Polygon,
}

impl TracedContour {
    fn trace(pixels: &[PixelPoint<i32>]) -> Self {
        let epsilon = SIMPLIFY_TOLERANCE * arc_length(pixels, true);
        let outline = if pixels.len() > 2 && epsilon > 0.0 {
            Polygon::from_pixels(&approximate_polygon_dp(pixels, epsilon, true))
        } else {
            Polygon::from_pixels(pixels)
        };
        Self {
            boundary: Polygon::from_pixels(pixels),
            outline,
        }
    }

    /// Build from an already known boundary and outline.
    pub fn new(boundary: Polygon, outline: Polygon) -> Self {
        Self { boundary, outline }
    }

    /// Every pixel on the traced border, in tracing order.
    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    /// The simplified polygon.
    pub fn outline(&self) -> &Polygon {
        &self.outline
    }

    pub fn into_outline(self) -> Polygon {
        self.outline
    }
}

/// Turns a structure map into traced external boundaries.
#[derive(Debug, Clone, Copy)]
pub struct ContourExtractor {
    max_contours: usize,
}

impl ContourExtractor {
    /// Keep at most `max_contours` boundaries per map (at least one).
    pub fn new(max_contours: usize) -> Self {
        Self {
            max_contours: max_contours.max(1),
        }
    }

    /// Outer borders of top-level regions, largest enclosed area first.
    ///
    /// Holes and regions nested inside other regions are ignored. Equal areas
    /// keep the tracer's raster order. Each kept boundary is simplified with a
    /// tolerance of [`SIMPLIFY_TOLERANCE`] times its perimeter.
    #[instrument(skip(self, map), fields(width = map.width(), height = map.height()))]
    pub fn extract(&self, map: &GrayImage) -> Vec<TracedContour> {
        let mut external: Vec<(f64, Vec<PixelPoint<i32>>)> = find_contours::<i32>(&pad(map))
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| {
                let pixels: Vec<PixelPoint<i32>> = c
                    .points
                    .iter()
                    .map(|p| PixelPoint::new(p.x - 1, p.y - 1))
                    .collect();
                (Polygon::from_pixels(&pixels).area(), pixels)
            })
            .collect();

        let found = external.len();
        external.sort_by(|a, b| b.0.total_cmp(&a.0));
        external.truncate(self.max_contours);

        let contours: Vec<TracedContour> = external
            .iter()
            .map(|(_, pixels)| TracedContour::trace(pixels))
            .collect();

        debug!(found, kept = contours.len(), "External contours extracted");
        contours
    }
}

/// Surround the map with one background pixel on every side.
///
/// The border follower only starts an outer border next to a background
/// pixel on its left, so regions touching column 0 would otherwise be lost.
fn pad(map: &GrayImage) -> GrayImage {
    let (width, height) = map.dimensions();
    GrayImage::from_fn(width + 2, height + 2, |x, y| {
        let inside = (1..=width).contains(&x) && (1..=height).contains(&y);
        if inside {
            *map.get_pixel(x - 1, y - 1)
        } else {
            Luma([0])
        }
    })
}
