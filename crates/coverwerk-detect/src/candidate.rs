// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Candidate quadrilaterals: the vertex-count and minimum-area filter, and the
// geometric metrics every surviving candidate carries into scoring. Vertex
// count comes from the simplified outline; every measurement comes from the
// traced boundary it was simplified from.

use coverwerk_core::Strategy;
use serde::Serialize;

use crate::contours::TracedContour;
use crate::geometry::{BoundingBox, Polygon};

/// Measurements derived once from a candidate's traced boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateMetrics {
    /// Enclosed area in square pixels.
    pub area: f64,
    /// `area` divided by the image area.
    pub area_ratio: f64,
    pub bounding_box: BoundingBox,
    /// Bounding-box height over width; `None` when the width is zero.
    pub aspect_ratio: Option<f64>,
    pub perimeter: f64,
    /// Perimeter over the bounding-box perimeter; `None` when that is zero.
    pub complexity: Option<f64>,
}

impl CandidateMetrics {
    fn measure(boundary: &Polygon, bounding_box: BoundingBox, image_area: f64) -> Self {
        let area = boundary.area();
        let perimeter = boundary.perimeter();
        let box_perimeter = 2.0 * (bounding_box.width + bounding_box.height);
        Self {
            area,
            area_ratio: area / image_area,
            bounding_box,
            aspect_ratio: (bounding_box.width > 0.0).then(|| bounding_box.height / bounding_box.width),
            perimeter,
            complexity: (box_perimeter > 0.0).then(|| perimeter / box_perimeter),
        }
    }
}

/// A four-vertex polygon that passed the filter, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub polygon: Polygon,
    pub strategy: Strategy,
    pub metrics: CandidateMetrics,
}

/// Why a polygon did not become a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum Rejection {
    /// The simplified polygon does not have exactly four vertices.
    VertexCount { vertices: usize },
    /// The enclosed area does not exceed the configured fraction of the image.
    TooSmall { area_ratio: f64 },
    /// The image has no pixels, so no ratio can be formed.
    EmptyImage,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VertexCount { vertices } => write!(f, "{vertices} vertices"),
            Self::TooSmall { area_ratio } => write!(f, "area ratio {area_ratio:.4}"),
            Self::EmptyImage => f.write_str("empty image"),
        }
    }
}

/// Keeps quadrilaterals enclosing more than `min_area_ratio` of the image.
#[derive(Debug, Clone, Copy)]
pub struct CandidateFilter {
    min_area_ratio: f64,
}

impl CandidateFilter {
    pub fn new(min_area_ratio: f64) -> Self {
        Self { min_area_ratio }
    }

    /// Accept or reject one contour from `strategy`'s structure map.
    pub fn evaluate(
        &self,
        contour: TracedContour,
        strategy: Strategy,
        image_width: u32,
        image_height: u32,
    ) -> Result<Candidate, Rejection> {
        let vertices = contour.outline().len();
        if vertices != 4 {
            return Err(Rejection::VertexCount { vertices });
        }
        let image_area = image_width as f64 * image_height as f64;
        let boundary = contour.boundary();
        let Some(bounding_box) = boundary.bounding_box().filter(|_| image_area > 0.0) else {
            return Err(Rejection::EmptyImage);
        };

        let metrics = CandidateMetrics::measure(boundary, bounding_box, image_area);
        if metrics.area_ratio <= self.min_area_ratio {
            return Err(Rejection::TooSmall {
                area_ratio: metrics.area_ratio,
            });
        }

        Ok(Candidate {
            polygon: contour.into_outline(),
            strategy,
            metrics,
        })
    }
}
