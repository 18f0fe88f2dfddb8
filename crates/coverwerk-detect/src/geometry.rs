// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar geometry for contour polygons: area, perimeter, bounding boxes and
// canonical vertex ordering of quadrilaterals.

use std::cmp::Ordering;

use imageproc::geometry::{arc_length, contour_area};
use imageproc::point::Point as PixelPoint;
use serde::Serialize;

/// A 2D point in image coordinates (x to the right, y downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn sum(&self) -> f64 {
        self.x + self.y
    }

    fn diff(&self) -> f64 {
        self.y - self.x
    }
}

impl From<PixelPoint<i32>> for Point {
    fn from(p: PixelPoint<i32>) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// Axis-aligned bounding box spanned by a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Smallest box containing every point; `None` when there are none.
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// An ordered sequence of vertices describing a closed boundary.
///
/// Vertex order is whatever the producer emitted; nothing here assumes a
/// particular winding or starting vertex.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Build a polygon from traced contour pixels.
    pub fn from_pixels(pixels: &[PixelPoint<i32>]) -> Self {
        Self::new(pixels.iter().copied().map(Point::from).collect())
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area, independent of winding.
    pub fn area(&self) -> f64 {
        contour_area(&self.pixel_points())
    }

    /// Length of the closed boundary.
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.pixel_points(), true)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(self.points.iter().copied())
    }

    /// The four vertices, if this polygon is a quadrilateral.
    pub fn as_quad(&self) -> Option<[Point; 4]> {
        self.points.as_slice().try_into().ok()
    }

    fn pixel_points(&self) -> Vec<PixelPoint<f64>> {
        self.points.iter().map(|p| PixelPoint::new(p.x, p.y)).collect()
    }
}

/// Quadrilateral vertices with canonical roles, clockwise from top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderedQuad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl OrderedQuad {
    /// Assign canonical roles to four unordered vertices.
    ///
    /// Top-left has the smallest `x + y`, bottom-right the largest; of the
    /// remaining two, top-right has the smaller `y - x`. Ties are broken on
    /// coordinate values, so the result does not depend on input order. When
    /// this classification does not yield a convex clockwise quad (steep
    /// rotations near 45 degrees), the vertices are sorted by angle around
    /// their centroid instead, starting from the smallest `x + y`.
    pub fn from_points(points: [Point; 4]) -> Self {
        let by_sum = |a: &Point, b: &Point| {
            a.sum()
                .total_cmp(&b.sum())
                .then_with(|| a.x.total_cmp(&b.x))
                .then_with(|| a.y.total_cmp(&b.y))
        };
        let by_diff = |a: &Point, b: &Point| {
            a.diff()
                .total_cmp(&b.diff())
                .then_with(|| a.y.total_cmp(&b.y))
        };

        let mut sorted = points;
        sorted.sort_by(by_sum);
        let (top_left, bottom_right) = (sorted[0], sorted[3]);
        let (top_right, bottom_left) = match by_diff(&sorted[1], &sorted[2]) {
            Ordering::Greater => (sorted[2], sorted[1]),
            _ => (sorted[1], sorted[2]),
        };

        let quad = Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        };
        if quad.is_convex_clockwise() {
            quad
        } else {
            Self::by_angle(points)
        }
    }

    fn by_angle(points: [Point; 4]) -> Self {
        let cx = points.iter().map(|p| p.x).sum::<f64>() / 4.0;
        let cy = points.iter().map(|p| p.y).sum::<f64>() / 4.0;
        let mut sorted = points;
        // With y pointing down, increasing atan2 runs clockwise on screen.
        sorted.sort_by(|a, b| {
            (a.y - cy)
                .atan2(a.x - cx)
                .total_cmp(&(b.y - cy).atan2(b.x - cx))
                .then_with(|| a.x.total_cmp(&b.x))
        });
        let start = (0..4)
            .min_by(|&i, &j| {
                sorted[i]
                    .sum()
                    .total_cmp(&sorted[j].sum())
                    .then_with(|| sorted[i].x.total_cmp(&sorted[j].x))
            })
            .unwrap_or(0);
        sorted.rotate_left(start);
        Self {
            top_left: sorted[0],
            top_right: sorted[1],
            bottom_right: sorted[2],
            bottom_left: sorted[3],
        }
    }

    pub fn from_polygon(polygon: &Polygon) -> Option<Self> {
        polygon.as_quad().map(Self::from_points)
    }

    /// Vertices in canonical order.
    pub fn points(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Every turn is clockwise on screen and the quad has positive area.
    pub fn is_convex_clockwise(&self) -> bool {
        let p = self.points();
        (0..4).all(|i| {
            let (a, b, c) = (p[i], p[(i + 1) % 4], p[(i + 2) % 4]);
            (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x) > 0.0
        })
    }

    pub fn top_edge(&self) -> f64 {
        self.top_left.distance(&self.top_right)
    }

    pub fn bottom_edge(&self) -> f64 {
        self.bottom_left.distance(&self.bottom_right)
    }

    pub fn left_edge(&self) -> f64 {
        self.top_left.distance(&self.bottom_left)
    }

    pub fn right_edge(&self) -> f64 {
        self.top_right.distance(&self.bottom_right)
    }
}
