// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection reports and the annotated debug image built from them.

use ab_glyph::FontVec;
use coverwerk_core::Strategy;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};
use serde::Serialize;
use tracing::{debug, info};

use crate::candidate::Rejection;
use crate::geometry::{BoundingBox, Polygon};
use crate::score::ScoredCandidate;

const REJECTED_COLOR: Rgb<u8> = Rgb([150, 150, 150]);
const ACCEPTED_COLOR: Rgb<u8> = Rgb([255, 165, 0]);
const WINNER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const WINNER_THICKNESS: i32 = 2;

/// Label height in pixels.
const LABEL_SCALE: f32 = 20.0;
/// Space left between a label and the outline below it.
const LABEL_GAP: f64 = 4.0;

const SYSTEM_FONTS: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// What the filter decided about an extracted polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonOutcome {
    /// Entered the pool at this index.
    Accepted(usize),
    Rejected(Rejection),
}

/// One simplified contour as it came out of a structure map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedPolygon {
    pub strategy: Strategy,
    pub polygon: Polygon,
    pub outcome: PolygonOutcome,
}

/// Everything one detection run looked at.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionReport {
    /// Every extracted polygon, strategy by strategy.
    pub polygons: Vec<ExtractedPolygon>,
    /// The merged, scored pool.
    pub candidates: Vec<ScoredCandidate>,
    /// Pool indices dropped because they could not be rectified.
    pub degenerate: Vec<usize>,
    /// Pool index of the rectified winner.
    pub winner: Option<usize>,
}

impl DetectionReport {
    pub fn rejected(&self) -> impl Iterator<Item = &ExtractedPolygon> {
        self.polygons
            .iter()
            .filter(|p| matches!(p.outcome, PolygonOutcome::Rejected(_)))
    }

    pub fn winner(&self) -> Option<&ScoredCandidate> {
        self.winner.and_then(|i| self.candidates.get(i))
    }
}

/// Draws detection reports, with score labels when a font is available.
#[derive(Default)]
pub struct Annotator {
    /// Labels are skipped when this is `None`.
    font: Option<FontVec>,
}

impl Annotator {
    /// An annotator that draws outlines only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the first readable font from the usual system locations.
    pub fn with_system_font() -> Self {
        for path in SYSTEM_FONTS {
            let Ok(data) = std::fs::read(path) else {
                continue;
            };
            if let Ok(font) = FontVec::try_from_vec(data) {
                info!(path, "Loaded label font");
                return Self { font: Some(font) };
            }
        }
        debug!("No system font found, candidate labels will be skipped");
        Self::default()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw the report over a copy of the input.
    ///
    /// Rejected polygons are gray, pool candidates orange and the winner a
    /// thick red outline on top. Each pool candidate is labelled with its
    /// one-based pool position and total score just above its bounding box.
    pub fn annotate(&self, image: &RgbImage, report: &DetectionReport) -> RgbImage {
        let mut canvas = image.clone();

        for extracted in report.rejected() {
            draw_outline(&mut canvas, &extracted.polygon, REJECTED_COLOR, 0);
        }
        for scored in &report.candidates {
            draw_outline(&mut canvas, &scored.candidate.polygon, ACCEPTED_COLOR, 0);
        }
        if let Some(winner) = report.winner() {
            draw_outline(&mut canvas, &winner.candidate.polygon, WINNER_COLOR, WINNER_THICKNESS);
        }

        if let Some(font) = &self.font {
            for (index, scored) in report.candidates.iter().enumerate() {
                let color = if report.winner == Some(index) {
                    WINNER_COLOR
                } else {
                    ACCEPTED_COLOR
                };
                let (x, y) = label_origin(&scored.candidate.metrics.bounding_box);
                let text = label_text(index, scored.score.total);
                draw_text_mut(&mut canvas, color, x, y, LABEL_SCALE, font, &text);
            }
        }

        canvas
    }
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("font", &self.font.is_some())
            .finish()
    }
}

/// [`Annotator::annotate`] with a system font, when one can be found.
pub fn annotate(image: &RgbImage, report: &DetectionReport) -> RgbImage {
    Annotator::with_system_font().annotate(image, report)
}

/// `#<pool position, from 1> <score to two places>`.
fn label_text(index: usize, score: f64) -> String {
    format!("#{} {score:.2}", index + 1)
}

/// Top-left corner of a label sitting above `bbox`, kept on the canvas.
fn label_origin(bbox: &BoundingBox) -> (i32, i32) {
    let x = bbox.x.round().max(0.0) as i32;
    let y = (bbox.y - LABEL_GAP - LABEL_SCALE as f64).round().max(0.0) as i32;
    (x, y)
}

fn draw_outline(canvas: &mut RgbImage, polygon: &Polygon, color: Rgb<u8>, thickness: i32) {
    let points = polygon.points();
    let n = points.len();
    if n < 2 {
        return;
    }
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        for dx in -thickness..=thickness {
            for dy in -thickness..=thickness {
                let (ox, oy) = (dx as f32, dy as f32);
                draw_line_segment_mut(
                    canvas,
                    (a.x as f32 + ox, a.y as f32 + oy),
                    (b.x as f32 + ox, b.y as f32 + oy),
                    color,
                );
            }
        }
    }
}
