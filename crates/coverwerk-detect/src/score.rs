// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Candidate scoring against book-cover priors: plausible area, book-like
// aspect ratio, central framing and a clean rectangular outline.

use coverwerk_core::ScoreWeights;
use serde::Serialize;

use crate::candidate::Candidate;

/// The four sub-scores in [0, 1] and their weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub area: f64,
    pub aspect: f64,
    pub center: f64,
    pub complexity: f64,
    pub total: f64,
}

/// A candidate with its score. Never modified after scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: ScoreBreakdown,
}

/// Area plausibility.
///
/// Rises linearly to 1.0 at half the image, then drops to 0.6 above 85% and
/// 0.3 above 95%, where the contour is usually the table rather than the book.
pub fn area_score(area_ratio: f64) -> f64 {
    if !area_ratio.is_finite() || area_ratio <= 0.0 {
        0.0
    } else if area_ratio > 0.95 {
        0.3
    } else if area_ratio > 0.85 {
        0.6
    } else {
        (area_ratio / 0.5).min(1.0)
    }
}

/// Aspect plausibility for a height/width ratio.
pub fn aspect_score(aspect_ratio: Option<f64>) -> f64 {
    match aspect_ratio {
        None => 0.0,
        Some(r) if (1.2..=1.8).contains(&r) => 1.0,
        Some(r) if (0.55..=0.85).contains(&r) => 0.9,
        Some(r) if (1.0..=2.0).contains(&r) => 0.7,
        Some(_) => 0.3,
    }
}

/// Outline cleanliness for a perimeter / bounding-box-perimeter ratio.
pub fn complexity_score(complexity: Option<f64>) -> f64 {
    match complexity {
        None => 0.0,
        Some(c) if c < 1.1 => 1.0,
        Some(c) if c < 1.3 => 0.5,
        Some(_) => 0.2,
    }
}

/// Scores candidates for one image.
#[derive(Debug, Clone, Copy)]
pub struct CandidateScorer {
    weights: ScoreWeights,
    width: u32,
    height: u32,
}

impl CandidateScorer {
    pub fn new(weights: ScoreWeights, width: u32, height: u32) -> Self {
        Self {
            weights,
            width,
            height,
        }
    }

    /// One minus the bounding-box centre's distance to the image centre,
    /// normalised by the centre-to-corner distance.
    pub fn center_score(&self, candidate: &Candidate) -> f64 {
        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        let max_distance = half_w.hypot(half_h);
        if max_distance <= 0.0 {
            return 0.0;
        }
        let c = candidate.metrics.bounding_box.center();
        let distance = (c.x - half_w).hypot(c.y - half_h);
        (1.0 - distance / max_distance).clamp(0.0, 1.0)
    }

    pub fn score(&self, candidate: &Candidate) -> ScoreBreakdown {
        let m = &candidate.metrics;
        let area = area_score(m.area_ratio);
        let aspect = aspect_score(m.aspect_ratio);
        let center = self.center_score(candidate);
        let complexity = complexity_score(m.complexity);
        let w = &self.weights;
        ScoreBreakdown {
            area,
            aspect,
            center,
            complexity,
            total: w.area * area + w.aspect * aspect + w.center * center + w.complexity * complexity,
        }
    }

    /// Score a pool, keeping its order.
    pub fn score_all(&self, pool: Vec<Candidate>) -> Vec<ScoredCandidate> {
        pool.into_iter()
            .map(|candidate| {
                let score = self.score(&candidate);
                ScoredCandidate { candidate, score }
            })
            .collect()
    }
}

/// Pool indices from best to worst.
///
/// Higher totals come first; equal totals keep pool order, so the first-seen
/// candidate wins a tie.
pub fn ranking(pool: &[ScoredCandidate]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| pool[b].score.total.total_cmp(&pool[a].score.total));
    order
}
