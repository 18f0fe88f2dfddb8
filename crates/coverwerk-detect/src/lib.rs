// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// coverwerk-detect: finds a book cover in a photograph and straightens it.
//
// The pipeline builds structure maps with several edge and threshold
// strategies, extracts four-sided contours from each, scores the merged pool
// against book-cover priors and rectifies the winner with a perspective
// transform. Diagnostics and canvas placement sit alongside it.

pub mod candidate;
pub mod compose;
pub mod contours;
pub mod diagnostics;
pub mod events;
pub mod geometry;
pub mod pipeline;
pub mod raster;
pub mod rectify;
pub mod score;
pub mod structure;

pub use candidate::{Candidate, CandidateFilter, CandidateMetrics, Rejection};
pub use compose::compose_on_canvas;
pub use contours::{ContourExtractor, TracedContour};
pub use diagnostics::{Annotator, DetectionReport, annotate};
pub use events::{PipelineEvent, PipelineObserver, TracingObserver};
pub use geometry::{OrderedQuad, Point, Polygon};
pub use pipeline::{CoverDetector, CoverImage, CoverSource, Detection, RectifiedCover};
pub use raster::{decode_raster, encode_png, open_raster, save_raster};
pub use rectify::Rectifier;
pub use score::{CandidateScorer, ScoreBreakdown, ScoredCandidate};
pub use structure::EdgeMapBuilder;
