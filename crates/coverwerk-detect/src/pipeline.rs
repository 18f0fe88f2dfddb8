// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The detection pipeline: structure maps for every configured strategy,
// contour extraction, filtering into one merged pool, scoring, and
// rectification of the best candidate that can be rectified.

use std::sync::Arc;

use coverwerk_core::{CoverwerkError, DetectionConfig, FallbackPolicy, Result, Strategy};
use image::RgbImage;
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::candidate::{Candidate, CandidateFilter};
use crate::contours::{ContourExtractor, TracedContour};
use crate::diagnostics::{DetectionReport, ExtractedPolygon, PolygonOutcome};
use crate::events::{PipelineEvent, PipelineObserver, TracingObserver};
use crate::geometry::OrderedQuad;
use crate::rectify::Rectifier;
use crate::score::{CandidateScorer, ranking};
use crate::structure::EdgeMapBuilder;

/// A rectified cover and where it came from.
#[derive(Debug, Clone)]
pub struct RectifiedCover {
    pub image: RgbImage,
    pub score: f64,
    pub strategy: Strategy,
    pub quad: OrderedQuad,
}

/// Result of running detection on one image.
#[derive(Debug, Clone)]
pub enum Detection {
    Rectified(RectifiedCover),
    /// No candidate survived filtering and rectification.
    NotFound,
}

/// How the image returned by [`CoverDetector::extract`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoverSource {
    Rectified { score: f64, strategy: Strategy },
    /// Nothing was detected and the fallback policy kept the input as-is.
    Original,
}

/// The cover image after the fallback policy has been applied.
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub image: RgbImage,
    pub source: CoverSource,
}

/// Locates and straightens a book cover in a photograph.
///
/// Holds no per-image state, so one detector can serve any number of images,
/// including concurrently.
#[derive(Clone)]
pub struct CoverDetector {
    config: DetectionConfig,
    observer: Arc<dyn PipelineObserver>,
}

impl std::fmt::Debug for CoverDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CoverDetector {
    /// Create a detector after validating `config`.
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Send pipeline events to `observer` instead of `tracing`.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run detection and rectification.
    pub fn detect(&self, image: &RgbImage) -> Result<Detection> {
        self.run(image).map(|(detection, _)| detection)
    }

    /// Run detection and also return everything that was considered.
    pub fn detect_with_report(&self, image: &RgbImage) -> Result<(Detection, DetectionReport)> {
        self.run(image)
    }

    /// Detect, then apply the configured fallback policy.
    ///
    /// With [`FallbackPolicy::Fail`] an undetectable cover is
    /// [`CoverwerkError::NoCandidateFound`]; with
    /// [`FallbackPolicy::UseOriginal`] the input is returned unchanged.
    pub fn extract(&self, image: &RgbImage) -> Result<CoverImage> {
        let detection = self.detect(image)?;
        resolve(detection, image, self.config.fallback)
    }

    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    fn run(&self, image: &RgbImage) -> Result<(Detection, DetectionReport)> {
        let (width, height) = image.dimensions();
        let builder = EdgeMapBuilder::new(image);
        let extractor = ContourExtractor::new(self.config.max_contours_per_map);

        // Strategies run in parallel; collect keeps configured order so the
        // merged pool, and therefore tie-breaking, is deterministic.
        let per_strategy: Vec<(Strategy, Vec<TracedContour>)> = self
            .config
            .strategies
            .par_iter()
            .map(|&strategy| {
                self.emit(PipelineEvent::StrategyStarted { strategy });
                let map = builder.build(strategy);
                (strategy, extractor.extract(&map))
            })
            .collect();

        let mut report = DetectionReport::default();
        let pool = self.filter_into_pool(per_strategy, width, height, &mut report);

        let scorer = CandidateScorer::new(self.config.weights, width, height);
        report.candidates = scorer.score_all(pool);
        for (index, scored) in report.candidates.iter().enumerate() {
            self.emit(PipelineEvent::CandidateScored {
                strategy: scored.candidate.strategy,
                index,
                score: scored.score.total,
            });
        }

        for index in ranking(&report.candidates) {
            let scored = &report.candidates[index];
            let strategy = scored.candidate.strategy;
            match Rectifier::rectify(image, &scored.candidate.polygon) {
                Ok(rectified) => {
                    let score = scored.score.total;
                    self.emit(PipelineEvent::WinnerSelected {
                        strategy,
                        index,
                        score,
                    });
                    info!(
                        %strategy,
                        score,
                        width = rectified.image.width(),
                        height = rectified.image.height(),
                        "Cover rectified"
                    );
                    report.winner = Some(index);
                    let cover = RectifiedCover {
                        image: rectified.image,
                        score,
                        strategy,
                        quad: rectified.quad,
                    };
                    return Ok((Detection::Rectified(cover), report));
                }
                Err(CoverwerkError::DegenerateQuad(reason)) => {
                    self.emit(PipelineEvent::CandidateDegenerate {
                        strategy,
                        index,
                        reason,
                    });
                    report.degenerate.push(index);
                }
                Err(other) => return Err(other),
            }
        }

        self.emit(PipelineEvent::NoCandidate);
        Ok((Detection::NotFound, report))
    }

    /// Merge every strategy's contours into one pool, in strategy order.
    fn filter_into_pool(
        &self,
        per_strategy: Vec<(Strategy, Vec<TracedContour>)>,
        width: u32,
        height: u32,
        report: &mut DetectionReport,
    ) -> Vec<Candidate> {
        let filter = CandidateFilter::new(self.config.min_area_ratio);
        let mut pool = Vec::new();

        for (strategy, traced) in per_strategy {
            let contours = traced.len();
            let before = pool.len();
            for contour in traced {
                let polygon = contour.outline().clone();
                let outcome = match filter.evaluate(contour, strategy, width, height) {
                    Ok(candidate) => {
                        let index = pool.len();
                        self.emit(PipelineEvent::CandidateFound {
                            strategy,
                            index,
                            area_ratio: candidate.metrics.area_ratio,
                        });
                        pool.push(candidate);
                        PolygonOutcome::Accepted(index)
                    }
                    Err(rejection) => {
                        self.emit(PipelineEvent::CandidateRejected {
                            strategy,
                            rejection,
                        });
                        PolygonOutcome::Rejected(rejection)
                    }
                };
                report.polygons.push(ExtractedPolygon {
                    strategy,
                    polygon,
                    outcome,
                });
            }
            self.emit(PipelineEvent::StrategyFinished {
                strategy,
                contours,
                candidates: pool.len() - before,
            });
        }

        pool
    }

    fn emit(&self, event: PipelineEvent) {
        self.observer.on_event(&event);
    }
}

/// Apply the fallback policy to a detection result.
pub fn resolve(detection: Detection, original: &RgbImage, policy: FallbackPolicy) -> Result<CoverImage> {
    match detection {
        Detection::Rectified(cover) => Ok(CoverImage {
            image: cover.image,
            source: CoverSource::Rectified {
                score: cover.score,
                strategy: cover.strategy,
            },
        }),
        Detection::NotFound => match policy {
            FallbackPolicy::Fail => Err(CoverwerkError::NoCandidateFound),
            FallbackPolicy::UseOriginal => Ok(CoverImage {
                image: original.clone(),
                source: CoverSource::Original,
            }),
        },
    }
}
