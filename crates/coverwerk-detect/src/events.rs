// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structured progress events emitted by the detector.
//
// Observers decide where progress goes (logs, a UI, a test recorder); the
// detector never prints.

use coverwerk_core::Strategy;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::candidate::Rejection;

/// Something that happened during one detection run.
///
/// Candidate indices refer to the merged pool, in strategy order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum PipelineEvent {
    StrategyStarted {
        strategy: Strategy,
    },
    StrategyFinished {
        strategy: Strategy,
        contours: usize,
        candidates: usize,
    },
    CandidateFound {
        strategy: Strategy,
        index: usize,
        area_ratio: f64,
    },
    CandidateRejected {
        strategy: Strategy,
        rejection: Rejection,
    },
    CandidateScored {
        strategy: Strategy,
        index: usize,
        score: f64,
    },
    /// A ranked candidate could not be rectified and was dropped.
    CandidateDegenerate {
        strategy: Strategy,
        index: usize,
        reason: String,
    },
    WinnerSelected {
        strategy: Strategy,
        index: usize,
        score: f64,
    },
    NoCandidate,
}

/// Receives pipeline events.
///
/// `StrategyStarted` may arrive from worker threads in any order. Every other
/// event is delivered from the detecting thread, in candidate pool order.
pub trait PipelineObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent);
}

/// Forwards events to `tracing`. The default observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StrategyStarted { strategy } => {
                debug!(%strategy, "Strategy started");
            }
            PipelineEvent::StrategyFinished {
                strategy,
                contours,
                candidates,
            } => {
                info!(%strategy, contours, candidates, "Strategy finished");
            }
            PipelineEvent::CandidateFound {
                strategy,
                index,
                area_ratio,
            } => {
                debug!(%strategy, index, area_ratio, "Candidate found");
            }
            PipelineEvent::CandidateRejected {
                strategy,
                rejection,
            } => {
                debug!(%strategy, %rejection, "Polygon rejected");
            }
            PipelineEvent::CandidateScored {
                strategy,
                index,
                score,
            } => {
                debug!(%strategy, index, score, "Candidate scored");
            }
            PipelineEvent::CandidateDegenerate {
                strategy,
                index,
                reason,
            } => {
                warn!(%strategy, index, reason = %reason, "Degenerate candidate dropped");
            }
            PipelineEvent::WinnerSelected {
                strategy,
                index,
                score,
            } => {
                info!(%strategy, index, score, "Winner selected");
            }
            PipelineEvent::NoCandidate => {
                warn!("No rectangular subject found");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag() {
        let event = PipelineEvent::WinnerSelected {
            strategy: Strategy::Otsu,
            index: 2,
            score: 0.5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "winner_selected");
        assert_eq!(json["strategy"], "otsu");
        assert_eq!(json["index"], 2);
    }

    #[test]
    fn tracing_observer_accepts_every_event() {
        let observer = TracingObserver;
        let events = [
            PipelineEvent::StrategyStarted {
                strategy: Strategy::Adaptive,
            },
            PipelineEvent::CandidateRejected {
                strategy: Strategy::Adaptive,
                rejection: Rejection::VertexCount { vertices: 7 },
            },
            PipelineEvent::CandidateDegenerate {
                strategy: Strategy::Adaptive,
                index: 0,
                reason: "flat".into(),
            },
            PipelineEvent::NoCandidate,
        ];
        for event in &events {
            observer.on_event(event);
        }
    }
}
