// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection configuration: candidate filtering, strategy selection, scoring
// weights and the no-detection fallback policy.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoverwerkError, Result};
use crate::types::{FallbackPolicy, Strategy};

/// Default minimum candidate area as a fraction of the image area.
const DEFAULT_MIN_AREA_RATIO: f64 = 0.10;

/// Default number of largest contours kept per structure map.
const DEFAULT_MAX_CONTOURS_PER_MAP: usize = 10;

/// Weights combining the four candidate sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub area: f64,
    pub aspect: f64,
    pub center: f64,
    pub complexity: f64,
}

impl ScoreWeights {
    fn total(&self) -> f64 {
        self.area + self.aspect + self.center + self.complexity
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            area: 0.35,
            aspect: 0.30,
            center: 0.20,
            complexity: 0.15,
        }
    }
}

/// Settings for one run of the detection pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Candidates enclosing less than this fraction of the image are dropped.
    pub min_area_ratio: f64,
    /// Strategies to run. Order decides score tie-breaks.
    pub strategies: Vec<Strategy>,
    /// Largest-by-area contours retained from each structure map.
    pub max_contours_per_map: usize,
    /// Sub-score weights.
    pub weights: ScoreWeights,
    /// Behaviour when the candidate pool ends up empty.
    pub fallback: FallbackPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: DEFAULT_MIN_AREA_RATIO,
            strategies: Strategy::ALL.to_vec(),
            max_contours_per_map: DEFAULT_MAX_CONTOURS_PER_MAP,
            weights: ScoreWeights::default(),
            fallback: FallbackPolicy::Fail,
        }
    }
}

impl DetectionConfig {
    /// Create a new configuration builder.
    pub fn builder() -> DetectionConfigBuilder {
        DetectionConfigBuilder::default()
    }

    /// Batch settings: an undetectable cover is an error.
    pub fn batch() -> Self {
        Self::default()
    }

    /// Interactive settings: an undetectable cover is treated as already cropped.
    pub fn interactive() -> Self {
        Self {
            fallback: FallbackPolicy::UseOriginal,
            ..Default::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is usable by the pipeline.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_area_ratio > 0.0 && self.min_area_ratio <= 1.0) {
            return Err(CoverwerkError::InvalidConfig(format!(
                "min_area_ratio must be in (0, 1], got {}",
                self.min_area_ratio
            )));
        }
        if self.strategies.is_empty() {
            return Err(CoverwerkError::InvalidConfig(
                "at least one strategy is required".into(),
            ));
        }
        if self.max_contours_per_map == 0 {
            return Err(CoverwerkError::InvalidConfig(
                "max_contours_per_map must be at least 1".into(),
            ));
        }
        let w = &self.weights;
        let all = [w.area, w.aspect, w.center, w.complexity];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) || w.total() <= 0.0 {
            return Err(CoverwerkError::InvalidConfig(format!(
                "score weights must be non-negative and not all zero, got {w:?}"
            )));
        }
        Ok(())
    }
}

/// Builder for `DetectionConfig`.
#[derive(Debug, Default)]
pub struct DetectionConfigBuilder {
    config: DetectionConfig,
}

impl DetectionConfigBuilder {
    /// Set the minimum area ratio, clamped into (0, 1].
    #[must_use]
    pub fn min_area_ratio(mut self, ratio: f64) -> Self {
        self.config.min_area_ratio = ratio.clamp(f64::EPSILON, 1.0);
        self
    }

    /// Replace the strategy list. Duplicates are dropped, first occurrence wins.
    #[must_use]
    pub fn strategies(mut self, strategies: impl IntoIterator<Item = Strategy>) -> Self {
        let mut unique = Vec::new();
        for strategy in strategies {
            if !unique.contains(&strategy) {
                unique.push(strategy);
            }
        }
        self.config.strategies = unique;
        self
    }

    #[must_use]
    pub fn max_contours_per_map(mut self, max: usize) -> Self {
        self.config.max_contours_per_map = max.max(1);
        self
    }

    #[must_use]
    pub fn weights(mut self, weights: ScoreWeights) -> Self {
        self.config.weights = weights;
        self
    }

    #[must_use]
    pub fn fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.config.fallback = fallback;
        self
    }

    #[must_use]
    pub fn build(self) -> DetectionConfig {
        self.config
    }
}
