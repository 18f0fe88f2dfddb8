// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Coverwerk detection pipeline.

use std::str::FromStr;

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::CoverwerkError;

/// Structure-map strategy used to generate candidate quadrilaterals.
///
/// The declaration order is the default execution order, which is also the
/// order used to break score ties between candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Canny edges with permissive thresholds (30/100).
    CannyStandard,
    /// Canny edges with tighter thresholds (50/150) and one extra gap-closing pass.
    CannySensitive,
    /// Local-mean adaptive thresholding.
    Adaptive,
    /// Global Otsu thresholding, inverted.
    Otsu,
}

impl Strategy {
    /// Every strategy, in default execution order.
    pub const ALL: [Strategy; 4] = [
        Self::CannyStandard,
        Self::CannySensitive,
        Self::Adaptive,
        Self::Otsu,
    ];

    /// Stable tag used in logs, reports and configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CannyStandard => "canny_standard",
            Self::CannySensitive => "canny_sensitive",
            Self::Adaptive => "adaptive",
            Self::Otsu => "otsu",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CoverwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "canny_standard" | "canny" => Ok(Self::CannyStandard),
            "canny_sensitive" => Ok(Self::CannySensitive),
            "adaptive" | "adaptive_thresh" => Ok(Self::Adaptive),
            "otsu" | "otsu_thresh" => Ok(Self::Otsu),
            other => Err(CoverwerkError::InvalidConfig(format!(
                "unknown strategy '{other}' (expected canny_standard, canny_sensitive, adaptive or otsu)"
            ))),
        }
    }
}

/// What the caller wants when no rectangular subject is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Report `NoCandidateFound` as an error (batch CLI behaviour).
    #[default]
    Fail,
    /// Treat the whole input as the cover (interactive/web behaviour).
    UseOriginal,
}

impl FromStr for FallbackPolicy {
    type Err = CoverwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail" => Ok(Self::Fail),
            "original" | "use_original" => Ok(Self::UseOriginal),
            other => Err(CoverwerkError::InvalidConfig(format!(
                "unknown fallback policy '{other}' (expected fail or original)"
            ))),
        }
    }
}

/// Output canvas the extracted cover is composed onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    /// Background color as RGB.
    pub background: [u8; 3],
}

impl CanvasSpec {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self {
            width,
            height,
            background: background.0,
        }
    }

    /// Background as an `image` pixel.
    pub fn background_rgb(&self) -> Rgb<u8> {
        Rgb(self.background)
    }
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            background: [255, 255, 255],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_tags_round_trip_through_from_str() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.as_str().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!("Canny-Sensitive".parse::<Strategy>().unwrap(), Strategy::CannySensitive);
        assert!("sobel".parse::<Strategy>().is_err());
    }

    #[test]
    fn strategy_serializes_as_snake_case() {
        let json = serde_json::to_string(&Strategy::CannyStandard).unwrap();
        assert_eq!(json, "\"canny_standard\"");
    }

    #[test]
    fn fallback_policy_parses_cli_spellings() {
        assert_eq!("fail".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Fail);
        assert_eq!(
            "original".parse::<FallbackPolicy>().unwrap(),
            FallbackPolicy::UseOriginal
        );
        assert!("retry".parse::<FallbackPolicy>().is_err());
    }

    #[test]
    fn default_canvas_is_full_hd_white() {
        let canvas = CanvasSpec::default();
        assert_eq!((canvas.width, canvas.height), (1920, 1080));
        assert_eq!(canvas.background_rgb(), Rgb([255, 255, 255]));
    }
}
