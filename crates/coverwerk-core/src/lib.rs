// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// coverwerk-core: core types, configuration and error definitions shared across all crates.

pub mod color;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use color::parse_color;
pub use config::{DetectionConfig, DetectionConfigBuilder, ScoreWeights};
pub use error::{CoverwerkError, Result};
pub use types::*;
