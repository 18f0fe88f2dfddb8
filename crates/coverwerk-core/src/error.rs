// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Coverwerk.

use thiserror::Error;

/// Top-level error type for all Coverwerk operations.
#[derive(Debug, Error)]
pub enum CoverwerkError {
    // -- Input --
    #[error("failed to decode image: {0}")]
    Decode(String),

    // -- Detection --
    #[error("no rectangular subject found")]
    NoCandidateFound,

    #[error("degenerate quadrilateral: {0}")]
    DegenerateQuad(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid color {input:?}: {reason}")]
    InvalidColor { input: String, reason: String },

    // -- Output --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CoverwerkError>;
