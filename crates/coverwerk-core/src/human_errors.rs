// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people photographing their books.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity tells the front end whether the user can fix the problem by
// retaking the photo or changing a setting.

use crate::error::CoverwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A different photo or setting will probably help.
    ActionRequired,
    /// The input or environment is unusable as-is.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestions.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// Things to try, most useful first.
    pub suggestions: Vec<String>,
    pub severity: Severity,
}

/// Convert a `CoverwerkError` into a `HumanError`.
pub fn humanize_error(err: &CoverwerkError) -> HumanError {
    match err {
        CoverwerkError::Decode(detail) => HumanError {
            message: "We couldn't read that image.".into(),
            suggestions: vec![
                "Save the photo as JPEG or PNG and try again.".into(),
                format!("(Detail: {detail})"),
            ],
            severity: Severity::Permanent,
        },

        CoverwerkError::NoCandidateFound => HumanError {
            message: "We couldn't find the book cover in this photo.".into(),
            suggestions: vec![
                "Try --min-area 0.05 for higher sensitivity.".into(),
                "Place the cover on a plain background that contrasts with it.".into(),
                "Make sure the whole cover is visible, evenly lit and free of glare.".into(),
                "Run with --debug to see which shapes were considered.".into(),
            ],
            severity: Severity::ActionRequired,
        },

        CoverwerkError::DegenerateQuad(detail) => HumanError {
            message: "The detected cover outline was too thin to straighten.".into(),
            suggestions: vec![
                "Retake the photo more directly from above.".into(),
                format!("(Detail: {detail})"),
            ],
            severity: Severity::ActionRequired,
        },

        CoverwerkError::InvalidConfig(detail) => HumanError {
            message: "One of the settings isn't valid.".into(),
            suggestions: vec![detail.clone()],
            severity: Severity::ActionRequired,
        },

        CoverwerkError::InvalidColor { input, .. } => HumanError {
            message: format!("\"{input}\" isn't a color we recognise."),
            suggestions: vec![
                "Use white, black, red, blue, green or yellow, or a hex value like #2196F3.".into(),
            ],
            severity: Severity::ActionRequired,
        },

        CoverwerkError::ImageError(detail) => HumanError {
            message: "We couldn't write the finished image.".into(),
            suggestions: vec![
                "Use an output name ending in .png or .jpg.".into(),
                format!("(Detail: {detail})"),
            ],
            severity: Severity::ActionRequired,
        },

        CoverwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "That file doesn't exist.".into(),
                suggestions: vec!["Check the file name and folder, then try again.".into()],
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "We aren't allowed to open that file or folder.".into(),
                suggestions: vec!["Choose a location you can write to.".into()],
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Something went wrong reading or writing a file.".into(),
                suggestions: vec![format!("(Detail: {io_err})")],
                severity: Severity::Permanent,
            },
        },

        CoverwerkError::Serialization(detail) => HumanError {
            message: "The settings file couldn't be understood.".into(),
            suggestions: vec![
                "Check the file is valid JSON.".into(),
                format!("(Detail: {detail})"),
            ],
            severity: Severity::ActionRequired,
        },
    }
}
