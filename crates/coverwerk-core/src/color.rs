// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background color parsing: a fixed named palette plus hex notation.

use image::Rgb;

use crate::error::{CoverwerkError, Result};

/// Named colors accepted on the command line.
const PALETTE: [(&str, [u8; 3]); 6] = [
    ("white", [255, 255, 255]),
    ("black", [0, 0, 0]),
    ("red", [255, 87, 34]),
    ("blue", [33, 150, 243]),
    ("green", [76, 175, 80]),
    ("yellow", [255, 193, 7]),
];

/// Parse a palette name (case-insensitive) or a hex color.
///
/// Hex accepts `#RRGGBB`, `RRGGBB` and the short `#RGB` form. Malformed input
/// is an error rather than a silent default.
pub fn parse_color(input: &str) -> Result<Rgb<u8>> {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();

    if let Some((_, rgb)) = PALETTE.iter().find(|(name, _)| *name == lower) {
        return Ok(Rgb(*rgb));
    }

    let hex = lower.strip_prefix('#').unwrap_or(&lower);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) || hex.is_empty() {
        return Err(invalid(input, "expected a palette name or hex digits"));
    }

    let channels = match hex.len() {
        6 => [&hex[0..2], &hex[2..4], &hex[4..6]].map(|pair| u8::from_str_radix(pair, 16)),
        3 => [&hex[0..1], &hex[1..2], &hex[2..3]]
            .map(|digit| u8::from_str_radix(digit, 16).map(|v| v * 17)),
        n => return Err(invalid(input, &format!("hex color needs 3 or 6 digits, got {n}"))),
    };

    let [r, g, b] = channels;
    match (r, g, b) {
        (Ok(r), Ok(g), Ok(b)) => Ok(Rgb([r, g, b])),
        _ => Err(invalid(input, "hex digits out of range")),
    }
}

fn invalid(input: &str, reason: &str) -> CoverwerkError {
    CoverwerkError::InvalidColor {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
