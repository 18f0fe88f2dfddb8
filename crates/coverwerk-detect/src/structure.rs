// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structure maps: binary images whose foreground marks probable subject
// boundaries, produced by one of several edge or threshold strategies.

use coverwerk_core::Strategy;
use image::{GrayImage, Luma, RgbImage, imageops};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::integral_image::{integral_image, sum_image_pixels};
use imageproc::morphology;
use tracing::{debug, instrument};

/// Gaussian sigma applied once before any strategy runs (roughly a 5x5 kernel).
pub const BLUR_SIGMA: f32 = 1.1;

/// Closing radius per gap-bridging pass (a 5x5 square element).
const CLOSE_RADIUS_PER_PASS: u8 = 2;

/// Adaptive threshold neighbourhood radius (an 11x11 window).
const ADAPTIVE_BLOCK_RADIUS: u32 = 5;

/// Margin a pixel must fall below its local mean by to count as foreground.
const ADAPTIVE_OFFSET: f64 = 2.0;

const FOREGROUND: u8 = 255;

/// Per-strategy parameters.
#[derive(Debug, Clone, Copy)]
enum Recipe {
    Canny { low: f32, high: f32 },
    Adaptive,
    Otsu,
}

fn recipe(strategy: Strategy) -> (Recipe, u8) {
    match strategy {
        Strategy::CannyStandard => (Recipe::Canny { low: 30.0, high: 100.0 }, 2),
        Strategy::CannySensitive => (Recipe::Canny { low: 50.0, high: 150.0 }, 3),
        Strategy::Adaptive => (Recipe::Adaptive, 2),
        Strategy::Otsu => (Recipe::Otsu, 2),
    }
}

/// Builds structure maps from one desaturated, smoothed copy of the input.
///
/// The smoothed copy is computed once in [`EdgeMapBuilder::new`]; each call
/// to [`EdgeMapBuilder::build`] is then a pure function of that copy and the
/// strategy, so strategies can run concurrently against a shared builder.
pub struct EdgeMapBuilder {
    smoothed: GrayImage,
}

impl EdgeMapBuilder {
    #[instrument(skip(image), fields(width = image.width(), height = image.height()))]
    pub fn new(image: &RgbImage) -> Self {
        let gray = imageops::grayscale(image);
        let smoothed = if gray.width() == 0 || gray.height() == 0 {
            gray
        } else {
            gaussian_blur_f32(&gray, BLUR_SIGMA)
        };
        Self { smoothed }
    }

    /// The desaturated, blurred raster every strategy starts from.
    pub fn smoothed(&self) -> &GrayImage {
        &self.smoothed
    }

    /// Produce the structure map for one strategy.
    ///
    /// Foreground pixels are 255, background 0. A map with no background at
    /// all carries no boundary information and comes back empty.
    #[instrument(skip(self))]
    pub fn build(&self, strategy: Strategy) -> GrayImage {
        let (width, height) = self.smoothed.dimensions();
        if width == 0 || height == 0 {
            return GrayImage::new(width, height);
        }

        let (recipe, passes) = recipe(strategy);
        let raw = match recipe {
            Recipe::Canny { low, high } => canny(&self.smoothed, low, high),
            Recipe::Adaptive => adaptive_map(&self.smoothed),
            Recipe::Otsu => otsu_map(&self.smoothed),
        };

        if raw.pixels().all(|p| p.0[0] == FOREGROUND) {
            debug!("Structure map saturated, discarding");
            return GrayImage::new(width, height);
        }

        // Closing bridges gaps like repeated dilation does but leaves the outer
        // extent of each region where it was.
        let closed = morphology::close(&raw, Norm::LInf, CLOSE_RADIUS_PER_PASS * passes);
        debug!(
            foreground = closed.pixels().filter(|p| p.0[0] == FOREGROUND).count(),
            "Structure map built"
        );
        closed
    }
}

/// Inverted local-mean binarization: pixels darker than their neighbourhood
/// mean by at least [`ADAPTIVE_OFFSET`] become foreground, which marks the
/// dark side of every strong boundary.
fn adaptive_map(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let integral = integral_image::<_, u32>(gray);

    GrayImage::from_fn(width, height, |x, y| {
        let (left, top) = (
            x.saturating_sub(ADAPTIVE_BLOCK_RADIUS),
            y.saturating_sub(ADAPTIVE_BLOCK_RADIUS),
        );
        let (right, bottom) = (
            (x + ADAPTIVE_BLOCK_RADIUS).min(width - 1),
            (y + ADAPTIVE_BLOCK_RADIUS).min(height - 1),
        );
        let count = (right - left + 1) * (bottom - top + 1);
        let sum = sum_image_pixels(&integral, left, top, right, bottom)[0];
        let local_mean = sum as f64 / count as f64;

        let value = gray.get_pixel(x, y).0[0] as f64;
        if value <= local_mean - ADAPTIVE_OFFSET {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// Inverted global Otsu binarization: the darker class becomes foreground.
///
/// A single-tone image has no darker class, so its map stays empty.
fn otsu_map(gray: &GrayImage) -> GrayImage {
    let mut tones = gray.pixels();
    let single_tone = tones.next().is_none_or(|first| tones.all(|p| p == first));
    if single_tone {
        return GrayImage::new(gray.width(), gray.height());
    }
    let level = otsu_level(gray);
    debug!(level, "Otsu level computed");
    threshold(gray, level, ThresholdType::BinaryInverted)
}
