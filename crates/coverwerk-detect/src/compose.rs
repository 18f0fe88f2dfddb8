// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Placing an extracted cover on a fixed-size background canvas.

use coverwerk_core::{CanvasSpec, CoverwerkError, Result};
use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::{debug, instrument};

/// Fraction of the canvas height the cover is scaled to.
const HEIGHT_FILL: f64 = 0.8;

/// Upper bound on the cover width as a fraction of the canvas width.
const WIDTH_LIMIT: f64 = 0.9;

/// Size the cover is scaled to on `spec`'s canvas.
///
/// Height becomes 80% of the canvas height; if that makes the cover wider than
/// 90% of the canvas, width is pinned to 90% instead. Aspect ratio is kept.
pub fn placement_size(cover_width: u32, cover_height: u32, spec: &CanvasSpec) -> Result<(u32, u32)> {
    if cover_width == 0 || cover_height == 0 {
        return Err(CoverwerkError::InvalidConfig(format!(
            "cannot place an empty {cover_width}x{cover_height} cover"
        )));
    }
    if spec.width == 0 || spec.height == 0 {
        return Err(CoverwerkError::InvalidConfig(format!(
            "canvas size {}x{} must be non-zero",
            spec.width, spec.height
        )));
    }

    let aspect = cover_width as f64 / cover_height as f64;
    let mut height = spec.height as f64 * HEIGHT_FILL;
    let mut width = height * aspect;
    let max_width = spec.width as f64 * WIDTH_LIMIT;
    if width > max_width {
        width = max_width;
        height = width / aspect;
    }

    Ok(((width.round() as u32).max(1), (height.round() as u32).max(1)))
}

/// Scale the cover with Lanczos3 and paste it centred on a fresh canvas.
#[instrument(skip(cover), fields(cover_width = cover.width(), cover_height = cover.height()))]
pub fn compose_on_canvas(cover: &RgbImage, spec: &CanvasSpec) -> Result<RgbImage> {
    let (width, height) = placement_size(cover.width(), cover.height(), spec)?;
    let resized = imageops::resize(cover, width, height, FilterType::Lanczos3);

    let mut canvas = RgbImage::from_pixel(spec.width, spec.height, spec.background_rgb());
    let x = (spec.width as i64 - width as i64) / 2;
    let y = (spec.height as i64 - height as i64) / 2;
    imageops::overlay(&mut canvas, &resized, x, y);

    debug!(width, height, x, y, "Cover placed on canvas");
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn portrait_cover_fills_eighty_percent_of_height() {
        let spec = CanvasSpec::default();
        assert_eq!(placement_size(1000, 1600, &spec).unwrap(), (540, 864));
    }

    #[test]
    fn wide_cover_is_limited_by_width() {
        let spec = CanvasSpec::default();
        let (w, h) = placement_size(4000, 1000, &spec).unwrap();
        assert_eq!(w, 1728);
        assert_eq!(h, 432);
    }

    #[test]
    fn cover_is_centred_on_background() {
        let spec = CanvasSpec::new(200, 100, Rgb([33, 150, 243]));
        let cover = RgbImage::from_pixel(50, 80, Rgb([255, 255, 255]));
        let canvas = compose_on_canvas(&cover, &spec).unwrap();

        assert_eq!(canvas.dimensions(), (200, 100));
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([33, 150, 243]));
        assert_eq!(*canvas.get_pixel(100, 50), Rgb([255, 255, 255]));
        // 80 px tall cover leaves a 10 px band above and below.
        assert_eq!(*canvas.get_pixel(100, 5), Rgb([33, 150, 243]));
        assert_eq!(*canvas.get_pixel(100, 94), Rgb([33, 150, 243]));
    }

    #[test]
    fn zero_sizes_are_invalid() {
        let cover = RgbImage::new(0, 10);
        assert!(matches!(
            compose_on_canvas(&cover, &CanvasSpec::default()),
            Err(CoverwerkError::InvalidConfig(_))
        ));
        let spec = CanvasSpec::new(0, 100, Rgb([0, 0, 0]));
        assert!(placement_size(10, 10, &spec).is_err());
    }
}
