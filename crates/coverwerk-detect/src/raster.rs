// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster input and output at the edge of the pipeline.

use std::io::Cursor;
use std::path::Path;

use coverwerk_core::{CoverwerkError, Result};
use image::{ImageFormat, RgbImage};
use tracing::{debug, instrument};

/// Decode encoded image bytes (JPEG, PNG, ...) into 8-bit RGB.
///
/// Alpha is dropped; grayscale and palette images are expanded.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_raster(data: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(data)
        .map_err(|err| CoverwerkError::Decode(err.to_string()))?;
    debug!(width = image.width(), height = image.height(), "Image decoded from bytes");
    Ok(image.to_rgb8())
}

/// Read and decode an image file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open_raster(path: impl AsRef<Path>) -> Result<RgbImage> {
    let data = std::fs::read(path.as_ref())?;
    decode_raster(&data).map_err(|err| match err {
        CoverwerkError::Decode(detail) => {
            CoverwerkError::Decode(format!("{}: {detail}", path.as_ref().display()))
        }
        other => other,
    })
}

/// Write an image. The format is inferred from the file extension.
pub fn save_raster(image: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    image.save(path.as_ref()).map_err(|err| {
        CoverwerkError::ImageError(format!(
            "failed to save image to {}: {}",
            path.as_ref().display(),
            err
        ))
    })
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|err| CoverwerkError::ImageError(format!("PNG encoding failed: {err}")))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn png_bytes_decode_back() {
        let image = RgbImage::from_fn(8, 5, |x, y| Rgb([x as u8 * 30, y as u8 * 50, 7]));
        let bytes = encode_png(&image).unwrap();
        assert_eq!(decode_raster(&bytes).unwrap(), image);
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        assert!(matches!(
            decode_raster(b"definitely not an image"),
            Err(CoverwerkError::Decode(_))
        ));
    }

    #[test]
    fn open_and_save_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.png");
        let image = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        save_raster(&image, &path).unwrap();
        assert_eq!(open_raster(&path).unwrap(), image);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            open_raster(dir.path().join("absent.jpg")),
            Err(CoverwerkError::Io(_))
        ));
    }

    #[test]
    fn unknown_extension_fails_to_save() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbImage::new(2, 2);
        assert!(matches!(
            save_raster(&image, dir.path().join("cover.unknownext")),
            Err(CoverwerkError::ImageError(_))
        ));
    }
}
