// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command implementations for the coverwerk binary.

use std::path::{Path, PathBuf};

use coverwerk_core::{CanvasSpec, CoverwerkError, DetectionConfig, Result, parse_color};
use coverwerk_detect::pipeline::resolve;
use coverwerk_detect::{
    CoverDetector, CoverSource, annotate, compose_on_canvas, open_raster, save_raster,
};
use tracing::{info, instrument};

use crate::cli::{CanvasArgs, DetectArgs, PlaceArgs};

/// Canvas described by the shared canvas flags.
pub fn canvas_spec(args: &CanvasArgs) -> Result<CanvasSpec> {
    let background = parse_color(&args.color)?;
    match args.size.as_slice() {
        [width, height] if *width > 0 && *height > 0 => Ok(CanvasSpec::new(*width, *height, background)),
        other => Err(CoverwerkError::InvalidConfig(format!(
            "canvas size must be two non-zero numbers, got {other:?}"
        ))),
    }
}

/// Batch settings, then the config file if given, then explicit flags.
pub fn detection_config(args: &DetectArgs) -> Result<DetectionConfig> {
    let mut config = match &args.config {
        Some(path) => DetectionConfig::load(path)?,
        None => DetectionConfig::batch(),
    };
    if let Some(ratio) = args.min_area {
        config.min_area_ratio = ratio;
    }
    if let Some(strategies) = &args.strategies {
        config.strategies = DetectionConfig::builder()
            .strategies(strategies.iter().copied())
            .build()
            .strategies;
    }
    if let Some(fallback) = args.fallback {
        config.fallback = fallback;
    }
    config.validate()?;
    Ok(config)
}

/// `photo.jpg` -> `photo_debug.png` in the same folder.
pub fn debug_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "coverwerk".into());
    output.with_file_name(format!("{stem}_debug.png"))
}

#[instrument(skip_all, fields(input = %args.input.display()))]
pub fn run_detect(args: &DetectArgs) -> Result<()> {
    let config = detection_config(args)?;
    let spec = canvas_spec(&args.canvas)?;
    let photo = open_raster(&args.input)?;

    let detector = CoverDetector::new(config)?;
    let (detection, report) = detector.detect_with_report(&photo)?;

    if args.debug {
        let path = debug_path(&args.output);
        save_raster(&annotate(&photo, &report), &path)?;
        println!("Debug image saved to {}", path.display());
    }

    let cover = resolve(detection, &photo, detector.config().fallback)?;
    match cover.source {
        CoverSource::Rectified { score, strategy } => {
            info!(%strategy, score, "Cover detected");
            println!("Cover detected with {strategy} (score {score:.3})");
        }
        CoverSource::Original => {
            println!("No cover outline found; using the whole photo");
        }
    }

    let canvas = compose_on_canvas(&cover.image, &spec)?;
    save_raster(&canvas, &args.output)?;
    println!("Saved {}", args.output.display());
    Ok(())
}

#[instrument(skip_all, fields(input = %args.input.display()))]
pub fn run_place(args: &PlaceArgs) -> Result<()> {
    let spec = canvas_spec(&args.canvas)?;
    let cover = open_raster(&args.input)?;
    let canvas = compose_on_canvas(&cover, &spec)?;
    save_raster(&canvas, &args.output)?;
    println!("Saved {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use coverwerk_core::{FallbackPolicy, Strategy};
    use coverwerk_detect::raster::encode_png;
    use image::{Rgb, RgbImage};
    use std::io::Write;

    use crate::cli::{Cli, Command};

    fn detect_args(extra: &[&str]) -> DetectArgs {
        let mut argv = vec!["coverwerk", "detect", "in.png", "out.png"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Detect(args) => args,
            Command::Place(_) => panic!("expected detect"),
        }
    }

    fn book_photo() -> RgbImage {
        RgbImage::from_fn(400, 400, |x, y| {
            if (100..300).contains(&x) && (40..360).contains(&y) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"min_area_ratio": 0.2, "strategies": ["adaptive"], "fallback": "use_original"}}"#)
            .unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let config = detection_config(&detect_args(&["--config", path.as_str(), "--min-area", "0.05"])).unwrap();
        assert_eq!(config.min_area_ratio, 0.05);
        assert_eq!(config.strategies, vec![Strategy::Adaptive]);
        assert_eq!(config.fallback, FallbackPolicy::UseOriginal);
    }

    #[test]
    fn defaults_are_batch_settings() {
        let config = detection_config(&detect_args(&[])).unwrap();
        assert_eq!(config, DetectionConfig::batch());
    }

    #[test]
    fn out_of_range_min_area_is_invalid() {
        assert!(matches!(
            detection_config(&detect_args(&["--min-area", "1.5"])),
            Err(CoverwerkError::InvalidConfig(_))
        ));
    }

    #[test]
    fn canvas_spec_parses_color() {
        let args = detect_args(&["--color", "green", "--size", "640", "480"]);
        let spec = canvas_spec(&args.canvas).unwrap();
        assert_eq!((spec.width, spec.height), (640, 480));
        assert_eq!(spec.background, [76, 175, 80]);

        let args = detect_args(&["--color", "mauve"]);
        assert!(matches!(
            canvas_spec(&args.canvas),
            Err(CoverwerkError::InvalidColor { .. })
        ));
    }

    #[test]
    fn debug_image_sits_beside_output() {
        assert_eq!(
            debug_path(Path::new("/tmp/books/cover.jpg")),
            PathBuf::from("/tmp/books/cover_debug.png")
        );
    }

    #[test]
    fn detect_writes_canvas_and_debug_image() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        let output = dir.path().join("cover.png");
        std::fs::write(&input, encode_png(&book_photo()).unwrap()).unwrap();

        let argv = [
            "coverwerk",
            "detect",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--size",
            "320",
            "240",
            "--debug",
        ];
        let Command::Detect(args) = Cli::try_parse_from(argv).unwrap().command else {
            panic!("expected detect");
        };
        run_detect(&args).unwrap();

        let canvas = open_raster(&output).unwrap();
        assert_eq!(canvas.dimensions(), (320, 240));
        assert!(dir.path().join("cover_debug.png").exists());
    }

    #[test]
    fn detect_on_blank_photo_fails_unless_fallback_requested() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("blank.png");
        let output = dir.path().join("out.png");
        std::fs::write(&input, encode_png(&RgbImage::new(100, 100)).unwrap()).unwrap();

        let base = ["coverwerk", "detect", input.to_str().unwrap(), output.to_str().unwrap()];
        let Command::Detect(args) = Cli::try_parse_from(base).unwrap().command else {
            panic!("expected detect");
        };
        assert!(matches!(run_detect(&args), Err(CoverwerkError::NoCandidateFound)));
        assert!(!output.exists());

        let mut with_fallback = base.to_vec();
        with_fallback.extend(["--fallback", "original"]);
        let Command::Detect(args) = Cli::try_parse_from(with_fallback).unwrap().command else {
            panic!("expected detect");
        };
        run_detect(&args).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn place_composes_without_detection() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("digital.png");
        let output = dir.path().join("placed.png");
        std::fs::write(&input, encode_png(&RgbImage::from_pixel(30, 60, Rgb([9, 9, 9]))).unwrap())
            .unwrap();

        let argv = [
            "coverwerk",
            "place",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--size",
            "200",
            "100",
        ];
        let Command::Place(args) = Cli::try_parse_from(argv).unwrap().command else {
            panic!("expected place");
        };
        run_place(&args).unwrap();
        let canvas = open_raster(&output).unwrap();
        assert_eq!(canvas.dimensions(), (200, 100));
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*canvas.get_pixel(100, 50), Rgb([9, 9, 9]));
    }
}
