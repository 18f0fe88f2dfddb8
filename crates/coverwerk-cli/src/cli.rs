// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use coverwerk_core::{FallbackPolicy, Strategy};

#[derive(Debug, Parser)]
#[command(name = "coverwerk")]
#[command(version, about = "Extract a book cover from a photo and place it on a clean canvas", long_about = None)]
pub struct Cli {
    /// Log pipeline progress in detail
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect the cover in a photo, straighten it and place it on a canvas
    Detect(DetectArgs),

    /// Place an already-cropped digital cover on a canvas without detection
    Place(PlaceArgs),
}

/// Canvas options shared by both commands.
#[derive(Debug, Clone, Args)]
pub struct CanvasArgs {
    /// Background color: white, black, red, blue, green, yellow or hex (#RRGGBB)
    #[arg(short, long, value_name = "COLOR", default_value = "white")]
    pub color: String,

    /// Canvas size in pixels
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"], default_values_t = [1920u32, 1080])]
    pub size: Vec<u32>,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Photo containing the book
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the finished image
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub canvas: CanvasArgs,

    /// Minimum cover area as a fraction of the photo (0-1]
    #[arg(long, value_name = "RATIO")]
    pub min_area: Option<f64>,

    /// Strategies to run, comma-separated (canny_standard, canny_sensitive, adaptive, otsu)
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub strategies: Option<Vec<Strategy>>,

    /// What to do when no cover is found: fail, or original to use the whole photo
    #[arg(long, value_name = "POLICY")]
    pub fallback: Option<FallbackPolicy>,

    /// JSON detection settings; command-line flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write an annotated image of every shape considered
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Args)]
pub struct PlaceArgs {
    /// Cover image
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the finished image
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    #[command(flatten)]
    pub canvas: CanvasArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn detect_with_defaults() {
        let cli = parse(&["coverwerk", "detect", "photo.jpg", "out.png"]);
        let Command::Detect(args) = cli.command else {
            panic!("expected detect");
        };
        assert_eq!(args.input, PathBuf::from("photo.jpg"));
        assert_eq!(args.output, PathBuf::from("out.png"));
        assert_eq!(args.canvas.color, "white");
        assert_eq!(args.canvas.size, vec![1920, 1080]);
        assert!(args.min_area.is_none());
        assert!(args.strategies.is_none());
        assert!(!args.debug);
        assert!(!cli.verbose);
    }

    #[test]
    fn detect_with_every_flag() {
        let cli = parse(&[
            "coverwerk",
            "detect",
            "in.jpg",
            "out.jpg",
            "--color",
            "#2196F3",
            "--size",
            "1280",
            "720",
            "--min-area",
            "0.05",
            "--strategies",
            "otsu,canny-standard",
            "--fallback",
            "original",
            "--debug",
            "-v",
        ]);
        let Command::Detect(args) = cli.command else {
            panic!("expected detect");
        };
        assert_eq!(args.canvas.color, "#2196F3");
        assert_eq!(args.canvas.size, vec![1280, 720]);
        assert_eq!(args.min_area, Some(0.05));
        assert_eq!(
            args.strategies,
            Some(vec![Strategy::Otsu, Strategy::CannyStandard])
        );
        assert_eq!(args.fallback, Some(FallbackPolicy::UseOriginal));
        assert!(args.debug);
        assert!(cli.verbose);
    }

    #[test]
    fn unknown_strategy_is_a_usage_error() {
        assert!(Cli::try_parse_from(["coverwerk", "detect", "a", "b", "--strategies", "sobel"]).is_err());
    }

    #[test]
    fn size_needs_two_values() {
        assert!(Cli::try_parse_from(["coverwerk", "place", "a", "b", "--size", "800"]).is_err());
    }

    #[test]
    fn place_parses_canvas_options() {
        let cli = parse(&["coverwerk", "place", "cover.png", "out.png", "-c", "black"]);
        let Command::Place(args) = cli.command else {
            panic!("expected place");
        };
        assert_eq!(args.canvas.color, "black");
        assert_eq!(args.canvas.size, vec![1920, 1080]);
    }
}
