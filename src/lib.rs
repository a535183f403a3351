//! Brickset: leak-free YOLO datasets from sorter captures.
//!
//! A part sorter photographs every object several times as it passes the
//! camera and files the frames into a directory per part. Brickset groups
//! those frames into passes (clusters) by timestamp, assigns whole clusters
//! to train/val/test with a seeded shuffle, and exports representative
//! frames as hard links with YOLO label files and a `bricks.yaml` manifest.
//!
//! # Modules
//!
//! - [`capture`]: Capture file names (timestamp and bounding box)
//! - [`scan`]: Finding class directories under capture roots
//! - [`cluster`]: Temporal clustering
//! - [`classes`]: Class naming and per-class aggregation
//! - [`split`]: Seeded cluster-level train/val/test allocation
//! - [`label`]: Boxes, resolutions and YOLO label lines
//! - [`export`]: Dataset export and manifest
//! - [`pipeline`]: The end-to-end run
//! - [`stats`]: Box statistics and outlier listing
//! - [`error`]: Error types

pub mod capture;
pub mod classes;
pub mod cluster;
pub mod error;
pub mod export;
pub mod label;
pub mod pipeline;
pub mod scan;
pub mod split;
pub mod stats;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use env_logger::{Env, Target};

pub use error::BricksetError;

use classes::{AggregateOptions, QUALITY_CONTROL_LABELS};
use cluster::ClusterOptions;
use export::{ExportOptions, ManifestOptions};
use pipeline::{run_pipeline, PipelineOptions};
use split::SplitOptions;
use stats::{box_stats, BoxStatsOptions};

/// The brickset CLI application.
#[derive(Parser)]
#[command(name = "brickset")]
#[command(version, about)]
struct Cli {
    /// Capture root directories to scan.
    #[arg(default_value = ".")]
    roots: Vec<PathBuf>,

    /// Output dataset directory.
    #[arg(short, long, default_value = "yolo_dataset", env = "BRICKSET_OUTPUT")]
    output: PathBuf,

    /// Directory class names are derived from (defaults to each root).
    #[arg(long)]
    input_root: Option<PathBuf>,

    /// Largest gap between frames of one pass, in seconds.
    #[arg(long, default_value_t = 0.5, value_parser = parse_gap)]
    gap_seconds: f64,

    /// Classes with fewer clusters are skipped.
    #[arg(long, default_value_t = 20)]
    min_clusters: usize,

    /// Seed of the split shuffle.
    #[arg(long, default_value_t = 42, env = "BRICKSET_SEED")]
    seed: u64,

    /// Fraction of clusters assigned to val.
    #[arg(long, default_value_t = 0.25, value_parser = parse_fraction)]
    val_fraction: f64,

    /// Fraction of clusters assigned to test.
    #[arg(long, default_value_t = 0.25, value_parser = parse_fraction)]
    test_fraction: f64,

    /// Suffix of split directory names (`train2023`).
    #[arg(long, default_value = "2023")]
    split_suffix: String,

    /// Dataset directory prefix written into the manifest.
    #[arg(long, default_value = "bricks")]
    dataset_name: String,

    /// Manifest file name, relative to the output directory.
    #[arg(long, default_value = "bricks.yaml")]
    manifest: PathBuf,

    /// Top-level directories collapsed into one class (comma separated).
    #[arg(long, value_delimiter = ',', default_values_t = QUALITY_CONTROL_LABELS.map(String::from))]
    quality_labels: Vec<String>,

    /// Cluster and split, but write nothing.
    #[arg(long)]
    dry_run: bool,

    /// Print box statistics and outlier captures instead of exporting.
    #[arg(long)]
    box_stats: bool,

    /// Format of the run summary.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("fraction must be between 0.0 and 1.0".to_string()),
    }
}

fn parse_gap(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if val.is_finite() && val >= 0.0 => Ok(val),
        _ => Err("gap must be a non-negative number of seconds".to_string()),
    }
}

impl Cli {
    fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            roots: self.roots.clone(),
            cluster: ClusterOptions {
                gap_seconds: self.gap_seconds,
            },
            aggregate: AggregateOptions {
                min_clusters: self.min_clusters,
                naming_root: self.input_root.clone(),
                quality_labels: self.quality_labels.clone(),
                exclude: Vec::new(),
            },
            split: SplitOptions {
                seed: self.seed,
                val_fraction: self.val_fraction,
                test_fraction: self.test_fraction,
            },
            export: ExportOptions {
                output_root: self.output.clone(),
                split_suffix: self.split_suffix.clone(),
                manifest: ManifestOptions {
                    file_name: self.manifest.clone(),
                    dataset_name: self.dataset_name.clone(),
                    ..Default::default()
                },
                ..Default::default()
            },
            dry_run: self.dry_run,
        }
    }
}

/// Run the brickset CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), BricksetError> {
    let cli = Cli::parse();

    // Keep stdout clean for machine-readable reports.
    let target = match cli.report {
        ReportFormat::Text => Target::Stdout,
        ReportFormat::Json => Target::Stderr,
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(target)
        .format_timestamp(None)
        .try_init();

    if cli.box_stats {
        let opts = BoxStatsOptions {
            exclude: vec![cli.output.clone()],
            ..Default::default()
        };
        let report = box_stats(&cli.roots, &opts)?;
        return print_report(cli.report, &report);
    }

    let summary = run_pipeline(&cli.pipeline_options())?;
    print_report(cli.report, &summary)
}

fn print_report<R>(format: ReportFormat, report: &R) -> Result<(), BricksetError>
where
    R: serde::Serialize + std::fmt::Display,
{
    match format {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(report)
                .map_err(|source| BricksetError::ReportWrite { source })?;
            println!("{json}");
        }
        ReportFormat::Text => print!("{report}"),
    }
    Ok(())
}
