//! End-to-end run: scan, cluster, split and export.

mod report;

pub use report::{RunSummary, SplitSummary};

use std::path::PathBuf;

use log::info;

use crate::classes::{aggregate_classes, AggregateOptions};
use crate::cluster::{Cluster, ClusterOptions};
use crate::error::BricksetError;
use crate::export::{DatasetExporter, ExportOptions};
use crate::split::{allocate, validate_split_options, SplitOptions};

/// Options for a full pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Capture roots, scanned in order.
    pub roots: Vec<PathBuf>,
    pub cluster: ClusterOptions,
    pub aggregate: AggregateOptions,
    pub split: SplitOptions,
    pub export: ExportOptions,
    /// Cluster and split without writing anything.
    pub dry_run: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            cluster: ClusterOptions::default(),
            aggregate: AggregateOptions::default(),
            split: SplitOptions::default(),
            export: ExportOptions::default(),
            dry_run: false,
        }
    }
}

impl PipelineOptions {
    pub fn validate(&self) -> Result<(), BricksetError> {
        if self.roots.is_empty() {
            return Err(BricksetError::InvalidConfig {
                message: "at least one capture root is required".to_string(),
            });
        }
        if !self.cluster.gap_seconds.is_finite() || self.cluster.gap_seconds < 0.0 {
            return Err(BricksetError::InvalidConfig {
                message: format!(
                    "--gap-seconds must be a non-negative number, got {}",
                    self.cluster.gap_seconds
                ),
            });
        }
        validate_split_options(&self.split)
    }
}

/// A cluster tagged with the class it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledCluster {
    pub class_name: String,
    pub cluster: Cluster,
}

/// Runs the whole pipeline and returns its summary.
///
/// Clusters from every retained class are pooled and split together, so
/// the split fractions hold across the dataset rather than per class.
pub fn run_pipeline(opts: &PipelineOptions) -> Result<RunSummary, BricksetError> {
    opts.validate()?;

    let mut aggregate = opts.aggregate.clone();
    aggregate.exclude.push(opts.export.output_root.clone());
    let aggregation = aggregate_classes(&opts.roots, &aggregate, &opts.cluster)?;

    let labeled: Vec<LabeledCluster> = aggregation
        .classes
        .into_iter()
        .flat_map(|class| {
            let class_name = class.name;
            class.clusters.into_iter().map(move |cluster| LabeledCluster {
                class_name: class_name.clone(),
                cluster,
            })
        })
        .collect();
    let assignment = allocate(labeled, &opts.split);

    let mut summary = RunSummary {
        dropped_classes: aggregation.dropped,
        dry_run: opts.dry_run,
        ..Default::default()
    };
    for (split, item) in assignment.iter() {
        summary.record_cluster(split, item.cluster.len());
    }

    if summary.is_empty() || opts.dry_run {
        return Ok(summary);
    }

    let mut exporter = DatasetExporter::new(opts.export.clone());
    for (split, item) in assignment.iter() {
        let outcomes = exporter.export_cluster(&item.cluster, &item.class_name, split)?;
        summary.record_exports(split, &outcomes);
    }

    summary.manifest = exporter.write_manifest()?;
    summary.classes = exporter.registry().len();
    if let Some(manifest) = &summary.manifest {
        info!("wrote {}", manifest.display());
    }

    Ok(summary)
}
