//! YOLO dataset export.
//!
//! Frames are hard-linked into `images/{split}/{class}/` and labelled in
//! `labels/{split}/{class}/`. Links are created once and labels are always
//! rewritten, so an interrupted export can simply be run again.

mod manifest;
mod registry;

pub use manifest::{read_manifest, render_manifest, Manifest, ManifestOptions};
pub use registry::{ClassRegistry, ExportCounters, SplitCounts};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::capture::{file_name, parse_bbox, parse_timestamp, SourceImage};
use crate::cluster::Cluster;
use crate::error::BricksetError;
use crate::label::{check_resolution, read_resolution, LabelLine, Resolution, SENSOR_RESOLUTION};
use crate::split::Split;

/// Export options.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    pub output_root: PathBuf,
    /// Appended to split names to form split directories (`train2023`).
    pub split_suffix: String,
    /// Resolution every capture must match (in either orientation).
    pub resolution: Resolution,
    pub manifest: ManifestOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("yolo_dataset"),
            split_suffix: "2023".to_string(),
            resolution: SENSOR_RESOLUTION,
            manifest: ManifestOptions::default(),
        }
    }
}

/// What happened to one exported source frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported {
        image: PathBuf,
        label: PathBuf,
        /// False when the image link already existed.
        linked: bool,
    },
    Skipped {
        source: PathBuf,
        reason: String,
    },
}

impl ExportOutcome {
    pub fn is_exported(&self) -> bool {
        matches!(self, ExportOutcome::Exported { .. })
    }
}

/// Indices of the frames exported from a cluster of `len` frames.
///
/// The median frame always goes out. Evaluation splits additionally take
/// the first and last frame of clusters with at least three frames.
pub fn representative_indices(len: usize, split: Split) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let mut indices = vec![len / 2];
    if len >= 3 && !split.is_train() {
        indices.push(0);
        indices.push(len - 1);
    }
    indices
}

/// Writes one export run and owns its class registry and counters.
#[derive(Debug)]
pub struct DatasetExporter {
    opts: ExportOptions,
    registry: ClassRegistry,
    counters: ExportCounters,
}

impl DatasetExporter {
    pub fn new(opts: ExportOptions) -> Self {
        Self {
            opts,
            registry: ClassRegistry::new(),
            counters: ExportCounters::default(),
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.opts
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn counters(&self) -> &ExportCounters {
        &self.counters
    }

    /// Exports the representative frames of a cluster.
    pub fn export_cluster(
        &mut self,
        cluster: &Cluster,
        class_name: &str,
        split: Split,
    ) -> Result<Vec<ExportOutcome>, BricksetError> {
        let split_dir = split.dir_name(&self.opts.split_suffix);
        representative_indices(cluster.len(), split)
            .into_iter()
            .map(|index| {
                let image: &SourceImage = &cluster.images()[index];
                self.export_into(&image.path, class_name, &split_dir, Some(split))
            })
            .collect()
    }

    /// Exports a single capture with its label into `split_dir`.
    ///
    /// The split counted for the frame is recovered from the directory
    /// name; a name matching no split is exported but not counted.
    /// Unparsable names are skipped without touching the output tree. A
    /// capture whose resolution does not match the sensor aborts with
    /// [`BricksetError::ResolutionMismatch`].
    pub fn export_file(
        &mut self,
        source: &Path,
        class_name: &str,
        split_dir: &str,
    ) -> Result<ExportOutcome, BricksetError> {
        let split = Split::from_dir_name(split_dir);
        if split.is_none() {
            warn!("unexpected split: {split_dir}");
        }
        self.export_into(source, class_name, split_dir, split)
    }

    fn export_into(
        &mut self,
        source: &Path,
        class_name: &str,
        split_dir: &str,
        split: Option<Split>,
    ) -> Result<ExportOutcome, BricksetError> {
        let class_id = self.registry.register(class_name);

        let name = file_name(source);
        let parsed =
            parse_timestamp(&name).and_then(|captured| parse_bbox(&name).map(|bbox| (captured, bbox)));
        let (captured, bbox) = match parsed {
            Ok(parsed) => parsed,
            Err(err) if err.is_skippable() => {
                warn!("skipping {}: {}", source.display(), err);
                return Ok(ExportOutcome::Skipped {
                    source: source.to_path_buf(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        let resolution = read_resolution(source)?;
        check_resolution(source, resolution, self.opts.resolution)?;
        let line = LabelLine::encode(class_id, &bbox, resolution);

        let output_base = format!("{}_{}", captured.stamp, class_name);
        let image = self
            .opts
            .output_root
            .join("images")
            .join(split_dir)
            .join(class_name)
            .join(format!("{output_base}.jpg"));
        let label = self
            .opts
            .output_root
            .join("labels")
            .join(split_dir)
            .join(class_name)
            .join(format!("{output_base}.txt"));

        let linked = link_once(source, &image)?;
        write_label(&label, &line)?;
        debug!("{} -> {} ({})", source.display(), image.display(), line);

        if let Some(split) = split {
            self.counters.increment(class_name, split);
        }

        Ok(ExportOutcome::Exported {
            image,
            label,
            linked,
        })
    }

    /// Writes the manifest for every registered class.
    ///
    /// Returns the manifest path, or `None` when nothing was registered.
    pub fn write_manifest(&self) -> Result<Option<PathBuf>, BricksetError> {
        let Some(text) = render_manifest(
            &self.registry,
            &self.counters,
            &self.opts.manifest,
            &self.opts.split_suffix,
        ) else {
            return Ok(None);
        };

        let path = self.opts.output_root.join(&self.opts.manifest.file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, text)?;
        Ok(Some(path))
    }
}

/// Hard-links `source` to `dest` unless `dest` already exists.
fn link_once(source: &Path, dest: &Path) -> Result<bool, BricksetError> {
    if dest.exists() {
        return Ok(false);
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    match fs::hard_link(source, dest) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Replaces the label file through a temporary sibling.
fn write_label(path: &Path, line: &LabelLine) -> Result<(), BricksetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp = path.with_extension("txt.tmp");
    fs::write(&temp, format!("{line}\n"))?;
    fs::rename(&temp, path)?;
    Ok(())
}
