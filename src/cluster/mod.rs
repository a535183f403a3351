//! Temporal clustering of captures.
//!
//! The sorter photographs each object several times as it passes the camera.
//! Frames of one pass are a few hundred milliseconds apart; different objects
//! are seconds apart. Grouping by the gap between consecutive timestamps
//! recovers the passes, and splits are later assigned per pass so that
//! near-identical frames never straddle train and evaluation sets.

use std::path::{Path, PathBuf};

use chrono::TimeDelta;
use log::warn;

use crate::capture::SourceImage;
use crate::error::BricksetError;
use crate::scan::list_images;

/// Clustering options.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterOptions {
    /// Largest gap between consecutive frames of one cluster, in seconds.
    pub gap_seconds: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self { gap_seconds: 0.5 }
    }
}

impl ClusterOptions {
    /// The gap threshold at the millisecond resolution of capture names.
    ///
    /// Capture gaps are whole milliseconds, so a fractional threshold is
    /// floored: 1.5 ms admits a 1 ms gap but not a 2 ms one. The epsilon
    /// keeps values such as 0.29 s, stored as 0.28999..., at 290 ms.
    pub fn gap(&self) -> TimeDelta {
        TimeDelta::milliseconds((self.gap_seconds * 1000.0 + 1e-6).floor() as i64)
    }
}

/// A non-empty, chronologically ordered run of frames from one pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    images: Vec<SourceImage>,
}

impl Cluster {
    fn start(first: SourceImage) -> Self {
        Self {
            images: vec![first],
        }
    }

    pub fn images(&self) -> &[SourceImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn first(&self) -> &SourceImage {
        &self.images[0]
    }

    pub fn last(&self) -> &SourceImage {
        &self.images[self.images.len() - 1]
    }

    /// The frame at index `len / 2`.
    pub fn median(&self) -> &SourceImage {
        &self.images[self.images.len() / 2]
    }

    /// Directory the cluster was scanned from.
    pub fn class_dir(&self) -> &Path {
        self.first().class_dir()
    }

    /// Time from the first to the last frame.
    pub fn span(&self) -> TimeDelta {
        self.last().captured.at - self.first().captured.at
    }
}

/// Groups already-parsed images into clusters.
///
/// Images are sorted by capture time (ties by file name) and a new cluster
/// starts wherever the gap to the previous frame exceeds the threshold.
pub fn cluster_images(mut images: Vec<SourceImage>, opts: &ClusterOptions) -> Vec<Cluster> {
    images.sort_by(|a, b| {
        a.captured
            .at
            .cmp(&b.captured.at)
            .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
    });

    let threshold = opts.gap();
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut images = images.into_iter();
    let Some(first) = images.next() else {
        return clusters;
    };

    let mut current = Cluster::start(first);
    for image in images {
        let gap = image.captured.at - current.last().captured.at;
        if gap <= threshold {
            current.images.push(image);
        } else {
            clusters.push(std::mem::replace(&mut current, Cluster::start(image)));
        }
    }
    clusters.push(current);

    clusters
}

/// Parses capture paths and clusters them, skipping unparsable names.
pub fn cluster_paths(paths: &[PathBuf], opts: &ClusterOptions) -> Vec<Cluster> {
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        match SourceImage::from_path(path) {
            Ok(image) => images.push(image),
            Err(err) => warn!("skipping {}: {}", path.display(), err),
        }
    }
    cluster_images(images, opts)
}

/// Clusters the captures directly inside one class directory.
pub fn cluster_directory(dir: &Path, opts: &ClusterOptions) -> Result<Vec<Cluster>, BricksetError> {
    let paths = list_images(dir)?;
    Ok(cluster_paths(&paths, opts))
}
