//! Class naming and per-class cluster aggregation.
//!
//! Captures are filed by the sorter operator into a directory per part,
//! sometimes nested by category (`technic/3702_technic_brick_1x8`), with
//! quality-control bins (`broken/...`, `dirty/...`) collecting defective
//! parts of every kind. Class names must be flat because they become
//! directory names inside the exported dataset.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info, warn};

use crate::cluster::{cluster_directory, Cluster, ClusterOptions};
use crate::error::BricksetError;
use crate::scan::find_class_dirs;

/// Top-level directories whose contents collapse into a single class.
pub const QUALITY_CONTROL_LABELS: [&str; 3] = ["broken", "dirty", "reject"];

/// Maps class directories to flat class names.
#[derive(Clone, Debug)]
pub struct ClassNamer {
    root: PathBuf,
    quality_labels: Vec<String>,
}

impl ClassNamer {
    /// Creates a namer for directories below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            quality_labels: QUALITY_CONTROL_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replaces the quality-control labels.
    pub fn with_quality_labels(mut self, labels: Vec<String>) -> Self {
        self.quality_labels = labels;
        self
    }

    /// Returns the class name of a directory.
    ///
    /// - `broken/98282_mudguard_broken` -> `broken`
    /// - `technic/3702_technic_brick` -> `3702_technic_brick`
    /// - `minifig/minecraft/head` -> `minifig_minecraft_head`
    pub fn class_name(&self, dir: &Path) -> String {
        let Some(segments) = self.relative_segments(dir) else {
            return last_segment(dir);
        };

        match segments.first() {
            None => last_segment(dir),
            Some(first) if self.quality_labels.iter().any(|label| label == first) => first.clone(),
            Some(_) => {
                let last = last_segment(dir);
                if starts_with_part_number(&last) {
                    last
                } else {
                    segments.join("_")
                }
            }
        }
    }

    fn relative_segments(&self, dir: &Path) -> Option<Vec<String>> {
        let rel = match dir.strip_prefix(&self.root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => {
                let dir = fs::canonicalize(dir).ok()?;
                let root = fs::canonicalize(&self.root).ok()?;
                dir.strip_prefix(root).ok()?.to_path_buf()
            }
        };

        Some(
            rel.components()
                .filter_map(|component| match component {
                    Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect(),
        )
    }
}

fn starts_with_part_number(segment: &str) -> bool {
    segment.len() >= 4 && segment.as_bytes()[..4].iter().all(u8::is_ascii_digit)
}

fn last_segment(dir: &Path) -> String {
    if let Some(name) = dir.file_name() {
        return name.to_string_lossy().into_owned();
    }
    // `.` and similar have no file name of their own.
    fs::canonicalize(dir)
        .ok()
        .and_then(|canonical| canonical.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "root".to_string())
}

/// All clusters gathered for one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassGroup {
    pub name: String,
    pub clusters: Vec<Cluster>,
}

impl ClassGroup {
    pub fn image_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }
}

/// Aggregation options.
#[derive(Clone, Debug)]
pub struct AggregateOptions {
    /// Classes with fewer clusters than this are dropped.
    pub min_clusters: usize,
    /// Root that class names are computed relative to; each scan root when unset.
    pub naming_root: Option<PathBuf>,
    pub quality_labels: Vec<String>,
    /// Directories never scanned (typically the output root).
    pub exclude: Vec<PathBuf>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            min_clusters: 20,
            naming_root: None,
            quality_labels: QUALITY_CONTROL_LABELS.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
        }
    }
}

/// A class removed for having too few clusters.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DroppedClass {
    pub name: String,
    pub clusters: usize,
}

/// Result of scanning and aggregating all roots.
#[derive(Clone, Debug, Default)]
pub struct Aggregation {
    /// Retained classes in first-seen order.
    pub classes: Vec<ClassGroup>,
    pub dropped: Vec<DroppedClass>,
}

impl Aggregation {
    pub fn cluster_count(&self) -> usize {
        self.classes.iter().map(|class| class.clusters.len()).sum()
    }
}

/// Scans every root, clusters each class directory and merges clusters by
/// class name, then drops classes below the minimum cluster count.
pub fn aggregate_classes(
    roots: &[PathBuf],
    opts: &AggregateOptions,
    cluster_opts: &ClusterOptions,
) -> Result<Aggregation, BricksetError> {
    let mut groups: Vec<ClassGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for root in roots {
        let namer = ClassNamer::new(opts.naming_root.clone().unwrap_or_else(|| root.clone()))
            .with_quality_labels(opts.quality_labels.clone());
        let class_dirs = find_class_dirs(root, &opts.exclude)?;
        info!("{}: {} class directories", root.display(), class_dirs.len());

        for class_dir in class_dirs {
            let clusters = cluster_directory(&class_dir, cluster_opts)?;
            let name = namer.class_name(&class_dir);
            debug!(
                "{} -> {} ({} clusters)",
                class_dir.display(),
                name,
                clusters.len()
            );

            let slot = *index.entry(name.clone()).or_insert_with(|| {
                groups.push(ClassGroup {
                    name,
                    clusters: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].clusters.extend(clusters);
        }
    }

    Ok(filter_classes(groups, opts.min_clusters))
}

/// Splits groups into retained and dropped by cluster count.
pub fn filter_classes(groups: Vec<ClassGroup>, min_clusters: usize) -> Aggregation {
    let mut aggregation = Aggregation::default();
    for group in groups {
        if group.clusters.len() < min_clusters {
            warn!(
                "Skipping {} with only {} clusters (min {}).",
                group.name,
                group.clusters.len(),
                min_clusters
            );
            aggregation.dropped.push(DroppedClass {
                name: group.name,
                clusters: group.clusters.len(),
            });
        } else {
            aggregation.classes.push(group);
        }
    }
    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, b"").expect("touch file");
    }

    /// Writes `count` captures two seconds apart, so each is its own cluster.
    fn write_singletons(dir: &Path, count: usize) {
        for i in 0..count {
            let minute = i / 30;
            let second = (i % 30) * 2;
            touch(&dir.join(format!("20230523_10{minute:02}{second:02}000_l1_r2_t3_b4.jpg")));
        }
    }

    #[test]
    fn names_follow_directory_conventions() {
        let namer = ClassNamer::new("/data/nested");
        assert_eq!(
            namer.class_name(Path::new("/data/nested/broken/98282_brick")),
            "broken"
        );
        assert_eq!(
            namer.class_name(Path::new("/data/nested/technic/3702_technic_brick")),
            "3702_technic_brick"
        );
        assert_eq!(
            namer.class_name(Path::new("/data/nested/minifig/minecraft/head")),
            "minifig_minecraft_head"
        );
        assert_eq!(
            namer.class_name(Path::new("/data/nested/reject/nerf_dart")),
            "reject"
        );
    }

    #[test]
    fn names_outside_root_use_last_segment() {
        let namer = ClassNamer::new("/data/nested");
        assert_eq!(
            namer.class_name(Path::new("/elsewhere/minifig/head")),
            "head"
        );
    }

    #[test]
    fn part_number_needs_four_digits() {
        let namer = ClassNamer::new("/data");
        assert_eq!(namer.class_name(Path::new("/data/misc/123_x")), "misc_123_x");
        assert_eq!(namer.class_name(Path::new("/data/misc/1234x")), "1234x");
    }

    #[test]
    fn custom_quality_labels_replace_defaults() {
        let namer = ClassNamer::new("/data").with_quality_labels(vec!["scrap".to_string()]);
        assert_eq!(namer.class_name(Path::new("/data/scrap/3001_brick")), "scrap");
        assert_eq!(
            namer.class_name(Path::new("/data/broken/3001_brick")),
            "3001_brick"
        );
    }

    #[test]
    fn merges_same_class_across_roots_and_filters_small_classes() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root_a = temp.path().join("a");
        let root_b = temp.path().join("b");

        write_singletons(&root_a.join("bricks/3001_brick"), 2);
        write_singletons(&root_b.join("other/3001_brick"), 1);
        write_singletons(&root_a.join("broken/3001_brick"), 1);
        write_singletons(&root_b.join("broken/3002_brick"), 1);
        write_singletons(&root_a.join("minifig/head"), 1);

        let opts = AggregateOptions {
            min_clusters: 2,
            ..Default::default()
        };
        let aggregation =
            aggregate_classes(&[root_a, root_b], &opts, &ClusterOptions::default()).expect("aggregate");

        let retained: Vec<(&str, usize)> = aggregation
            .classes
            .iter()
            .map(|class| (class.name.as_str(), class.clusters.len()))
            .collect();
        assert_eq!(retained, vec![("3001_brick", 3), ("broken", 2)]);
        assert_eq!(
            aggregation.dropped,
            vec![DroppedClass {
                name: "minifig_head".to_string(),
                clusters: 1
            }]
        );
        assert_eq!(aggregation.cluster_count(), 5);
    }

    #[test]
    fn threshold_is_inclusive() {
        let groups = |count| {
            vec![ClassGroup {
                name: "3001_brick".to_string(),
                clusters: crate::cluster::cluster_paths(
                    &(0..count)
                        .map(|i| PathBuf::from(format!("c/20230523_1000{:02}000_a.jpg", i * 2)))
                        .collect::<Vec<_>>(),
                    &ClusterOptions::default(),
                ),
            }]
        };

        assert!(filter_classes(groups(19), 20).classes.is_empty());
        assert_eq!(filter_classes(groups(20), 20).classes.len(), 1);
    }
}
