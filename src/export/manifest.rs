//! The dataset manifest (`bricks.yaml`).
//!
//! The manifest is what a YOLO trainer is pointed at: split image
//! directories, class count and class names. Each name carries a trailing
//! comment with its exported frame counts so class balance is visible at a
//! glance.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::registry::{ClassRegistry, ExportCounters};
use crate::error::BricksetError;
use crate::split::Split;

/// Manifest naming options.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestOptions {
    /// File name, relative to the output root unless absolute.
    pub file_name: PathBuf,
    /// Directory prefix the trainer resolves split paths against.
    pub dataset_name: String,
    /// Text of the leading comment line.
    pub title: String,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            file_name: PathBuf::from("bricks.yaml"),
            dataset_name: "bricks".to_string(),
            title: "Bricks dataset".to_string(),
        }
    }
}

/// Renders the manifest text, or `None` when no class was registered.
pub fn render_manifest(
    registry: &ClassRegistry,
    counters: &ExportCounters,
    opts: &ManifestOptions,
    split_suffix: &str,
) -> Option<String> {
    if registry.is_empty() {
        return None;
    }

    let mut out = format!("# {}\n", opts.title);
    for split in [Split::Train, Split::Val, Split::Test] {
        out.push_str(&format!(
            "{}: {}/images/{}\n",
            split,
            opts.dataset_name,
            split.dir_name(split_suffix)
        ));
    }
    out.push_str(&format!("nc: {}\n", registry.len()));
    out.push_str("names: [\n");

    let scalars: Vec<String> = registry.names().iter().map(|name| yaml_scalar(name)).collect();
    let longest = scalars.iter().map(|s| s.chars().count()).max().unwrap_or(0);
    for (name, scalar) in registry.names().iter().zip(&scalars) {
        let counts = counters.get(name);
        let pad = " ".repeat(longest - scalar.chars().count());
        out.push_str(&format!(
            "    {scalar},{pad}  # train={:<4} val={:<3} test={}\n",
            counts.train, counts.val, counts.test
        ));
    }
    out.push_str("]\n");

    Some(out)
}

/// Plain scalars for ordinary directory names, single quotes otherwise.
fn yaml_scalar(raw: &str) -> String {
    let plain = raw
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphanumeric())
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if plain {
        raw.to_string()
    } else {
        format!("'{}'", raw.replace('\'', "''"))
    }
}

/// A manifest read back from disk.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    pub train: String,
    pub val: String,
    pub test: String,
    pub nc: usize,
    pub names: Vec<String>,
}

/// Reads a manifest written by [`render_manifest`].
pub fn read_manifest(path: &Path) -> Result<Manifest, BricksetError> {
    let data = fs::read_to_string(path)?;
    serde_yaml::from_str(&data).map_err(|source| BricksetError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(names: &[&str]) -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        for name in names {
            registry.register(name);
        }
        registry
    }

    #[test]
    fn empty_registry_renders_nothing() {
        let rendered = render_manifest(
            &ClassRegistry::new(),
            &ExportCounters::default(),
            &ManifestOptions::default(),
            "2023",
        );
        assert!(rendered.is_none());
    }

    #[test]
    fn renders_header_and_aligned_counts() {
        let registry = registry_with(&["3001_brick_2x4", "broken"]);
        let mut counters = ExportCounters::default();
        for _ in 0..10 {
            counters.increment("3001_brick_2x4", Split::Train);
        }
        counters.increment("3001_brick_2x4", Split::Val);
        counters.increment("broken", Split::Test);

        let rendered = render_manifest(&registry, &counters, &ManifestOptions::default(), "2023")
            .expect("manifest");

        assert_eq!(
            rendered,
            "# Bricks dataset\n\
             train: bricks/images/train2023\n\
             val: bricks/images/val2023\n\
             test: bricks/images/test2023\n\
             nc: 2\n\
             names: [\n\
             \x20   3001_brick_2x4,  # train=10   val=1   test=0\n\
             \x20   broken,          # train=0    val=0   test=1\n\
             ]\n"
        );
    }

    #[test]
    fn rendered_manifest_parses_as_yaml() {
        let registry = registry_with(&["3001_brick_2x4", "minifig_head", "odd: name"]);
        let rendered = render_manifest(
            &registry,
            &ExportCounters::default(),
            &ManifestOptions::default(),
            "",
        )
        .expect("manifest");

        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("bricks.yaml");
        fs::write(&path, rendered).expect("write manifest");

        let manifest = read_manifest(&path).expect("read manifest");
        assert_eq!(manifest.train, "bricks/images/train");
        assert_eq!(manifest.nc, 3);
        assert_eq!(
            manifest.names,
            vec!["3001_brick_2x4", "minifig_head", "odd: name"]
        );
    }
}
