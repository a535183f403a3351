//! Run summary printed after a pipeline run.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::classes::DroppedClass;
use crate::export::ExportOutcome;
use crate::split::Split;

/// Per-split totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitSummary {
    pub clusters: usize,
    /// Frames in the assigned clusters.
    pub images: usize,
    /// Frames actually written (representatives only).
    pub exported_frames: usize,
}

/// Summary of one pipeline run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunSummary {
    pub total_clusters: usize,
    pub total_images: usize,
    pub train: SplitSummary,
    pub val: SplitSummary,
    pub test: SplitSummary,
    /// Classes written to the manifest.
    pub classes: usize,
    pub dropped_classes: Vec<DroppedClass>,
    /// Representative frames skipped for unparsable names.
    pub skipped_frames: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    pub dry_run: bool,
}

impl RunSummary {
    pub fn split(&self, split: Split) -> &SplitSummary {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    pub(crate) fn split_mut(&mut self, split: Split) -> &mut SplitSummary {
        match split {
            Split::Train => &mut self.train,
            Split::Val => &mut self.val,
            Split::Test => &mut self.test,
        }
    }

    pub(crate) fn record_cluster(&mut self, split: Split, images: usize) {
        self.total_clusters += 1;
        self.total_images += images;
        let entry = self.split_mut(split);
        entry.clusters += 1;
        entry.images += images;
    }

    pub(crate) fn record_exports(&mut self, split: Split, outcomes: &[ExportOutcome]) {
        let exported = outcomes.iter().filter(|o| o.is_exported()).count();
        self.split_mut(split).exported_frames += exported;
        self.skipped_frames += outcomes.len() - exported;
    }

    /// True when no capture survived clustering and filtering.
    pub fn is_empty(&self) -> bool {
        self.total_clusters == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No images found to cluster.");
        }

        writeln!(f, "Total Clusters: {}", self.total_clusters)?;
        writeln!(f, "Total Images:   {}", self.total_images)?;
        writeln!(f, "{}", "-".repeat(50))?;

        for split in Split::ALL {
            let entry = self.split(split);
            let percent = entry.clusters as f64 / self.total_clusters as f64 * 100.0;
            let label = format!("{}:", capitalize(split.as_str()));
            writeln!(
                f,
                "{:<6} {:>3} clusters ({:.1}%), {:>4} images",
                label, entry.clusters, percent, entry.images
            )?;
        }

        if self.dry_run {
            writeln!(f, "Dry run: nothing exported.")?;
            return Ok(());
        }

        writeln!(
            f,
            "Exported frames: train={} val={} test={}",
            self.train.exported_frames, self.val.exported_frames, self.test.exported_frames
        )?;
        if self.skipped_frames > 0 {
            writeln!(f, "Skipped frames:  {}", self.skipped_frames)?;
        }
        if let Some(manifest) = &self.manifest {
            writeln!(f, "Manifest: {} ({} classes)", manifest.display(), self.classes)?;
        }

        Ok(())
    }
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
