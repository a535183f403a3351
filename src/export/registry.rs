//! Per-run class ids and per-split export counts.

use std::collections::HashMap;

use serde::Serialize;

use crate::label::ClassId;
use crate::split::Split;

/// Assigns class ids in first-seen order.
///
/// Ids are never reassigned; the registry lives exactly as long as the
/// exporter that owns it.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    names: Vec<String>,
    ids: HashMap<String, ClassId>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `class_name`, assigning the next one if unseen.
    pub fn register(&mut self, class_name: &str) -> ClassId {
        if let Some(id) = self.ids.get(class_name) {
            return *id;
        }
        let id = ClassId::new(self.names.len());
        self.names.push(class_name.to_string());
        self.ids.insert(class_name.to_string(), id);
        id
    }

    pub fn get(&self, class_name: &str) -> Option<ClassId> {
        self.ids.get(class_name).copied()
    }

    /// Class names in id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Exported frame counts of one class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitCounts {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitCounts {
    pub fn get(&self, split: Split) -> usize {
        match split {
            Split::Train => self.train,
            Split::Val => self.val,
            Split::Test => self.test,
        }
    }

    fn slot(&mut self, split: Split) -> &mut usize {
        match split {
            Split::Train => &mut self.train,
            Split::Val => &mut self.val,
            Split::Test => &mut self.test,
        }
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

/// Exported frame counts per class and split.
#[derive(Clone, Debug, Default)]
pub struct ExportCounters {
    counts: HashMap<String, SplitCounts>,
}

impl ExportCounters {
    pub fn increment(&mut self, class_name: &str, split: Split) {
        *self
            .counts
            .entry(class_name.to_string())
            .or_default()
            .slot(split) += 1;
    }

    /// Counts for a class; zero for classes never exported.
    pub fn get(&self, class_name: &str) -> SplitCounts {
        self.counts.get(class_name).copied().unwrap_or_default()
    }

    /// Frames exported to `split` across all classes.
    pub fn split_total(&self, split: Split) -> usize {
        self.counts.values().map(|counts| counts.get(split)).sum()
    }
}
