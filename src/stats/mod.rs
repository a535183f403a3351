//! Box statistics over capture names.
//!
//! The motion detector occasionally draws a box around a shadow, a hand or
//! two touching parts. Such frames show up at the tails of the per-field
//! value distributions, so each field gets a histogram and the captures
//! beyond the chosen percentiles are listed for review.

mod report;

pub use report::{BoxOutlier, BoxStatsReport, FieldReport, PercentileValue};

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::capture::{file_name, parse_marker};
use crate::error::BricksetError;
use crate::scan::{find_class_dirs, list_images};

/// A numeric field of a capture name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxField {
    Width,
    Height,
    Left,
    Right,
    Top,
    Bottom,
}

impl BoxField {
    pub fn marker(&self) -> char {
        match self {
            BoxField::Width => 'w',
            BoxField::Height => 'h',
            BoxField::Left => 'l',
            BoxField::Right => 'r',
            BoxField::Top => 't',
            BoxField::Bottom => 'b',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoxField::Width => "width",
            BoxField::Height => "height",
            BoxField::Left => "left",
            BoxField::Right => "right",
            BoxField::Top => "top",
            BoxField::Bottom => "bottom",
        }
    }
}

/// Percentiles outside of which a field value is an outlier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldBounds {
    pub field: BoxField,
    pub low_percentile: u8,
    pub high_percentile: u8,
}

impl FieldBounds {
    pub const fn new(field: BoxField, low_percentile: u8, high_percentile: u8) -> Self {
        Self {
            field,
            low_percentile,
            high_percentile,
        }
    }
}

/// Options for box statistics.
#[derive(Clone, Debug)]
pub struct BoxStatsOptions {
    /// Fields to analyze, in report order.
    pub fields: Vec<FieldBounds>,
    /// Percentiles listed for every field.
    pub percentiles: Vec<u8>,
    /// Directories never scanned.
    pub exclude: Vec<PathBuf>,
}

impl Default for BoxStatsOptions {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldBounds::new(BoxField::Width, 2, 97),
                FieldBounds::new(BoxField::Height, 2, 95),
                FieldBounds::new(BoxField::Left, 2, 100),
                FieldBounds::new(BoxField::Right, 0, 98),
            ],
            percentiles: vec![1, 2, 5, 10, 20, 50, 80, 90, 95, 98, 99],
            exclude: Vec::new(),
        }
    }
}

/// Value counts of one field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: BTreeMap<u32, usize>,
    total: usize,
}

impl Histogram {
    pub fn record(&mut self, value: u32) {
        *self.counts.entry(value).or_default() += 1;
        self.total += 1;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn min(&self) -> Option<u32> {
        self.counts.keys().next().copied()
    }

    pub fn max(&self) -> Option<u32> {
        self.counts.keys().next_back().copied()
    }

    /// The smallest value whose cumulative count exceeds `p` percent of the
    /// total. `0` maps to the minimum and `100` (or more) to the maximum.
    pub fn percentile(&self, p: u8) -> Option<u32> {
        if p == 0 {
            return self.min();
        }
        if p >= 100 {
            return self.max();
        }
        let mut seen = 0usize;
        for (&value, &count) in &self.counts {
            seen += count;
            if seen * 100 > self.total * usize::from(p) {
                return Some(value);
            }
        }
        self.max()
    }
}

/// Collects the captures under `roots` and reports per-field statistics.
pub fn box_stats(
    roots: &[PathBuf],
    opts: &BoxStatsOptions,
) -> Result<BoxStatsReport, BricksetError> {
    let mut names: Vec<(PathBuf, String)> = Vec::new();
    for root in roots {
        for class_dir in find_class_dirs(root, &opts.exclude)? {
            for path in list_images(&class_dir)? {
                let name = file_name(&path);
                names.push((path, name));
            }
        }
    }
    info!("{} captures", names.len());

    let fields = opts
        .fields
        .iter()
        .map(|bounds| field_report(&names, bounds, &opts.percentiles))
        .collect();

    Ok(BoxStatsReport {
        captures: names.len(),
        fields,
    })
}

fn field_report(
    names: &[(PathBuf, String)],
    bounds: &FieldBounds,
    percentiles: &[u8],
) -> FieldReport {
    let values: Vec<(u32, &PathBuf)> = names
        .iter()
        .filter_map(|(path, name)| {
            parse_marker(name, bounds.field.marker())
                .ok()
                .map(|value| (value, path))
        })
        .collect();

    let mut histogram = Histogram::default();
    for (value, _) in &values {
        histogram.record(*value);
    }

    let low_bound = histogram.percentile(bounds.low_percentile);
    let high_bound = histogram.percentile(bounds.high_percentile);

    let mut low_outliers = Vec::new();
    let mut high_outliers = Vec::new();
    for (value, path) in values {
        let outlier = BoxOutlier {
            value,
            path: path.clone(),
        };
        if low_bound.is_some_and(|low| value < low) {
            low_outliers.push(outlier);
        } else if high_bound.is_some_and(|high| value > high) {
            high_outliers.push(outlier);
        }
    }
    low_outliers.sort_by(|a, b| a.value.cmp(&b.value).then_with(|| a.path.cmp(&b.path)));
    high_outliers.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.path.cmp(&b.path)));

    FieldReport {
        field: bounds.field,
        total: histogram.total(),
        min: histogram.min(),
        max: histogram.max(),
        percentiles: percentiles
            .iter()
            .filter_map(|&percentile| {
                histogram
                    .percentile(percentile)
                    .map(|value| PercentileValue { percentile, value })
            })
            .collect(),
        low_percentile: bounds.low_percentile,
        low_bound,
        high_percentile: bounds.high_percentile,
        high_bound,
        low_outliers,
        high_outliers,
    }
}
