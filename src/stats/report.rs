//! Box statistics report types and terminal formatting.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::BoxField;

/// Statistics of every analyzed field.
#[derive(Clone, Debug, Serialize)]
pub struct BoxStatsReport {
    /// Captures scanned, including ones without box markers.
    pub captures: usize,
    pub fields: Vec<FieldReport>,
}

/// Distribution and outliers of one field.
#[derive(Clone, Debug, Serialize)]
pub struct FieldReport {
    pub field: BoxField,
    /// Captures carrying the field.
    pub total: usize,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub percentiles: Vec<PercentileValue>,
    pub low_percentile: u8,
    pub low_bound: Option<u32>,
    pub high_percentile: u8,
    pub high_bound: Option<u32>,
    /// Values below the low bound, smallest first.
    pub low_outliers: Vec<BoxOutlier>,
    /// Values above the high bound, largest first.
    pub high_outliers: Vec<BoxOutlier>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PercentileValue {
    pub percentile: u8,
    pub value: u32,
}

/// A capture whose field value lies outside the bounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BoxOutlier {
    pub value: u32,
    pub path: PathBuf,
}

impl fmt::Display for BoxStatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Box statistics over {} captures", self.captures)?;
        for field in &self.fields {
            writeln!(f)?;
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

impl fmt::Display for FieldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            return writeln!(f, "{}: no values", self.field.as_str());
        };
        writeln!(
            f,
            "{}: {} values, min {min}, max {max}",
            self.field.as_str(),
            self.total
        )?;
        for entry in &self.percentiles {
            writeln!(f, "  p{:<3} {}", entry.percentile, entry.value)?;
        }
        write_outliers(
            f,
            "below",
            self.low_percentile,
            self.low_bound,
            &self.low_outliers,
        )?;
        write_outliers(
            f,
            "above",
            self.high_percentile,
            self.high_bound,
            &self.high_outliers,
        )
    }
}

fn write_outliers(
    f: &mut fmt::Formatter<'_>,
    side: &str,
    percentile: u8,
    bound: Option<u32>,
    outliers: &[BoxOutlier],
) -> fmt::Result {
    let Some(bound) = bound else {
        return Ok(());
    };
    writeln!(
        f,
        "  {} {side} {bound} (p{percentile})",
        outliers.len()
    )?;
    for outlier in outliers {
        writeln!(f, "    {:>5}  {}", outlier.value, outlier.path.display())?;
    }
    Ok(())
}
