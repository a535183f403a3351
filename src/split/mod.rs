//! Seeded train/val/test allocation of whole clusters.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::error::BricksetError;

/// Dataset split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    /// Splits in report order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }

    pub fn is_train(&self) -> bool {
        matches!(self, Split::Train)
    }

    /// Directory name of the split inside `images/` and `labels/`.
    pub fn dir_name(&self, suffix: &str) -> String {
        format!("{}{}", self.as_str(), suffix)
    }

    /// Recovers the split from a directory name such as `val2023`.
    pub fn from_dir_name(name: &str) -> Option<Split> {
        if name.contains("train") {
            Some(Split::Train)
        } else if name.contains("val") {
            Some(Split::Val)
        } else if name.contains("test") {
            Some(Split::Test)
        } else {
            None
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split allocation options.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitOptions {
    pub seed: u64,
    pub val_fraction: f64,
    pub test_fraction: f64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            val_fraction: 0.25,
            test_fraction: 0.25,
        }
    }
}

/// Validate split options before running.
pub fn validate_split_options(opts: &SplitOptions) -> Result<(), BricksetError> {
    for (flag, fraction) in [
        ("--val-fraction", opts.val_fraction),
        ("--test-fraction", opts.test_fraction),
    ] {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(BricksetError::InvalidConfig {
                message: format!("{flag} must be in the interval [0.0, 1.0], got {fraction}"),
            });
        }
    }

    if opts.val_fraction + opts.test_fraction > 1.0 {
        return Err(BricksetError::InvalidConfig {
            message: "--val-fraction and --test-fraction must not sum above 1.0".to_string(),
        });
    }

    Ok(())
}

/// Number of clusters per split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SplitQuotas {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitQuotas {
    /// Floors both evaluation quotas; train takes the remainder.
    pub fn for_total(total: usize, opts: &SplitOptions) -> Self {
        let val = ((total as f64 * opts.val_fraction).floor() as usize).min(total);
        let test = ((total as f64 * opts.test_fraction).floor() as usize).min(total - val);
        Self {
            train: total - val - test,
            val,
            test,
        }
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

/// Shuffles `items` with a Fisher-Yates pass driven by a seeded ChaCha8
/// stream.
///
/// Walking `i` from the end down to 1, a draw `j` in `0..=i` (sampled as
/// `u64`) is swapped into place. ChaCha8 is a fixed, documented algorithm, so
/// a seed maps to the same permutation on every platform and release.
pub fn shuffle_seeded<T>(items: &mut [T], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i as u64) as usize;
        items.swap(i, j);
    }
}

/// Items partitioned into splits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitAssignment<T> {
    pub val: Vec<T>,
    pub test: Vec<T>,
    pub train: Vec<T>,
}

impl<T> SplitAssignment<T> {
    pub fn get(&self, split: Split) -> &[T] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    /// Iterates in allocation order: the val block, then test, then train.
    pub fn iter(&self) -> impl Iterator<Item = (Split, &T)> {
        self.val
            .iter()
            .map(|item| (Split::Val, item))
            .chain(self.test.iter().map(|item| (Split::Test, item)))
            .chain(self.train.iter().map(|item| (Split::Train, item)))
    }

    pub fn len(&self) -> usize {
        self.val.len() + self.test.len() + self.train.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shuffles all items and slices them into val, test and train blocks.
pub fn allocate<T>(mut items: Vec<T>, opts: &SplitOptions) -> SplitAssignment<T> {
    shuffle_seeded(&mut items, opts.seed);
    let quotas = SplitQuotas::for_total(items.len(), opts);

    let train = items.split_off(quotas.val + quotas.test);
    let test = items.split_off(quotas.val);
    SplitAssignment {
        val: items,
        test,
        train,
    }
}
