#![allow(dead_code)]

use std::path::PathBuf;

use brickset::capture::SourceImage;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Capture path `ms` milliseconds after 2023-05-23 10:00:00.000.
pub fn capture_path(ms: u64, tag: u8) -> PathBuf {
    let hour = 10 + ms / 3_600_000;
    let minute = (ms / 60_000) % 60;
    let second = (ms / 1000) % 60;
    let milli = ms % 1000;
    PathBuf::from("class").join(format!(
        "20230523_{hour:02}{minute:02}{second:02}{milli:03}_f{tag}_l1_r2_t3_b4.jpg"
    ))
}

/// Captures spread over ten minutes, with frequent near-duplicates so both
/// short and long gaps show up.
pub fn arb_captures(max_len: usize) -> BoxedStrategy<Vec<SourceImage>> {
    proptest::collection::vec(
        (
            prop_oneof![0u64..600_000, 0u64..2_000],
            0u8..3,
        ),
        0..=max_len,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(ms, tag)| SourceImage::from_path(&capture_path(ms, tag)).expect("valid name"))
            .collect()
    })
    .boxed()
}

/// Gap thresholds in whole milliseconds, including zero.
pub fn arb_gap_seconds() -> BoxedStrategy<f64> {
    (0u32..=3_000)
        .prop_map(|ms| f64::from(ms) / 1000.0)
        .boxed()
}
