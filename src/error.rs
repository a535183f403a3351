use std::path::PathBuf;
use thiserror::Error;

/// The main error type for brickset operations.
#[derive(Debug, Error)]
pub enum BricksetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse capture file name '{name}': {message}")]
    FilenameParse { name: String, message: String },

    #[error(
        "Image {path} is {width}x{height}; expected a {expected_width}x{expected_height} capture"
    )]
    ResolutionMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to traverse {path}: {message}")]
    Traverse { path: PathBuf, message: String },

    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse label line in {path}: {message}")]
    LabelParse { path: PathBuf, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to serialize run report: {source}")]
    ReportWrite {
        #[source]
        source: serde_json::Error,
    },
}

impl BricksetError {
    /// Returns true for per-file problems that the pipeline skips over.
    pub fn is_skippable(&self) -> bool {
        matches!(self, BricksetError::FilenameParse { .. })
    }
}
