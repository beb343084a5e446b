use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong with a single file. None of these stop the
/// batch; the driver turns each into a terminal state for that file.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("no converter registered for extension '.{0}'")]
    UnregisteredFormat(String),

    #[error(
        "not enough disk space on '{volume}': need {required} bytes, {available} bytes available"
    )]
    InsufficientDiskSpace {
        volume: PathBuf,
        required: u64,
        available: u64,
    },

    #[error("could not probe the duration of '{path}': {reason}")]
    ProbeFailure { path: PathBuf, reason: String },

    #[error("{converter} failed on '{path}': {reason}")]
    ExecutorFailure {
        converter: String,
        path: PathBuf,
        reason: String,
    },

    #[error("duration mismatch: target {target_secs}s, source {source_secs}s")]
    DurationMismatch { source_secs: u64, target_secs: u64 },

    #[error("target file '{0}' not found after conversion")]
    MissingTargetAfterConversion(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("disk_space_margin must be a finite number >= 1.0, got {0}")]
    InvalidMargin(f64),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
