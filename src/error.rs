//! Configuration errors.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Min and max decibel must differ, otherwise the decibel-to-height ratio divides by zero.
    #[error("decibel range is degenerate: min {min} must be below max {max}")]
    DegenerateDecibelRange { min: f32, max: f32 },

    #[error("height range is invalid: min {min}, max {max}")]
    InvertedHeightRange { min: f32, max: f32 },

    #[error("frequency range {start}..{end} with step {step} yields no bars")]
    EmptyFrequencyRange { start: f32, end: f32, step: f32 },

    #[error("frequency range yields {count} bars, more than {max}")]
    TooManyBins { count: usize, max: usize },

    #[error("screen must have a positive size, got {width}x{height}")]
    InvalidScreen { width: f32, height: f32 },

    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
