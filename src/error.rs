//! Error kinds surfaced by the growth engine.

use thiserror::Error;

/// Errors raised by seeding, stepping and run accessors.
///
/// Every failure is local to a single run; callers recover by reseeding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrowthError {
    /// Grid or source image has a zero dimension, or a pixel buffer whose
    /// length does not match its declared size
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// A configuration value is outside its allowed range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation on a run that cannot serve it (e.g. already disposed)
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

/// Errors raised while loading or saving a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Invalid(#[from] GrowthError),
}
