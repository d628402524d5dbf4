//! Configuration system for the growth simulation.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::engine::ExecutionStrategy;
use crate::error::{ConfigError, GrowthError};
use crate::kernel::Aggregation;
use crate::quality::QualityMode;
use crate::random_field::TimeMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub growth: GrowthConfig,
    pub quality: QualityConfig,
    pub convergence: ConvergenceConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Seeding and per-tick growth parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Fraction of pixels seeded occupied, in (0, 1]
    pub sample_rate: f32,
    /// Probability an eligible cell stays empty this tick, in [0, 1]
    pub held_back_chance: f32,
    /// Magnitude of color perturbation (1.0 = full channel range)
    pub nudge_strength: f32,
    /// Randomly flip the sign of the nudge
    #[serde(default = "default_true")]
    pub signed_nudge: bool,
    /// How neighbor colors combine into the candidate color
    #[serde(default)]
    pub aggregation: Aggregation,
    /// How the random field's time input advances
    #[serde(default)]
    pub time_mode: TimeMode,
}

/// Resolution selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    pub mode: QualityMode,
    /// Cap on the larger grid dimension in reduced mode
    pub max_dimension: usize,
}

/// Stability detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    /// Compare every Nth cell in raster order
    pub sample_stride: usize,
    /// Alpha difference above which a sampled cell counts as changed
    pub change_threshold: f32,
    /// Consecutive unchanged ticks before the run is stable
    pub stability_threshold: u32,
}

/// Tick cadence and execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Target ticks per second
    pub tick_rate: f32,
    pub strategy: ExecutionStrategy,
    /// Ticks between published snapshots
    pub snapshot_interval: u32,
}

/// Logging and statistics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Ticks between stats records
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            growth: GrowthConfig::default(),
            quality: QualityConfig::default(),
            convergence: ConvergenceConfig::default(),
            scheduler: SchedulerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 0.25,
            held_back_chance: 0.5,
            nudge_strength: 0.02,
            signed_nudge: true,
            aggregation: Aggregation::default(),
            time_mode: TimeMode::default(),
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            mode: QualityMode::Full,
            max_dimension: 512,
        }
    }
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            sample_stride: 16,
            change_threshold: 0.01,
            stability_threshold: 100,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            strategy: ExecutionStrategy::Parallel,
            snapshot_interval: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 50,
            log_level: "info".to_string(),
        }
    }
}

impl GrowthConfig {
    /// Validate the per-run growth parameters
    pub fn validate(&self) -> Result<(), GrowthError> {
        if !(self.sample_rate > 0.0 && self.sample_rate <= 1.0) {
            return Err(GrowthError::InvalidConfig(format!(
                "sample_rate must be in (0, 1], got {}",
                self.sample_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.held_back_chance) {
            return Err(GrowthError::InvalidConfig(format!(
                "held_back_chance must be in [0, 1], got {}",
                self.held_back_chance
            )));
        }
        if !(self.nudge_strength.is_finite() && self.nudge_strength >= 0.0) {
            return Err(GrowthError::InvalidConfig(format!(
                "nudge_strength must be >= 0, got {}",
                self.nudge_strength
            )));
        }
        Ok(())
    }
}

impl SchedulerConfig {
    /// Time between ticks at `tick_rate`
    pub fn tick_interval(&self) -> Result<Duration, GrowthError> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(GrowthError::InvalidConfig(format!(
                "tick_rate must be > 0, got {}",
                self.tick_rate
            )));
        }
        Duration::try_from_secs_f64(1.0 / self.tick_rate as f64).map_err(|_| {
            GrowthError::InvalidConfig(format!(
                "tick_rate {} gives an unrepresentable tick interval",
                self.tick_rate
            ))
        })
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), GrowthError> {
        self.growth.validate()?;
        if self.quality.max_dimension == 0 {
            return Err(GrowthError::InvalidConfig(
                "max_dimension must be > 0".to_string(),
            ));
        }
        if self.convergence.sample_stride == 0 {
            return Err(GrowthError::InvalidConfig(
                "sample_stride must be > 0".to_string(),
            ));
        }
        if self.convergence.stability_threshold == 0 {
            return Err(GrowthError::InvalidConfig(
                "stability_threshold must be > 0".to_string(),
            ));
        }
        if !(self.convergence.change_threshold >= 0.0) {
            return Err(GrowthError::InvalidConfig(
                "change_threshold must be >= 0".to_string(),
            ));
        }
        self.scheduler.tick_interval()?;
        Ok(())
    }
}
