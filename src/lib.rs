//! # OVERGROWTH
//!
//! Stochastic growth simulation seeded from a photograph.
//!
//! A sparse sample of image pixels is planted on a grid; every tick, empty
//! cells next to occupied ones may be recruited, taking a neighbor's color
//! with an occasional random nudge, until the pattern stops changing.
//!
//! ## Features
//!
//! - **Double-buffered**: each tick reads one generation and writes the other
//! - **Parallel**: per-cell updates spread across all CPU cores via Rayon
//! - **Reproducible**: seeded random number generation end to end
//! - **Configurable**: YAML configuration files
//!
//! ## Quick Start
//!
//! ```rust
//! use overgrowth::{Config, Rgb, SimulationRun, SourceImage, StepEngine};
//!
//! let image = SourceImage::from_fn(64, 48, |x, y| Rgb::new(x as u8 * 4, y as u8 * 5, 128)).unwrap();
//! let mut run = SimulationRun::seed(&image, &Config::default(), 42).unwrap();
//! let engine = StepEngine::default();
//!
//! while !run.is_stable() && run.tick_count() < 500 {
//!     run.tick(&engine).unwrap();
//! }
//!
//! let rgba = run.export_pixels().unwrap();
//! assert_eq!(rgba.len(), 64 * 48 * 4);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use overgrowth::{Config, QualityMode};
//!
//! let mut config = Config::default();
//! config.growth.sample_rate = 0.05;
//! config.growth.held_back_chance = 0.7;
//! config.quality.mode = QualityMode::Reduced;
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod convergence;
pub mod engine;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod quality;
pub mod random_field;
pub mod run;
pub mod scheduler;
pub mod seeder;
pub mod shared;
pub mod stats;

// Re-export main types
pub use config::Config;
pub use convergence::{Convergence, ConvergenceMonitor};
pub use engine::{ExecutionStrategy, StepEngine};
pub use error::{ConfigError, GrowthError};
pub use grid::{Cell, Grid, Rgb};
pub use quality::{DeviceHint, QualityMode, QualityPolicy};
pub use random_field::{HashField, RandomField, TimeMode};
pub use run::{SimulationRun, TickReport};
pub use scheduler::{Scheduler, SchedulerState};
pub use seeder::{seed, SourceImage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark on a synthetic gradient image
pub fn benchmark(
    ticks: u64,
    width: usize,
    height: usize,
    strategy: ExecutionStrategy,
) -> Result<BenchmarkResult, GrowthError> {
    use std::time::Instant;

    let image = SourceImage::from_fn(width, height, |x, y| {
        Rgb::new((x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8)
    })?;
    let mut config = Config::default();
    config.growth.sample_rate = 0.01;
    let mut run = SimulationRun::seed(&image, &config, 42)?;
    let engine = StepEngine::new(strategy);

    let start = Instant::now();
    for _ in 0..ticks {
        run.tick(&engine)?;
    }
    let elapsed = start.elapsed();

    let grid = run.current_grid()?;
    Ok(BenchmarkResult {
        ticks,
        width,
        height,
        strategy,
        final_coverage: grid.coverage(),
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub width: usize,
    pub height: usize,
    pub strategy: ExecutionStrategy,
    pub final_coverage: f32,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Grid: {}x{}", self.width, self.height)?;
        writeln!(f, "Strategy: {:?}", self.strategy)?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        writeln!(f, "Final coverage: {:.1}%", self.final_coverage * 100.0)?;
        Ok(())
    }
}
