//! Tick cadence and run lifecycle.

use crate::config::Config;
use crate::convergence::Convergence;
use crate::engine::StepEngine;
use crate::error::GrowthError;
use crate::grid::{Grid, Rgb};
use crate::quality::QualityMode;
use crate::run::{SimulationRun, TickReport};
use crate::seeder::SourceImage;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    /// Not ticking; a stopped run's last generation stays available for
    /// display
    #[default]
    Idle,
    /// Ticking at the target cadence
    Running,
    /// Ticking suspended, last generation retained for display
    Stable,
}

/// Owns the current run and decides when it ticks
pub struct Scheduler {
    config: Config,
    engine: StepEngine,
    tick_interval: Duration,
    source: Option<SourceImage>,
    run: Option<SimulationRun>,
    state: SchedulerState,
    last_tick: Option<Instant>,
    stop_requested: bool,
    seed_rng: ChaCha8Rng,
}

impl Scheduler {
    /// Create a scheduler with a random seed stream
    pub fn new(config: Config) -> Result<Self, GrowthError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a scheduler whose runs are seeded reproducibly
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, GrowthError> {
        config.validate()?;
        Ok(Self {
            engine: StepEngine::new(config.scheduler.strategy),
            tick_interval: config.scheduler.tick_interval()?,
            config,
            source: None,
            run: None,
            state: SchedulerState::Idle,
            last_tick: None,
            stop_requested: false,
            seed_rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Seed a new run from an image, discarding any current run
    pub fn seed(&mut self, image: SourceImage) -> Result<(), GrowthError> {
        self.source = Some(image);
        self.reseed()
    }

    /// Change the sample rate and reseed from the retained image
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<(), GrowthError> {
        let mut config = self.config.clone();
        config.growth.sample_rate = sample_rate;
        self.apply_config(config)
    }

    /// Change the quality mode and reseed from the retained image
    pub fn set_quality(&mut self, mode: QualityMode) -> Result<(), GrowthError> {
        let mut config = self.config.clone();
        config.quality.mode = mode;
        self.apply_config(config)
    }

    /// Reseed the retained image with the current configuration
    pub fn reset(&mut self) -> Result<(), GrowthError> {
        self.reseed()
    }

    fn apply_config(&mut self, config: Config) -> Result<(), GrowthError> {
        if let Err(e) = config.validate() {
            self.discard();
            return Err(e);
        }
        self.config = config;
        if self.source.is_some() {
            self.reseed()
        } else {
            Ok(())
        }
    }

    fn reseed(&mut self) -> Result<(), GrowthError> {
        self.discard();
        let image = self
            .source
            .as_ref()
            .ok_or(GrowthError::InvalidState("no source image"))?;

        let seed = self.seed_rng.gen();
        let run = SimulationRun::seed(image, &self.config, seed)?;
        self.run = Some(run);
        self.state = SchedulerState::Running;
        self.last_tick = None;
        self.stop_requested = false;
        Ok(())
    }

    fn discard(&mut self) {
        if let Some(mut run) = self.run.take() {
            run.dispose();
        }
        self.state = SchedulerState::Idle;
        self.last_tick = None;
    }

    /// Ask for ticking to stop; honored before the next scheduled tick.
    ///
    /// The last generation is kept for display until the next reseed.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Plant occupied cells into the current run, resuming a stable run
    pub fn inject(&mut self, seeds: &[(usize, usize, Rgb)]) -> Result<usize, GrowthError> {
        if self.state == SchedulerState::Idle {
            return Err(GrowthError::InvalidState("no active run"));
        }
        let run = self
            .run
            .as_mut()
            .ok_or(GrowthError::InvalidState("no active run"))?;
        let planted = run.inject(seeds)?;
        if planted > 0 && self.state == SchedulerState::Stable {
            self.state = SchedulerState::Running;
        }
        Ok(planted)
    }

    /// Time left before the next tick is due; `None` when not running
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        if self.state != SchedulerState::Running || self.stop_requested {
            return None;
        }
        match self.last_tick {
            None => Some(Duration::ZERO),
            Some(last) => Some(self.tick_interval.saturating_sub(now.saturating_duration_since(last))),
        }
    }

    /// Tick if one is due at `now`
    pub fn poll(&mut self, now: Instant) -> Result<Option<TickReport>, GrowthError> {
        if self.stop_requested {
            self.stop_requested = false;
            if self.run.is_some() {
                log::info!("Stopping run at tick {}", self.tick_count());
            }
            self.state = SchedulerState::Idle;
            self.last_tick = None;
            return Ok(None);
        }

        match self.time_until_due(now) {
            Some(wait) if wait.is_zero() => {}
            _ => return Ok(None),
        }

        self.last_tick = Some(now);
        self.tick_now().map(Some)
    }

    /// Tick immediately regardless of cadence or stability
    pub fn tick_now(&mut self) -> Result<TickReport, GrowthError> {
        if self.state == SchedulerState::Idle {
            return Err(GrowthError::InvalidState("no active run"));
        }
        let run = self
            .run
            .as_mut()
            .ok_or(GrowthError::InvalidState("no active run"))?;

        let report = match run.tick(&self.engine) {
            Ok(report) => report,
            Err(e) => {
                log::error!("Tick failed, discarding run: {}", e);
                self.discard();
                return Err(e);
            }
        };

        if report.convergence == Convergence::Stable && self.state == SchedulerState::Running {
            log::info!("Run stable at tick {}, suspending", report.tick);
            self.state = SchedulerState::Stable;
        }
        Ok(report)
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn run(&self) -> Option<&SimulationRun> {
        self.run.as_ref()
    }

    /// Generation to display, if a run exists
    pub fn current_grid(&self) -> Option<&Grid> {
        self.run.as_ref().and_then(|r| r.current_grid().ok())
    }

    pub fn tick_count(&self) -> u64 {
        self.run.as_ref().map_or(0, |r| r.tick_count())
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }
}
