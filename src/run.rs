//! A single simulation run and its public accessors.

use crate::config::Config;
use crate::convergence::{Convergence, ConvergenceMonitor};
use crate::engine::StepEngine;
use crate::error::GrowthError;
use crate::grid::{Cell, Grid, Rgb};
use crate::random_field::{HashField, PhaseClock, RandomField};
use crate::seeder::{self, SourceImage};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Salt separating the phase clock's stream from the seeder's
const CLOCK_SALT: u64 = 0x5EED_C10C_0000_0001;

/// The ping-pong pair
#[derive(Clone, Debug)]
pub(crate) struct Buffers {
    /// Last completed generation, read-only during a pass
    pub(crate) previous: Grid,
    /// Write target during a pass
    pub(crate) next: Grid,
}

impl Buffers {
    #[inline]
    pub(crate) fn swap(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.next);
    }
}

/// Outcome of `SimulationRun::tick`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub phase: u64,
    pub newly_occupied: usize,
    pub convergence: Convergence,
}

/// Owned, disposable state of one seeded simulation
pub struct SimulationRun {
    pub(crate) buffers: Option<Buffers>,
    pub(crate) tick: u64,
    pub(crate) clock: PhaseClock,
    pub(crate) field: Arc<dyn RandomField>,
    pub(crate) config: Config,
    monitor: ConvergenceMonitor,
    seed: u64,
}

impl SimulationRun {
    /// Seed a run from an image (see `seeder::seed`)
    pub fn seed(image: &SourceImage, config: &Config, seed: u64) -> Result<Self, GrowthError> {
        seeder::seed(image, config, seed)
    }

    /// Start a run from an explicit initial generation
    pub fn from_grid(grid: Grid, config: &Config, seed: u64) -> Result<Self, GrowthError> {
        Self::with_field(grid, config, seed, Arc::new(HashField::new(seed)))
    }

    /// Start a run with a caller-supplied random field
    pub fn with_field(
        grid: Grid,
        config: &Config,
        seed: u64,
        field: Arc<dyn RandomField>,
    ) -> Result<Self, GrowthError> {
        config.validate()?;
        let (width, height) = grid.dims();
        let next = Grid::new(width, height)?;
        let clock = PhaseClock::new(
            config.growth.time_mode,
            ChaCha8Rng::seed_from_u64(seed ^ CLOCK_SALT),
        );

        Ok(Self {
            buffers: Some(Buffers {
                previous: grid,
                next,
            }),
            tick: 0,
            clock,
            field,
            config: config.clone(),
            monitor: ConvergenceMonitor::new(&config.convergence),
            seed,
        })
    }

    /// Advance one generation and update stability tracking
    pub fn tick(&mut self, engine: &StepEngine) -> Result<TickReport, GrowthError> {
        let step = engine.step(self)?;
        let convergence = match &self.buffers {
            // After the swap `next` holds the generation before this tick
            Some(buffers) => self.monitor.observe(&buffers.previous, &buffers.next),
            None => self.monitor.observe_missing(),
        };

        Ok(TickReport {
            tick: step.tick,
            phase: step.phase,
            newly_occupied: step.newly_occupied,
            convergence,
        })
    }

    /// The latest fully computed generation
    pub fn current_grid(&self) -> Result<&Grid, GrowthError> {
        self.buffers
            .as_ref()
            .map(|b| &b.previous)
            .ok_or(GrowthError::InvalidState("run has been disposed"))
    }

    /// RGBA8 readback of the current generation
    pub fn export_pixels(&self) -> Result<Vec<u8>, GrowthError> {
        Ok(self.current_grid()?.to_rgba8())
    }

    /// Plant occupied cells into empty positions of the current generation.
    ///
    /// Already occupied positions are left alone. Returns how many cells were
    /// planted; any planted cell resets stability tracking.
    pub fn inject(&mut self, seeds: &[(usize, usize, Rgb)]) -> Result<usize, GrowthError> {
        let buffers = self
            .buffers
            .as_mut()
            .ok_or(GrowthError::InvalidState("run has been disposed"))?;

        let grid = &mut buffers.previous;
        if seeds.iter().any(|&(x, y, _)| grid.get(x, y).is_none()) {
            return Err(GrowthError::InvalidState("injection outside the grid"));
        }

        let mut planted = 0;
        for &(x, y, color) in seeds {
            if grid.get(x, y).is_some_and(|c| !c.occupied) {
                grid.set(x, y, Cell::occupied(color));
                planted += 1;
            }
        }

        if planted > 0 {
            self.monitor.reset();
            log::info!("Injected {} cells at tick {}", planted, self.tick);
        }
        Ok(planted)
    }

    /// Release both buffers; later ticks fail with `InvalidState`
    pub fn dispose(&mut self) {
        if self.buffers.take().is_some() {
            log::debug!("Run disposed at tick {}", self.tick);
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.buffers.is_none()
    }

    pub fn is_stable(&self) -> bool {
        self.buffers.is_some() && self.monitor.is_stable()
    }

    pub fn convergence(&self) -> Convergence {
        self.monitor.status()
    }

    pub fn stable_frames(&self) -> u32 {
        self.monitor.stable_frames()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Configuration snapshot the run was seeded with
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn random_seed(&self) -> u64 {
        self.seed
    }
}

impl std::fmt::Debug for SimulationRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationRun")
            .field("dims", &self.buffers.as_ref().map(|b| b.previous.dims()))
            .field("tick", &self.tick)
            .field("stable_frames", &self.monitor.stable_frames())
            .field("seed", &self.seed)
            .finish()
    }
}
