//! Immutable views of simulation state handed to render threads.

use std::sync::Arc;

use crate::grid::Grid;
use crate::scheduler::{Scheduler, SchedulerState};
use crate::stats::GrowthStats;

/// A fully swapped generation plus lifecycle info
#[derive(Clone, Debug)]
pub struct GrowthSnapshot {
    /// Current generation, `None` while idle
    pub grid: Option<Arc<Grid>>,
    pub tick: u64,
    pub state: SchedulerState,
    pub stable_frames: u32,
    pub stats: GrowthStats,
}

impl GrowthSnapshot {
    /// Capture the scheduler's current state
    pub fn from_scheduler(scheduler: &Scheduler) -> Self {
        match scheduler.run() {
            Some(run) => Self {
                grid: run.current_grid().ok().map(|g| Arc::new(g.clone())),
                tick: run.tick_count(),
                state: scheduler.state(),
                stable_frames: run.stable_frames(),
                stats: GrowthStats::from_run(run, None),
            },
            None => Self {
                grid: None,
                tick: 0,
                state: scheduler.state(),
                stable_frames: 0,
                stats: GrowthStats::new(),
            },
        }
    }

    /// RGBA8 readback of the snapshot's generation
    pub fn export_pixels(&self) -> Option<Vec<u8>> {
        self.grid.as_ref().map(|g| g.to_rgba8())
    }

    pub fn is_stable(&self) -> bool {
        self.state == SchedulerState::Stable
    }
}
