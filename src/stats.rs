//! Statistics tracking for the simulation.

use crate::grid::Grid;
use crate::run::{SimulationRun, TickReport};
use serde::{Deserialize, Serialize};

/// Statistics snapshot for a tick
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthStats {
    /// Tick count
    pub tick: u64,
    /// Grid width
    pub width: usize,
    /// Grid height
    pub height: usize,
    /// Occupied cells
    pub occupied: usize,
    /// Occupied fraction (0.0 - 1.0)
    pub coverage: f32,
    /// Empty cells adjacent to an occupied cell
    pub front_size: usize,
    /// Cells occupied during the last tick
    pub newly_occupied: usize,
    /// Consecutive unchanged ticks
    pub stable_frames: u32,
    /// Whether the run has reached stability
    pub stable: bool,
}

impl GrowthStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure a grid
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            occupied: grid.occupied_count(),
            coverage: grid.coverage(),
            front_size: grid.front_size(),
            ..Self::default()
        }
    }

    /// Measure a run, optionally folding in the last tick's report
    pub fn from_run(run: &SimulationRun, report: Option<&TickReport>) -> Self {
        let mut stats = run
            .current_grid()
            .map(Self::from_grid)
            .unwrap_or_default();
        stats.tick = run.tick_count();
        stats.stable_frames = run.stable_frames();
        stats.stable = run.is_stable();
        stats.newly_occupied = report.map_or(0, |r| r.newly_occupied);
        stats
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:>6} | Grid:{}x{} | Occupied:{:>8} ({:>5.1}%) | Front:{:>7} | New:{:>6} | Stable:{}{}",
            self.tick,
            self.width,
            self.height,
            self.occupied,
            self.coverage * 100.0,
            self.front_size,
            self.newly_occupied,
            self.stable_frames,
            if self.stable { " [STABLE]" } else { "" }
        )
    }
}

/// Sampled history of stats over a run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// Ticks between records
    pub interval: u64,
    pub snapshots: Vec<GrowthStats>,
}

impl StatsHistory {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            snapshots: Vec::new(),
        }
    }

    /// Record when the tick falls on the interval; returns whether it did
    pub fn maybe_record(&mut self, stats: &GrowthStats) -> bool {
        if stats.tick % self.interval == 0 {
            self.snapshots.push(stats.clone());
            true
        } else {
            false
        }
    }

    /// Record unconditionally (e.g. the final tick)
    pub fn record(&mut self, stats: GrowthStats) {
        if self.snapshots.last().map(|s| s.tick) != Some(stats.tick) {
            self.snapshots.push(stats);
        }
    }

    pub fn coverage_series(&self) -> Vec<(u64, f32)> {
        self.snapshots.iter().map(|s| (s.tick, s.coverage)).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Save history to a JSON file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
    }
}
