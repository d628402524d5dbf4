//! Stability detection over successive generations.

use crate::config::ConvergenceConfig;
use crate::grid::Grid;

/// Outcome of observing one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convergence {
    /// A sampled cell changed occupancy; the counter was reset
    Changed,
    /// Nothing sampled changed, but the threshold is not reached yet
    Settling { stable_frames: u32 },
    /// Threshold reached
    Stable,
}

/// Counts consecutive ticks in which sampled occupancy did not change
#[derive(Clone, Debug)]
pub struct ConvergenceMonitor {
    sample_stride: usize,
    change_threshold: f32,
    stability_threshold: u32,
    stable_frames: u32,
}

impl ConvergenceMonitor {
    pub fn new(config: &ConvergenceConfig) -> Self {
        Self {
            sample_stride: config.sample_stride.max(1),
            change_threshold: config.change_threshold,
            stability_threshold: config.stability_threshold,
            stable_frames: 0,
        }
    }

    /// Whether any sampled cell differs between two generations.
    ///
    /// Returns `None` when the generations cannot be compared.
    pub fn sampled_change(&self, current: &Grid, prior: &Grid) -> Option<bool> {
        if current.dims() != prior.dims() {
            return None;
        }
        let changed = current
            .cells()
            .iter()
            .zip(prior.cells())
            .step_by(self.sample_stride)
            .any(|(a, b)| (a.alpha() - b.alpha()).abs() > self.change_threshold);
        Some(changed)
    }

    /// Record the latest generation against the one before it
    pub fn observe(&mut self, current: &Grid, prior: &Grid) -> Convergence {
        match self.sampled_change(current, prior) {
            Some(false) => self.record_unchanged(),
            Some(true) => self.record_changed(),
            None => {
                log::warn!(
                    "Cannot compare generations {:?} and {:?}, treating as changed",
                    current.dims(),
                    prior.dims()
                );
                self.record_changed()
            }
        }
    }

    /// Record a tick whose generations were unavailable
    pub fn observe_missing(&mut self) -> Convergence {
        log::warn!("Generations unavailable, treating as changed");
        self.record_changed()
    }

    fn record_changed(&mut self) -> Convergence {
        self.stable_frames = 0;
        Convergence::Changed
    }

    fn record_unchanged(&mut self) -> Convergence {
        self.stable_frames = self.stable_frames.saturating_add(1);
        if self.stable_frames == self.stability_threshold {
            log::info!("Run stable after {} unchanged ticks", self.stable_frames);
        }
        self.status()
    }

    /// Current status without observing
    pub fn status(&self) -> Convergence {
        if self.is_stable() {
            Convergence::Stable
        } else if self.stable_frames == 0 {
            Convergence::Changed
        } else {
            Convergence::Settling {
                stable_frames: self.stable_frames,
            }
        }
    }

    /// Clear the counter (reseed or injected perturbation)
    pub fn reset(&mut self) {
        self.stable_frames = 0;
    }

    pub fn stable_frames(&self) -> u32 {
        self.stable_frames
    }

    pub fn stability_threshold(&self) -> u32 {
        self.stability_threshold
    }

    pub fn is_stable(&self) -> bool {
        self.stable_frames >= self.stability_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, Rgb};

    fn monitor(stride: usize, threshold: u32) -> ConvergenceMonitor {
        ConvergenceMonitor::new(&ConvergenceConfig {
            sample_stride: stride,
            change_threshold: 0.01,
            stability_threshold: threshold,
        })
    }

    #[test]
    fn test_counts_to_stable() {
        let mut m = monitor(1, 3);
        let grid = Grid::new(4, 4).unwrap();

        assert_eq!(m.observe(&grid, &grid), Convergence::Settling { stable_frames: 1 });
        assert_eq!(m.observe(&grid, &grid), Convergence::Settling { stable_frames: 2 });
        assert_eq!(m.observe(&grid, &grid), Convergence::Stable);
        assert!(m.is_stable());
        assert_eq!(m.observe(&grid, &grid), Convergence::Stable);
    }

    #[test]
    fn test_change_resets_counter() {
        let mut m = monitor(1, 5);
        let before = Grid::new(4, 4).unwrap();
        let mut after = before.clone();
        after.set(2, 1, Cell::occupied(Rgb::BLACK));

        m.observe(&before, &before);
        m.observe(&before, &before);
        assert_eq!(m.stable_frames(), 2);

        assert_eq!(m.observe(&after, &before), Convergence::Changed);
        assert_eq!(m.stable_frames(), 0);
    }

    #[test]
    fn test_color_only_change_ignored() {
        let mut m = monitor(1, 5);
        let mut before = Grid::new(2, 2).unwrap();
        before.set(0, 0, Cell::occupied(Rgb::new(1, 1, 1)));
        let mut after = before.clone();
        after.set(0, 0, Cell::occupied(Rgb::new(200, 1, 1)));

        assert_eq!(m.sampled_change(&after, &before), Some(false));
    }

    #[test]
    fn test_stride_skips_unsampled_cells() {
        let m = monitor(4, 5);
        let before = Grid::new(4, 2).unwrap();

        // Index 1 is not sampled with stride 4
        let mut after = before.clone();
        after.set(1, 0, Cell::occupied(Rgb::BLACK));
        assert_eq!(m.sampled_change(&after, &before), Some(false));

        // Index 4 is sampled
        let mut after = before.clone();
        after.set(0, 1, Cell::occupied(Rgb::BLACK));
        assert_eq!(m.sampled_change(&after, &before), Some(true));
    }

    #[test]
    fn test_mismatch_degrades_to_changed() {
        let mut m = monitor(1, 2);
        let a = Grid::new(4, 4).unwrap();
        let b = Grid::new(4, 5).unwrap();

        m.observe(&a, &a);
        assert_eq!(m.observe(&a, &b), Convergence::Changed);
        assert_eq!(m.stable_frames(), 0);
        assert_eq!(m.observe_missing(), Convergence::Changed);
    }

    #[test]
    fn test_reset() {
        let mut m = monitor(1, 1);
        let grid = Grid::new(1, 1).unwrap();
        assert_eq!(m.observe(&grid, &grid), Convergence::Stable);

        m.reset();
        assert!(!m.is_stable());
        assert_eq!(m.status(), Convergence::Changed);
    }
}
