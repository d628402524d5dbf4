//! Double-buffered generation stepping.

use crate::error::GrowthError;
use crate::grid::{Cell, Grid};
use crate::kernel::{self, KernelParams};
use crate::random_field::RandomField;
use crate::run::SimulationRun;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How the per-cell pass is executed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStrategy {
    Sequential,
    /// Rows distributed across the rayon pool
    #[default]
    Parallel,
}

/// Result of one pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepReport {
    /// Tick count after the step
    pub tick: u64,
    /// Time phase fed to the random field
    pub phase: u64,
    /// Cells that became occupied during the pass
    pub newly_occupied: usize,
}

/// Applies the kernel to every cell and swaps buffers
#[derive(Clone, Copy, Debug, Default)]
pub struct StepEngine {
    strategy: ExecutionStrategy,
}

impl StepEngine {
    pub fn new(strategy: ExecutionStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Advance a run by one generation.
    ///
    /// After the pass `previous` holds the new generation and `next` holds the
    /// one it was computed from.
    pub fn step(&self, run: &mut SimulationRun) -> Result<StepReport, GrowthError> {
        let Some(buffers) = run.buffers.as_mut() else {
            return Err(GrowthError::InvalidState("run has been disposed"));
        };

        let phase = run.clock.advance(run.tick);
        let params = KernelParams::from(&run.config.growth);
        let newly_occupied = self.fill(
            &buffers.previous,
            &mut buffers.next,
            phase,
            run.field.as_ref(),
            &params,
        );

        buffers.swap();
        run.tick += 1;

        log::debug!(
            "Tick {} (phase {:#x}): {} newly occupied",
            run.tick,
            phase,
            newly_occupied
        );

        Ok(StepReport {
            tick: run.tick,
            phase,
            newly_occupied,
        })
    }

    /// Compute every cell of `next` from `previous`; returns the number of
    /// cells that became occupied
    pub fn fill(
        &self,
        previous: &Grid,
        next: &mut Grid,
        phase: u64,
        field: &dyn RandomField,
        params: &KernelParams,
    ) -> usize {
        debug_assert_eq!(previous.dims(), next.dims());
        let width = previous.width();

        match self.strategy {
            ExecutionStrategy::Sequential => next
                .cells_mut()
                .chunks_mut(width)
                .enumerate()
                .map(|(y, row)| fill_row(previous, row, y, phase, field, params))
                .sum(),
            ExecutionStrategy::Parallel => next
                .cells_mut()
                .par_chunks_mut(width)
                .enumerate()
                .map(|(y, row)| fill_row(previous, row, y, phase, field, params))
                .sum(),
        }
    }
}

fn fill_row(
    previous: &Grid,
    row: &mut [Cell],
    y: usize,
    phase: u64,
    field: &dyn RandomField,
    params: &KernelParams,
) -> usize {
    let mut newly_occupied = 0;
    for (x, out) in row.iter_mut().enumerate() {
        let cell = kernel::next_cell(previous, x, y, phase, field, params);
        if cell.occupied && previous.get(x, y).is_some_and(|c| !c.occupied) {
            newly_occupied += 1;
        }
        *out = cell;
    }
    newly_occupied
}
