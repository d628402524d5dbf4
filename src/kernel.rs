//! Per-cell update rule.
//!
//! `next_cell` reads only from the previous generation, so it can be applied
//! to every cell of a tick independently.

use crate::config::GrowthConfig;
use crate::grid::{Cell, Grid, Rgb};
use crate::random_field::{stream, RandomField};
use serde::{Deserialize, Serialize};

/// How occupied neighbor colors combine into a candidate color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Color of the last occupied neighbor in visiting order
    #[default]
    LastWins,
    /// Mean neighbor color, brightened by neighbor count
    Average,
}

/// Growth parameters used by the kernel
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelParams {
    pub held_back_chance: f32,
    pub nudge_strength: f32,
    pub signed_nudge: bool,
    pub aggregation: Aggregation,
}

impl From<&GrowthConfig> for KernelParams {
    fn from(config: &GrowthConfig) -> Self {
        Self {
            held_back_chance: config.held_back_chance,
            nudge_strength: config.nudge_strength,
            signed_nudge: config.signed_nudge,
            aggregation: config.aggregation,
        }
    }
}

impl KernelParams {
    /// Activation draw at or above which the cell becomes occupied
    #[inline]
    pub fn occupy_threshold(&self) -> f32 {
        self.held_back_chance
    }

    /// Activation draw at or above which the color is nudged; the top
    /// quarter of the activation band `[held_back_chance, 1)`
    #[inline]
    pub fn nudge_threshold(&self) -> f32 {
        1.0 - (1.0 - self.held_back_chance) / 4.0
    }
}

// Stream indices keep the nudge draws independent from the activation draw
const STREAM_RED: u64 = 1;
const STREAM_GREEN: u64 = 2;
const STREAM_BLUE: u64 = 3;
const STREAM_SIGN: u64 = 4;

/// Candidate color from the occupied neighbors of `(x, y)`, if any
pub fn candidate_color(previous: &Grid, x: usize, y: usize, aggregation: Aggregation) -> Option<Rgb> {
    match aggregation {
        Aggregation::LastWins => previous.occupied_neighbors(x, y).last().map(|c| c.color),
        Aggregation::Average => {
            let mut sum = [0u32; 3];
            let mut count = 0u32;
            for cell in previous.occupied_neighbors(x, y) {
                for (acc, &channel) in sum.iter_mut().zip(cell.color.0.iter()) {
                    *acc += channel as u32;
                }
                count += 1;
            }
            if count == 0 {
                return None;
            }
            let mean = Rgb([
                (sum[0] / count) as u8,
                (sum[1] / count) as u8,
                (sum[2] / count) as u8,
            ]);
            Some(mean.scaled(0.8 + 0.2 * count as f32 / 8.0))
        }
    }
}

/// Color perturbation for a newly activated cell
pub fn nudge(field: &dyn RandomField, x: usize, y: usize, t: u64, params: &KernelParams) -> [f32; 3] {
    let (x, y) = (x as i64, y as i64);
    let strength = params.nudge_strength;
    let mut delta = [
        field.sample(x + 1, y, stream(t, STREAM_RED)) * strength,
        field.sample(x, y + 1, stream(t, STREAM_GREEN)) * strength,
        field.sample(x + 1, y + 1, stream(t, STREAM_BLUE)) * strength,
    ];
    if params.signed_nudge && field.sample(x - 1, y - 1, stream(t, STREAM_SIGN)) < 0.5 {
        for d in &mut delta {
            *d = -*d;
        }
    }
    delta
}

/// Next state of `(x, y)` given the previous generation and tick phase `t`
pub fn next_cell(
    previous: &Grid,
    x: usize,
    y: usize,
    t: u64,
    field: &dyn RandomField,
    params: &KernelParams,
) -> Cell {
    let current = match previous.get(x, y) {
        Some(cell) => *cell,
        None => return Cell::EMPTY,
    };
    if current.occupied {
        return current;
    }

    let Some(candidate) = candidate_color(previous, x, y, params.aggregation) else {
        return current;
    };

    let rnd = field.sample(x as i64, y as i64, t);
    if rnd < params.occupy_threshold() {
        return current;
    }

    let color = if rnd >= params.nudge_threshold() {
        candidate.nudged(nudge(field, x, y, t, params))
    } else {
        candidate
    };
    Cell::occupied(color)
}
