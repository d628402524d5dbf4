//! Cell grid: the simulation's data model.

use crate::error::GrowthError;
use serde::{Deserialize, Serialize};

/// Neighbor offsets `(dx, dy)` in visiting order: dx outer, dy inner,
/// center excluded.
pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// 8-bit RGB color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb([r, g, b])
    }

    /// Add a per-channel offset in normalized units (1.0 = 255) and clamp
    pub fn nudged(self, delta: [f32; 3]) -> Self {
        let mut out = [0u8; 3];
        for (i, channel) in out.iter_mut().enumerate() {
            let value = self.0[i] as f32 + delta[i] * 255.0;
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    }

    /// Multiply every channel by `factor` and clamp
    pub fn scaled(self, factor: f32) -> Self {
        let mut out = [0u8; 3];
        for (i, channel) in out.iter_mut().enumerate() {
            *channel = (self.0[i] as f32 * factor).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    }
}

/// State of one grid position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub color: Rgb,
    pub occupied: bool,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        color: Rgb::BLACK,
        occupied: false,
    };

    /// An occupied cell with the given color
    #[inline]
    pub fn occupied(color: Rgb) -> Self {
        Self {
            color,
            occupied: true,
        }
    }

    /// Occupancy as an alpha value
    #[inline]
    pub fn alpha(&self) -> f32 {
        if self.occupied {
            1.0
        } else {
            0.0
        }
    }
}

/// Fixed-size row-major grid of cells
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

/// Number of cells in a `width x height` raster, rejecting zero sides and
/// overflow
pub(crate) fn cell_count(width: usize, height: usize) -> Result<usize, GrowthError> {
    match width.checked_mul(height) {
        Some(count) if count > 0 => Ok(count),
        _ => Err(GrowthError::InvalidDimensions { width, height }),
    }
}

impl Grid {
    /// Create an empty grid
    pub fn new(width: usize, height: usize) -> Result<Self, GrowthError> {
        let count = cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::EMPTY; count],
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Get the cell at a position, `None` outside the grid
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Get the cell at signed coordinates, `None` outside the grid
    #[inline]
    pub fn get_signed(&self, x: i64, y: i64) -> Option<&Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get(x as usize, y as usize)
    }

    /// Set the cell at a position; returns false outside the grid
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) -> bool {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.cells[idx] = cell;
            true
        } else {
            false
        }
    }

    /// All cells in raster order
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Occupied neighbors of `(x, y)` in visiting order
    pub fn occupied_neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = &Cell> + '_ {
        let (cx, cy) = (x as i64, y as i64);
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(move |&(dx, dy)| self.get_signed(cx + dx, cy + dy))
            .filter(|cell| cell.occupied)
    }

    /// Whether `(x, y)` is empty and touches an occupied cell
    pub fn is_front(&self, x: usize, y: usize) -> bool {
        match self.get(x, y) {
            Some(cell) if !cell.occupied => self.occupied_neighbors(x, y).next().is_some(),
            _ => false,
        }
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.occupied).count()
    }

    /// Number of growth-front cells
    pub fn front_size(&self) -> usize {
        let mut count = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_front(x, y) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Fraction of occupied cells (0.0 - 1.0)
    pub fn coverage(&self) -> f32 {
        self.occupied_count() as f32 / self.cells.len() as f32
    }

    /// Overwrite every cell with empty
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Flatten into RGBA8, unoccupied cells transparent black
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.cells.len() * 4);
        for cell in &self.cells {
            if cell.occupied {
                rgba.extend_from_slice(&cell.color.0);
                rgba.push(255);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
        rgba
    }
}
