//! Initial grid generation from a source image.

use crate::config::Config;
use crate::error::GrowthError;
use crate::grid::{cell_count, Cell, Grid, Rgb};
use crate::quality::{QualityMode, QualityPolicy};
use crate::run::SimulationRun;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Decoded source pixels handed over by the image collaborator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl SourceImage {
    /// Build from packed RGB8 bytes (row-major, 3 bytes per pixel)
    pub fn from_rgb8(width: usize, height: usize, bytes: &[u8]) -> Result<Self, GrowthError> {
        let expected = cell_count(width, height)?.checked_mul(3);
        if expected != Some(bytes.len()) {
            return Err(GrowthError::InvalidDimensions { width, height });
        }
        let pixels = bytes
            .chunks_exact(3)
            .map(|p| Rgb([p[0], p[1], p[2]]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build by evaluating `f(x, y)` for every pixel
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> Rgb,
    ) -> Result<Self, GrowthError> {
        let mut pixels = Vec::with_capacity(cell_count(width, height)?);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Single-color image
    pub fn solid(width: usize, height: usize, color: Rgb) -> Result<Self, GrowthError> {
        Self::from_fn(width, height, |_, _| color)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Nearest-neighbor lookup for a cell of a `(width, height)` grid
    #[inline]
    fn sample_scaled(&self, x: usize, y: usize, width: usize, height: usize) -> Rgb {
        let sx = (x * self.width / width).min(self.width - 1);
        let sy = (y * self.height / height).min(self.height - 1);
        self.pixel(sx, sy)
    }
}

/// Grid dimensions the image will be simulated at
pub fn seed_dims(image: &SourceImage, max_dimension: usize, mode: QualityMode) -> (usize, usize) {
    QualityPolicy::new(max_dimension).effective_dims(image.dims(), mode)
}

/// Sample occupied cells from the image into a `(width, height)` grid
pub fn seed_grid(
    image: &SourceImage,
    width: usize,
    height: usize,
    sample_rate: f32,
    rng: &mut impl Rng,
) -> Result<Grid, GrowthError> {
    let mut grid = Grid::new(width, height)?;
    for (idx, cell) in grid.cells_mut().iter_mut().enumerate() {
        let (x, y) = (idx % width, idx / width);
        if rng.gen::<f32>() < sample_rate {
            *cell = Cell::occupied(image.sample_scaled(x, y, width, height));
        }
    }
    Ok(grid)
}

/// Create a fresh run from an image.
///
/// Quality scaling is applied first; a zero dimension after scaling fails
/// with `InvalidDimensions`.
pub fn seed(image: &SourceImage, config: &Config, seed: u64) -> Result<SimulationRun, GrowthError> {
    config.validate()?;

    let (width, height) = seed_dims(image, config.quality.max_dimension, config.quality.mode);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let grid = seed_grid(image, width, height, config.growth.sample_rate, &mut rng)?;

    log::info!(
        "Seeded {}x{} grid from {}x{} image ({:?} quality): {} occupied, seed={}",
        width,
        height,
        image.width(),
        image.height(),
        config.quality.mode,
        grid.occupied_count(),
        seed
    );

    SimulationRun::from_grid(grid, config, seed)
}
