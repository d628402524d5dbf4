//! Commands for controlling the simulation thread.

use crate::grid::Rgb;
use crate::quality::QualityMode;
use crate::seeder::SourceImage;

/// Commands sent from a UI collaborator to the simulation thread
#[derive(Debug, Clone)]
pub enum SimCommand {
    /// Seed a new run from an image
    Seed(SourceImage),
    /// Change the sample rate and reseed
    SetSampleRate(f32),
    /// Change the quality mode and reseed
    SetQuality(QualityMode),
    /// Reseed the current image with a fresh seed
    Reset,
    /// Plant occupied cells into the running generation
    Inject(Vec<(usize, usize, Rgb)>),
    /// Execute a single tick regardless of cadence
    Step,
    /// Stop ticking after the current tick, keeping the last generation
    Stop,
    /// Shutdown the simulation thread
    Shutdown,
}
