//! Simulation resolution selection.

use serde::{Deserialize, Serialize};

/// Resolution mode chosen by the caller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityMode {
    /// Simulate at the source resolution
    #[default]
    Full,
    /// Cap the larger dimension at `max_dimension`
    Reduced,
}

/// Coarse performance class reported by the UI layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceHint {
    HighPerformance,
    LowPower,
}

impl From<DeviceHint> for QualityMode {
    fn from(hint: DeviceHint) -> Self {
        match hint {
            DeviceHint::HighPerformance => QualityMode::Full,
            DeviceHint::LowPower => QualityMode::Reduced,
        }
    }
}

/// Maps requested dimensions to simulated dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualityPolicy {
    pub max_dimension: usize,
}

impl QualityPolicy {
    pub fn new(max_dimension: usize) -> Self {
        Self { max_dimension }
    }

    /// Effective `(width, height)` for the mode.
    ///
    /// In reduced mode the larger side becomes exactly `max_dimension` and the
    /// smaller side is rounded to the nearest integer. The result may contain
    /// a zero for extreme aspect ratios; the seeder rejects those.
    pub fn effective_dims(&self, requested: (usize, usize), mode: QualityMode) -> (usize, usize) {
        let (width, height) = requested;
        let largest = width.max(height);
        if mode == QualityMode::Full || largest <= self.max_dimension {
            return requested;
        }

        let max = self.max_dimension;
        let scale_side = |side: usize| (side * max + largest / 2) / largest;
        if width >= height {
            (max, scale_side(height))
        } else {
            (scale_side(width), max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_mode_passthrough() {
        let policy = QualityPolicy::new(100);
        assert_eq!(policy.effective_dims((4000, 3000), QualityMode::Full), (4000, 3000));
    }

    #[test]
    fn test_small_images_untouched() {
        let policy = QualityPolicy::new(512);
        assert_eq!(policy.effective_dims((320, 200), QualityMode::Reduced), (320, 200));
        assert_eq!(policy.effective_dims((512, 512), QualityMode::Reduced), (512, 512));
    }

    #[test]
    fn test_reduced_preserves_aspect() {
        let policy = QualityPolicy::new(512);
        let cases = [(4000, 3000), (3000, 4000), (1920, 1080), (1081, 1920), (777, 555), (513, 1)];

        for &(w, h) in &cases {
            let (ew, eh) = policy.effective_dims((w, h), QualityMode::Reduced);
            assert_eq!(ew.max(eh), 512, "{}x{} -> {}x{}", w, h, ew, eh);

            // Smaller side within rounding of the exact scaled value
            let exact = w.min(h) as f64 * 512.0 / w.max(h) as f64;
            assert!((ew.min(eh) as f64 - exact).abs() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_extreme_aspect_rounds_to_zero() {
        let policy = QualityPolicy::new(10);
        assert_eq!(policy.effective_dims((1000, 1), QualityMode::Reduced), (10, 0));
    }

    #[test]
    fn test_device_hint_mapping() {
        assert_eq!(QualityMode::from(DeviceHint::LowPower), QualityMode::Reduced);
        assert_eq!(QualityMode::from(DeviceHint::HighPerformance), QualityMode::Full);
    }
}
