//! Motion processing configuration shared by the recorder and the pipeline.

use serde::{Deserialize, Serialize};

/// Default number of lead-in / lead-out frames (half-width of the smoothing kernel)
pub const DEFAULT_DELAY_DEPTH: usize = 12;

/// Default resampling step, 30 Hz
pub const DEFAULT_INTERPOLATION_STEP: f64 = 1.0 / 30.0;

/// Default length below which a limb is treated as degenerate (meters)
pub const DEFAULT_MIN_LIMB_LENGTH: f64 = 1e-6;

/// Motion processing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Delay depth `D`: pre-roll capacity, lead-out length and filter half-width
    #[serde(default = "default_delay_depth")]
    pub delay_depth: usize,

    /// Resampling step in seconds
    #[serde(default = "default_interpolation_step")]
    pub interpolation_step: f64,

    /// Limbs shorter than this are left uncorrected
    #[serde(default = "default_min_limb_length")]
    pub min_limb_length: f64,

    /// Shift corrected poses back onto the feet's original height
    #[serde(default = "default_true")]
    pub ground_feet: bool,

    /// Point thumbs towards the opposite hand after correction
    #[serde(default = "default_true")]
    pub repoint_thumbs: bool,
}

fn default_delay_depth() -> usize {
    DEFAULT_DELAY_DEPTH
}

fn default_interpolation_step() -> f64 {
    DEFAULT_INTERPOLATION_STEP
}

fn default_min_limb_length() -> f64 {
    DEFAULT_MIN_LIMB_LENGTH
}

fn default_true() -> bool {
    true
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            delay_depth: DEFAULT_DELAY_DEPTH,
            interpolation_step: DEFAULT_INTERPOLATION_STEP,
            min_limb_length: DEFAULT_MIN_LIMB_LENGTH,
            ground_feet: true,
            repoint_thumbs: true,
        }
    }
}

impl ProcessingConfig {
    /// Output frame rate implied by the resampling step.
    pub fn frame_rate(&self) -> f64 {
        1.0 / self.interpolation_step
    }

    /// Config with a different delay depth, everything else default.
    pub fn with_delay_depth(delay_depth: usize) -> Self {
        Self {
            delay_depth,
            ..Self::default()
        }
    }
}
