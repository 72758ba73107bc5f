//! Volume stepping for the `+`/`-` controls.
//!
//! Gain is linear in `[0.0, 1.0]`; each step adds or removes a fixed amount
//! and clamps. The user-facing percentage comes from [`Gain::percent`].

use platform::audio_types::{Gain, VolumePercent};

/// Direction of one volume step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeStep {
    /// Louder
    Up,
    /// Quieter
    Down,
}

impl VolumeStep {
    /// Signed gain delta for a step of `size`.
    pub fn delta(self, size: f32) -> f32 {
        match self {
            Self::Up => size,
            Self::Down => -size,
        }
    }
}

/// Percentage shown by the `i` command and volume replies.
pub fn display_volume(gain: Gain) -> VolumePercent {
    gain.percent()
}
