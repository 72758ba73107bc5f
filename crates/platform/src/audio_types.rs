//! Audio domain newtypes for compile-time safety.
//!
//! - `Gain`: linear output gain, always inside `[0.0, 1.0]`
//! - `VolumePercent`: user-facing 0–100 rendering of a `Gain`

// ── Gain ─────────────────────────────────────────────────────────────────────

/// Linear output gain, clamped to `[0.0, 1.0]`.
///
/// NaN collapses to `0.0` so a corrupt computation mutes instead of
/// overdriving the DAC.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Gain(f32);

impl Gain {
    /// Silence.
    pub const MIN: Self = Self(0.0);
    /// Full scale.
    pub const MAX: Self = Self(1.0);

    /// Create a `Gain`, clamping into `[0.0, 1.0]`.
    #[must_use]
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Return the gain shifted by `delta`, clamped into `[0.0, 1.0]`.
    #[must_use]
    pub fn step(self, delta: f32) -> Self {
        Self::new(self.0 + delta)
    }

    /// Return the inner linear value.
    #[must_use]
    pub fn get(self) -> f32 {
        self.0
    }

    /// Round to the nearest whole percent.
    ///
    /// Rounding (not truncation) keeps `0.9 + 0.1` reporting `100` even when
    /// the f32 sum lands a hair below `1.0`.
    #[must_use]
    pub fn percent(self) -> VolumePercent {
        // Value is in [0.0, 100.5], the cast cannot wrap or lose sign.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = (self.0 * 100.0 + 0.5) as u8;
        VolumePercent::new(pct)
    }

    /// Scale one PCM sample by this gain.
    #[must_use]
    pub fn apply(self, sample: i16) -> i16 {
        // |sample * gain| <= |sample|, so the result always fits in i16.
        #[allow(clippy::cast_possible_truncation)]
        let scaled = (f32::from(sample) * self.0) as i16;
        scaled
    }
}

impl Default for Gain {
    fn default() -> Self {
        Self::MAX
    }
}

// ── VolumePercent ────────────────────────────────────────────────────────────

/// Volume as a percentage, clamped to 0–100.
///
/// Wraps a `u8` with the invariant `0 <= value <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct VolumePercent(u8);

impl VolumePercent {
    /// Create a `VolumePercent`, clamping values above 100 to 100.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Return the inner volume value (0–100).
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for VolumePercent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
