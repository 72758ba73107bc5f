//! Audio output abstraction

use crate::audio_types::Gain;

/// PCM sink at the end of the decode pipeline (I2S DAC on hardware).
///
/// Gain is applied by the sink itself, so a volume change takes effect on the
/// next written block without restarting the decoder.
pub trait AudioOutput {
    /// Error type
    type Error: core::fmt::Debug;

    /// Reconfigure the sink for the stream about to be written
    fn configure(&mut self, config: AudioConfig);

    /// Set output gain, effective immediately
    fn set_gain(&mut self, gain: Gain);

    /// Write interleaved 16-bit audio samples
    fn write_samples(
        &mut self,
        samples: &[i16],
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// Audio configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u8,
    /// Bit depth (16 or 24)
    pub bit_depth: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            bit_depth: 16,
        }
    }
}
