//! Player-level configuration.

use embassy_time::Duration;
use playback::PlaybackConfig;

/// Button debounce tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Minimum spacing between two recognized presses of the same button
    pub min_press_interval: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            min_press_interval: Duration::from_millis(200),
        }
    }
}

/// Everything the control loop needs besides its collaborators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerConfig {
    /// Controller tuning
    pub playback: PlaybackConfig,
    /// Button tuning
    pub debounce: DebounceConfig,
    /// 0-based track played after boot; `None` waits for a command
    pub start_track: Option<usize>,
    /// Pause after each remote notification chunk
    pub chunk_delay: Duration,
    /// Tick of the idle loop entered after a fatal boot
    pub halt_tick: Duration,
    /// Wait after a remote disconnect before advertising again
    pub readvertise_delay: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            debounce: DebounceConfig::default(),
            start_track: Some(0),
            chunk_delay: Duration::from_millis(10),
            halt_tick: Duration::from_secs(1),
            readvertise_delay: bluetooth::state::READVERTISE_DELAY,
        }
    }
}

impl PlayerConfig {
    /// Set the boot track (0-based).
    pub fn with_start_track(mut self, track: Option<usize>) -> Self {
        self.start_track = track;
        self
    }

    /// Replace the controller tuning.
    pub fn with_playback(mut self, playback: PlaybackConfig) -> Self {
        self.playback = playback;
        self
    }

    /// Boot track clamped to the playlist; out of range falls back to the
    /// first entry.
    pub fn resolve_start_track(&self, playlist_len: usize) -> Option<usize> {
        if playlist_len == 0 {
            return None;
        }
        self.start_track.map(|i| if i < playlist_len { i } else { 0 })
    }
}

/// Milliseconds of `d` as the `u32` that `DelayNs::delay_ms` takes.
pub(crate) fn delay_ms(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}
