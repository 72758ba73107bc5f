//! Playback state machine.
//!
//! `PlaybackController` owns the playlist, the session, the storage handle
//! and the decode pipeline. It is the only code that starts or stops the
//! pipeline. Every transition goes through [`PlaybackController::request_play`],
//! which enforces the switch spacing, the `Switching` re-entrancy guard and
//! the bounded open/start retry loop.
//!
//! ```text
//! Stopped ──request_play──▶ Switching ──ok──▶ Playing
//!                               │
//!                               └──retries exhausted──▶ Error
//! Playing ──end of stream──▶ play_next (failure settles Stopped)
//! Error ──health check (≥ interval)──▶ Stopped
//! ```
//!
//! Time is passed in as [`Instant`] so tests control the clock; retry
//! backoff goes through an injected [`DelayNs`].

use embassy_time::{Duration, Instant};
use embedded_hal_async::delay::DelayNs;
use library::{Playlist, PlaylistEntry};
use platform::storage::{OpenMode, Storage};
use platform::Gain;

use crate::events::{EventSink, PlaybackEvent};
use crate::pipeline::DecodePipeline;
use crate::volume::VolumeStep;

/// Current playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Nothing is decoding.
    Stopped,
    /// A track is decoding and streaming to the output.
    Playing,
    /// A switch is in progress. Never a rest state.
    Switching,
    /// The last load exhausted its retries.
    Error,
}

impl PlayerState {
    /// Name shown by the `i` command
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stopped => "STOPPED",
            Self::Playing => "PLAYING",
            Self::Switching => "SWITCHING",
            Self::Error => "ERROR",
        }
    }
}

/// Errors returned by playback transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// next/previous on an empty playlist
    #[error("playlist is empty")]
    EmptyPlaylist,
    /// Index outside the playlist
    #[error("invalid file index")]
    InvalidIndex,
    /// Less than the minimum spacing since the last switch
    #[error("switch too fast")]
    RateLimited,
    /// A switch is already running
    #[error("switch already in progress")]
    SwitchInProgress,
    /// Every attempt failed to open the file
    #[error("file open failed")]
    OpenFailed,
    /// The file opened but the generator refused it on the last attempt
    #[error("decoder start failed")]
    DecodeStartFailed,
}

impl PlaybackError {
    /// `true` when a switch was actually attempted and failed
    pub const fn is_load_failure(self) -> bool {
        matches!(self, Self::OpenFailed | Self::DecodeStartFailed)
    }
}

/// Tunables for the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Open/start attempts per switch (at least 1)
    pub max_retries: u8,
    /// Wait between attempts
    pub retry_backoff: Duration,
    /// Minimum spacing between switches
    pub min_switch_interval: Duration,
    /// Period of the `Error` → `Stopped` probe
    pub health_check_interval: Duration,
    /// Gain at power-on
    pub initial_gain: Gain,
    /// Size of one `+`/`-` step
    pub gain_step: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff: Duration::from_millis(100),
            min_switch_interval: Duration::from_millis(100),
            health_check_interval: Duration::from_secs(10),
            initial_gain: Gain::new(0.9),
            gain_step: 0.1,
        }
    }
}

impl PlaybackConfig {
    /// Set the attempt bound (clamped to at least 1).
    #[must_use]
    pub fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    /// Set the backoff between attempts.
    #[must_use]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set the minimum switch spacing.
    #[must_use]
    pub fn with_min_switch_interval(mut self, interval: Duration) -> Self {
        self.min_switch_interval = interval;
        self
    }

    /// Set the health check period.
    #[must_use]
    pub fn with_health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// Set the power-on gain.
    #[must_use]
    pub fn with_initial_gain(mut self, gain: Gain) -> Self {
        self.initial_gain = gain;
        self
    }
}

/// Snapshot of the mutable playback state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSession {
    /// Entry being (or last) played; `None` before the first success
    pub current: Option<usize>,
    /// State machine position
    pub state: PlayerState,
    /// When the last switch began
    pub last_switch: Option<Instant>,
    /// Output gain
    pub gain: Gain,
}

/// What [`PlaybackController::service`] did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOutcome {
    /// Not playing; nothing to do
    Idle,
    /// One unit decoded and written
    Advanced,
    /// Stream ended; an auto-advance was attempted
    TrackEnded,
}

/// Owner of the playlist, session and decode pipeline.
pub struct PlaybackController<S, P, D> {
    storage: S,
    pipeline: P,
    delay: D,
    config: PlaybackConfig,
    playlist: Playlist,
    session: PlaybackSession,
    last_health_check: Option<Instant>,
}

impl<S, P, D> PlaybackController<S, P, D>
where
    S: Storage,
    P: DecodePipeline<S::File>,
    D: DelayNs,
{
    /// Create a stopped controller and apply the initial gain.
    pub fn new(storage: S, mut pipeline: P, delay: D, playlist: Playlist, config: PlaybackConfig) -> Self {
        pipeline.set_gain(config.initial_gain);
        Self {
            storage,
            pipeline,
            delay,
            config,
            playlist,
            session: PlaybackSession {
                current: None,
                state: PlayerState::Stopped,
                last_switch: None,
                gain: config.initial_gain,
            },
            last_health_check: None,
        }
    }

    /// Copy of the session
    pub fn session(&self) -> PlaybackSession {
        self.session
    }

    /// Current state
    pub fn state(&self) -> PlayerState {
        self.session.state
    }

    /// Current index, if any
    pub fn current_index(&self) -> Option<usize> {
        self.session.current
    }

    /// Current entry, if any
    pub fn current_entry(&self) -> Option<&PlaylistEntry> {
        self.session.current.and_then(|i| self.playlist.get(i))
    }

    /// The playlist
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Active configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Storage handle, for the scanner and cache
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// The pipeline
    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Make `index` the playing entry.
    ///
    /// Rejections (`SwitchInProgress`, `InvalidIndex`, `RateLimited`) leave
    /// the session untouched and never touch the pipeline. Otherwise the
    /// previous stream is stopped and up to `max_retries` open + start
    /// attempts are made, with `retry_backoff` between them.
    ///
    /// # Errors
    ///
    /// See [`PlaybackError`]. `OpenFailed`/`DecodeStartFailed` leave the
    /// session in [`PlayerState::Error`] with `current` unchanged.
    pub async fn request_play<E: EventSink>(
        &mut self,
        index: usize,
        now: Instant,
        events: &mut E,
    ) -> Result<(), PlaybackError> {
        if self.session.state == PlayerState::Switching {
            return Err(PlaybackError::SwitchInProgress);
        }

        let Some(entry) = self.playlist.get(index).cloned() else {
            events.notify(PlaybackEvent::InvalidIndex);
            return Err(PlaybackError::InvalidIndex);
        };

        if let Some(last) = self.session.last_switch {
            let too_soon = now
                .checked_duration_since(last)
                .map_or(true, |elapsed| elapsed < self.config.min_switch_interval);
            if too_soon {
                tracing::debug!("switch to {} rate limited", index);
                events.notify(PlaybackEvent::TooFast);
                return Err(PlaybackError::RateLimited);
            }
        }

        self.session.last_switch = Some(now);
        self.session.state = PlayerState::Switching;
        self.pipeline.stop();

        let path = entry.path.as_str();
        events.notify(PlaybackEvent::Loading { index, path });
        tracing::info!("switch to [{}] {}", index, path);

        let attempts = self.config.max_retries.max(1);
        let mut failure = PlaybackError::OpenFailed;
        for attempt in 1..=attempts {
            match self.storage.open_file(path, OpenMode::Read).await {
                Err(e) => {
                    tracing::warn!("open {} failed (attempt {}): {:?}", path, attempt, e);
                    failure = PlaybackError::OpenFailed;
                    events.notify(PlaybackEvent::OpenRetry { attempt });
                }
                Ok(file) => match self.pipeline.start(file, entry.kind).await {
                    Ok(()) => {
                        self.session.current = Some(index);
                        self.session.state = PlayerState::Playing;
                        events.notify(PlaybackEvent::Started);
                        tracing::info!("playing [{}] {}", index, path);
                        return Ok(());
                    }
                    Err(e) => {
                        tracing::warn!("decoder start {} failed (attempt {}): {:?}", path, attempt, e);
                        failure = PlaybackError::DecodeStartFailed;
                        events.notify(PlaybackEvent::GeneratorRetry { attempt });
                    }
                },
            }
            if attempt < attempts {
                let backoff = u32::try_from(self.config.retry_backoff.as_millis()).unwrap_or(u32::MAX);
                self.delay.delay_ms(backoff).await;
            }
        }

        self.session.state = PlayerState::Error;
        events.notify(PlaybackEvent::LoadFailed);
        tracing::error!("giving up on [{}] {}: {}", index, path, failure);
        Err(failure)
    }

    /// Advance to the next entry, wrapping to the first.
    ///
    /// A load failure stops playback instead of leaving the session in
    /// `Error`, which ends an auto-advance chain over a broken library.
    ///
    /// # Errors
    ///
    /// `EmptyPlaylist`, or whatever [`request_play`](Self::request_play)
    /// returned.
    pub async fn play_next<E: EventSink>(&mut self, now: Instant, events: &mut E) -> Result<(), PlaybackError> {
        let len = self.playlist.len();
        if len == 0 {
            return Err(PlaybackError::EmptyPlaylist);
        }
        let next = self
            .session
            .current
            .map_or(0, |i| i.saturating_add(1).checked_rem(len).unwrap_or(0));

        let result = self.request_play(next, now, events).await;
        if let Err(e) = result {
            if e.is_load_failure() {
                events.notify(PlaybackEvent::NextFailed);
                self.pipeline.stop();
                self.session.state = PlayerState::Stopped;
            }
        }
        result
    }

    /// Go back one entry, wrapping from the first to the last.
    ///
    /// A load failure leaves the session where `request_play` put it.
    ///
    /// # Errors
    ///
    /// `EmptyPlaylist`, or whatever [`request_play`](Self::request_play)
    /// returned.
    pub async fn play_previous<E: EventSink>(&mut self, now: Instant, events: &mut E) -> Result<(), PlaybackError> {
        let len = self.playlist.len();
        if len == 0 {
            return Err(PlaybackError::EmptyPlaylist);
        }
        let previous = match self.session.current {
            Some(i) if i > 0 && i < len => i.saturating_sub(1),
            _ => len.saturating_sub(1),
        };

        let result = self.request_play(previous, now, events).await;
        if matches!(result, Err(e) if e.is_load_failure()) {
            events.notify(PlaybackEvent::PreviousFailed);
        }
        result
    }

    /// Restart the current entry from the beginning (the first entry if
    /// nothing has played yet).
    ///
    /// # Errors
    ///
    /// Whatever [`request_play`](Self::request_play) returned.
    pub async fn restart<E: EventSink>(&mut self, now: Instant, events: &mut E) -> Result<(), PlaybackError> {
        let index = self.session.current.unwrap_or(0);
        self.request_play(index, now, events).await
    }

    /// Stop decoding and settle in `Stopped`.
    pub fn stop(&mut self) {
        if self.session.state == PlayerState::Switching {
            return;
        }
        self.pipeline.stop();
        self.session.state = PlayerState::Stopped;
        tracing::info!("playback stopped");
    }

    /// Shift the gain by `delta`, clamped to `[0.0, 1.0]`, and apply it.
    pub fn set_gain(&mut self, delta: f32) -> Gain {
        self.session.gain = self.session.gain.step(delta);
        self.pipeline.set_gain(self.session.gain);
        tracing::debug!("gain {}", self.session.gain.get());
        self.session.gain
    }

    /// One configured `+`/`-` step.
    pub fn step_volume(&mut self, step: VolumeStep) -> Gain {
        self.set_gain(step.delta(self.config.gain_step))
    }

    /// Drive the pipeline by one unit; on end of stream auto-advance.
    pub async fn service<E: EventSink>(&mut self, now: Instant, events: &mut E) -> ServiceOutcome {
        if self.session.state != PlayerState::Playing {
            return ServiceOutcome::Idle;
        }
        if self.pipeline.is_running() && self.pipeline.advance().await {
            return ServiceOutcome::Advanced;
        }
        self.pipeline.stop();
        events.notify(PlaybackEvent::TrackEnded);
        // The stream is gone, so a failed advance settles in `Stopped`.
        if self.play_next(now, events).await.is_err() {
            self.session.state = PlayerState::Stopped;
        }
        ServiceOutcome::TrackEnded
    }

    /// Periodic probe: every `health_check_interval`, move `Error` to
    /// `Stopped` without resuming playback. Returns `true` on recovery.
    pub fn health_check<E: EventSink>(&mut self, now: Instant, events: &mut E) -> bool {
        let Some(last) = self.last_health_check else {
            self.last_health_check = Some(now);
            return false;
        };
        let due = now
            .checked_duration_since(last)
            .is_some_and(|elapsed| elapsed >= self.config.health_check_interval);
        if !due {
            return false;
        }
        self.last_health_check = Some(now);

        if self.session.state != PlayerState::Error {
            return false;
        }
        events.notify(PlaybackEvent::Recovering);
        tracing::info!("recovering from error state");
        self.pipeline.stop();
        self.session.state = PlayerState::Stopped;
        true
    }

    /// Swap in a freshly scanned playlist.
    ///
    /// The current stream keeps playing; an index that no longer exists is
    /// cleared.
    pub fn replace_playlist(&mut self, playlist: Playlist) {
        self.playlist = playlist;
        if self.session.current.is_some_and(|i| i >= self.playlist.len()) {
            self.session.current = None;
        }
        tracing::info!("playlist replaced ({} entries)", self.playlist.len());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::mocks::MockPipeline;
    use library::{EntryKind, PlaylistEntry};
    use platform::mocks::{MockStorage, NoopDelay};

    type Controller = PlaybackController<MockStorage, MockPipeline, NoopDelay>;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn setup(names: &[&str]) -> (Controller, MockStorage, MockPipeline, NoopDelay) {
        let storage = MockStorage::new();
        let mut playlist = Playlist::new();
        for name in names {
            storage.add_sized_file(name, 10);
            let kind = EntryKind::from_file_name(name).unwrap();
            playlist.push(PlaylistEntry::new(name, kind, 10).unwrap()).unwrap();
        }
        let pipeline = MockPipeline::new();
        let delay = NoopDelay::new();
        let controller = PlaybackController::new(
            storage.clone(),
            pipeline.clone(),
            delay.clone(),
            playlist,
            PlaybackConfig::default(),
        );
        (controller, storage, pipeline, delay)
    }

    #[tokio::test]
    async fn test_starts_stopped_with_initial_gain() {
        let (c, _, pipeline, _) = setup(&["/a.mp3"]);
        assert_eq!(c.state(), PlayerState::Stopped);
        assert_eq!(c.current_index(), None);
        assert_eq!(pipeline.gain(), Some(Gain::new(0.9)));
    }

    #[tokio::test]
    async fn test_request_play_success() {
        let (mut c, storage, pipeline, _) = setup(&["/a.mp3", "/b.wav"]);
        c.request_play(1, at(1000), &mut NullSink).await.unwrap();
        assert_eq!(c.state(), PlayerState::Playing);
        assert_eq!(c.current_index(), Some(1));
        assert_eq!(storage.read_opens("/b.wav"), 1);
        assert_eq!(pipeline.started(), vec![EntryKind::Wav]);
    }

    #[tokio::test]
    async fn test_invalid_index_changes_nothing() {
        let (mut c, storage, _, _) = setup(&["/a.mp3"]);
        let before = c.session();
        assert_eq!(c.request_play(5, at(1000), &mut NullSink).await, Err(PlaybackError::InvalidIndex));
        assert_eq!(c.session(), before);
        assert_eq!(storage.total_read_opens(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_is_a_no_op() {
        let (mut c, storage, pipeline, _) = setup(&["/a.mp3", "/b.mp3"]);
        c.request_play(0, at(1000), &mut NullSink).await.unwrap();
        let snapshot = c.session();
        let stops = pipeline.stop_calls();

        let result = c.request_play(1, at(1099), &mut NullSink).await;
        assert_eq!(result, Err(PlaybackError::RateLimited));
        assert_eq!(c.session(), snapshot);
        assert_eq!(pipeline.stop_calls(), stops);
        assert_eq!(storage.read_opens("/b.mp3"), 0);

        c.request_play(1, at(1100), &mut NullSink).await.unwrap();
        assert_eq!(c.current_index(), Some(1));
    }

    #[tokio::test]
    async fn test_retry_exhaustion_opens_exactly_max_retries() {
        let (mut c, storage, _, delay) = setup(&["/a.mp3", "/b.mp3"]);
        c.request_play(0, at(1000), &mut NullSink).await.unwrap();
        storage.set_fail_all_opens(true);

        let result = c.request_play(1, at(2000), &mut NullSink).await;
        assert_eq!(result, Err(PlaybackError::OpenFailed));
        assert_eq!(storage.read_opens("/b.mp3"), 3);
        assert_eq!(c.state(), PlayerState::Error);
        assert_eq!(c.current_index(), Some(0));
        // Backoff between attempts, not after the last one.
        assert_eq!(delay.calls_ms(), vec![100, 100]);
    }

    #[tokio::test]
    async fn test_start_failures_share_the_retry_budget() {
        let (mut c, storage, pipeline, _) = setup(&["/a.mp3"]);
        pipeline.fail_starts(2);
        c.request_play(0, at(1000), &mut NullSink).await.unwrap();
        assert_eq!(storage.read_opens("/a.mp3"), 3);
        assert_eq!(c.state(), PlayerState::Playing);

        pipeline.fail_starts(3);
        let result = c.request_play(0, at(2000), &mut NullSink).await;
        assert_eq!(result, Err(PlaybackError::DecodeStartFailed));
        assert_eq!(c.state(), PlayerState::Error);
    }

    #[tokio::test]
    async fn test_switching_guard() {
        let (mut c, _, _, _) = setup(&["/a.mp3"]);
        c.session.state = PlayerState::Switching;
        let before = c.session();
        assert_eq!(
            c.request_play(0, at(1000), &mut NullSink).await,
            Err(PlaybackError::SwitchInProgress)
        );
        assert_eq!(c.session(), before);
    }

    #[tokio::test]
    async fn test_previous_from_first_wraps_to_last() {
        let (mut c, _, _, _) = setup(&["/a.mp3", "/b.mp3", "/c.mp3", "/d.mp3"]);
        c.request_play(0, at(1000), &mut NullSink).await.unwrap();
        c.play_previous(at(2000), &mut NullSink).await.unwrap();
        assert_eq!(c.current_index(), Some(3));
    }

    #[tokio::test]
    async fn test_next_from_last_wraps_to_first() {
        let (mut c, _, _, _) = setup(&["/a.mp3", "/b.mp3"]);
        c.request_play(1, at(1000), &mut NullSink).await.unwrap();
        c.play_next(at(2000), &mut NullSink).await.unwrap();
        assert_eq!(c.current_index(), Some(0));
    }

    #[tokio::test]
    async fn test_next_failure_settles_stopped() {
        let (mut c, storage, _, _) = setup(&["/a.mp3", "/b.mp3"]);
        c.request_play(0, at(1000), &mut NullSink).await.unwrap();
        storage.fail_open("/b.mp3");
        assert_eq!(c.play_next(at(2000), &mut NullSink).await, Err(PlaybackError::OpenFailed));
        assert_eq!(c.state(), PlayerState::Stopped);
        assert_eq!(c.current_index(), Some(0));
    }

    #[tokio::test]
    async fn test_previous_failure_stays_on_current() {
        let (mut c, storage, _, _) = setup(&["/a.mp3", "/b.mp3"]);
        c.request_play(1, at(1000), &mut NullSink).await.unwrap();
        storage.fail_open("/a.mp3");
        assert!(c.play_previous(at(2000), &mut NullSink).await.is_err());
        assert_eq!(c.current_index(), Some(1));
        assert_eq!(c.state(), PlayerState::Error);
    }

    #[tokio::test]
    async fn test_empty_playlist() {
        let (mut c, _, _, _) = setup(&[]);
        assert_eq!(c.play_next(at(0), &mut NullSink).await, Err(PlaybackError::EmptyPlaylist));
        assert_eq!(c.play_previous(at(0), &mut NullSink).await, Err(PlaybackError::EmptyPlaylist));
    }

    #[tokio::test]
    async fn test_end_of_stream_advances() {
        let (mut c, _, pipeline, _) = setup(&["/a.mp3", "/b.mp3"]);
        c.request_play(0, at(1000), &mut NullSink).await.unwrap();
        pipeline.set_units_per_stream(2);
        // The first stream was started before the limit was set.
        pipeline.end_current_stream();
        assert_eq!(c.service(at(2000), &mut NullSink).await, ServiceOutcome::TrackEnded);
        assert_eq!(c.current_index(), Some(1));
        assert_eq!(c.service(at(2010), &mut NullSink).await, ServiceOutcome::Advanced);
    }

    #[derive(Default)]
    struct Transcript(Vec<String>);

    impl EventSink for Transcript {
        fn notify(&mut self, event: PlaybackEvent<'_>) {
            self.0.push(event.to_string());
        }
    }

    impl Transcript {
        fn count(&self, text: &str) -> usize {
            self.0.iter().filter(|line| line.as_str() == text).count()
        }
    }

    #[tokio::test]
    async fn test_rate_limited_auto_advance_stops() {
        let (mut c, _, pipeline, _) = setup(&["/a.mp3", "/b.mp3"]);
        c.request_play(0, at(1000), &mut NullSink).await.unwrap();
        pipeline.end_current_stream();
        let mut events = Transcript::default();
        assert_eq!(c.service(at(1001), &mut events).await, ServiceOutcome::TrackEnded);
        assert_eq!(c.state(), PlayerState::Stopped);
        assert_eq!(c.current_index(), Some(0));
        assert!(!pipeline.running());
        for ms in 1002..1010 {
            assert_eq!(c.service(at(ms), &mut events).await, ServiceOutcome::Idle);
        }
        assert_eq!(events.count("Song ended, playing next"), 1);
        assert_eq!(pipeline.started().len(), 1);
    }

    #[tokio::test]
    async fn test_service_idle_when_stopped() {
        let (mut c, _, _, _) = setup(&["/a.mp3"]);
        assert_eq!(c.service(at(0), &mut NullSink).await, ServiceOutcome::Idle);
    }

    #[tokio::test]
    async fn test_health_check_recovers_error_after_interval() {
        let (mut c, storage, _, _) = setup(&["/a.mp3"]);
        assert!(!c.health_check(at(0), &mut NullSink));
        storage.set_fail_all_opens(true);
        let _ = c.request_play(0, at(1000), &mut NullSink).await;
        assert_eq!(c.state(), PlayerState::Error);

        assert!(!c.health_check(at(9_999), &mut NullSink));
        assert_eq!(c.state(), PlayerState::Error);
        assert!(c.health_check(at(10_000), &mut NullSink));
        assert_eq!(c.state(), PlayerState::Stopped);
    }

    #[tokio::test]
    async fn test_gain_clamps_and_reaches_pipeline() {
        let (mut c, _, pipeline, _) = setup(&["/a.mp3"]);
        for _ in 0..3 {
            c.step_volume(VolumeStep::Up);
        }
        assert_eq!(c.session().gain, Gain::MAX);
        assert_eq!(pipeline.gain(), Some(Gain::MAX));
        assert_eq!(c.session().gain.percent().get(), 100);
    }

    #[tokio::test]
    async fn test_stop_from_playing() {
        let (mut c, _, pipeline, _) = setup(&["/a.mp3"]);
        c.request_play(0, at(1000), &mut NullSink).await.unwrap();
        c.stop();
        assert_eq!(c.state(), PlayerState::Stopped);
        assert!(!pipeline.running());
    }

    #[tokio::test]
    async fn test_replace_playlist_clears_stale_index() {
        let (mut c, _, _, _) = setup(&["/a.mp3", "/b.mp3"]);
        c.request_play(1, at(1000), &mut NullSink).await.unwrap();
        let mut shorter = Playlist::new();
        shorter.push(PlaylistEntry::new("/a.mp3", EntryKind::Mp3, 1).unwrap()).unwrap();
        c.replace_playlist(shorter);
        assert_eq!(c.current_index(), None);
    }
}
