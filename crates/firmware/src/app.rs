//! Boot sequence and the cooperative control loop.
//!
//! ```text
//! boot:  cache load ──ok──▶ playlist
//!            │ fail
//!            ▼
//!        root scan ──ok, non-empty──▶ save cache ──▶ playlist
//!            │ fail or empty
//!            ▼
//!        BootError::NoContent ──▶ halt (idle ticks, never returns)
//!
//! loop:  link edges ▶ buttons ▶ pipeline unit ▶ health check
//!        ▶ one serial line ▶ one remote line ▶ flush ▶ yield
//! ```

use core::convert::Infallible;
use core::fmt::Write as _;

use bluetooth::{LinkEvent, LinkState};
use embassy_time::Instant;
use embedded_hal_async::delay::DelayNs;
use library::{LibraryScanner, Playlist, PlaylistCache};
use platform::config::{banner, DEVICE_NAME, LIST_PAGE_LEN};
use platform::{ButtonPanel, ConsoleWriter, LineSource, RemoteTransport, Storage};
use playback::{DecodePipeline, PlaybackController, PlayerState, VolumeStep};

use crate::command::{parse_command, track_index, Command};
use crate::config::{delay_ms, PlayerConfig};
use crate::input::ButtonPoller;
use crate::output::OutputSink;

/// Sleep between loop passes while nothing is playing.
const IDLE_TICK_MS: u32 = 1;

/// Fatal boot outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BootError {
    /// Neither the cache nor a root scan produced a playable entry
    #[error("no audio files found")]
    NoContent,
}

/// Build the playlist: cache first, root scan as fallback.
///
/// A successful scan is written back to the cache; a failed write is logged
/// and ignored.
///
/// # Errors
///
/// [`BootError::NoContent`] when the root cannot be listed or holds no
/// audio file.
pub async fn load_playlist<S, W>(storage: &mut S, cache: &PlaylistCache, console: &mut W) -> Result<Playlist, BootError>
where
    S: Storage,
    W: ConsoleWriter,
{
    match cache.load(storage).await {
        Ok(playlist) => {
            tracing::info!("cache loaded: {} entries", playlist.len());
            return Ok(playlist);
        }
        Err(e) => tracing::info!("cache unusable: {}", e),
    }

    console.write_str("Performing full SD scan...\n");
    let playlist = match LibraryScanner::scan(storage).await {
        Ok(playlist) if !playlist.is_empty() => playlist,
        Ok(_) => {
            console.write_str("No audio files found\n");
            return Err(BootError::NoContent);
        }
        Err(e) => {
            tracing::error!("scan failed: {}", e);
            console.write_str("No audio files found\n");
            return Err(BootError::NoContent);
        }
    };

    if let Err(e) = cache.save(storage, &playlist).await {
        tracing::warn!("cache save failed: {}", e);
    }
    Ok(playlist)
}

/// Idle forever after a fatal boot, one tick per `tick_ms`.
pub async fn halt<D: DelayNs>(delay: &mut D, tick_ms: u32) -> Infallible {
    tracing::error!("halted");
    loop {
        delay.delay_ms(tick_ms).await;
    }
}

/// The running player: controller, input debouncing, output and link state.
pub struct Player<S, P, D, C, T> {
    controller: PlaybackController<S, P, D>,
    output: OutputSink<C, T, D>,
    buttons: ButtonPoller,
    link: LinkState,
    cache: PlaylistCache,
    config: PlayerConfig,
}

impl<S, P, D, C, T> Player<S, P, D, C, T>
where
    S: Storage,
    P: DecodePipeline<S::File>,
    D: DelayNs + Clone,
    C: ConsoleWriter,
    T: RemoteTransport + LineSource,
{
    /// Assemble a player around a loaded playlist.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        storage: S,
        pipeline: P,
        delay: D,
        console: C,
        transport: T,
        playlist: Playlist,
        cache: PlaylistCache,
        config: PlayerConfig,
    ) -> Self {
        let controller = PlaybackController::new(storage, pipeline, delay.clone(), playlist, config.playback);
        Self {
            controller,
            output: OutputSink::new(console, transport, delay, delay_ms(config.chunk_delay)),
            buttons: ButtonPoller::new(config.debounce),
            link: LinkState::with_readvertise_delay(config.readvertise_delay),
            cache,
            config,
        }
    }

    /// The controller
    pub fn controller(&self) -> &PlaybackController<S, P, D> {
        &self.controller
    }

    /// The output sink
    pub fn output(&self) -> &OutputSink<C, T, D> {
        &self.output
    }

    /// The output sink, for test and host access to the collaborators
    pub fn output_mut(&mut self) -> &mut OutputSink<C, T, D> {
        &mut self.output
    }

    /// Announce readiness, start advertising and play the start track.
    pub async fn start(&mut self, now: Instant) {
        if let Err(e) = self.output.transport_mut().start_advertising().await {
            tracing::warn!("advertising failed: {:?}", e);
        }
        self.output.console_line("System ready!");
        self.output.console_line("Type 'h' for help");
        if let Some(index) = self.config.resolve_start_track(self.controller.playlist().len()) {
            let _ = self.controller.request_play(index, now, &mut self.output).await;
        }
        self.output.flush().await;
    }

    /// One pass of the control loop.
    pub async fn run_iteration<B, L>(&mut self, panel: &mut B, serial: &mut L, now: Instant)
    where
        B: ButtonPanel,
        L: LineSource,
    {
        self.service_link(now).await;

        for command in self.buttons.poll(panel, now) {
            self.handle_command(command, now).await;
        }

        self.controller.service(now, &mut self.output).await;
        self.controller.health_check(now, &mut self.output);

        if let Some(line) = serial.poll_line() {
            self.handle_line(&line, now).await;
        }
        if let Some(line) = self.output.transport_mut().poll_line() {
            self.handle_line(&line, now).await;
        }

        self.output.flush().await;
    }

    /// Run the loop forever, reading the clock once per iteration.
    ///
    /// While a track plays the loop only yields; otherwise it sleeps one
    /// idle tick between passes.
    pub async fn run<B, L, F>(&mut self, panel: &mut B, serial: &mut L, mut clock: F) -> Infallible
    where
        B: ButtonPanel,
        L: LineSource,
        F: FnMut() -> Instant,
    {
        loop {
            self.run_iteration(panel, serial, clock()).await;
            if self.controller.state() == PlayerState::Playing {
                embassy_futures::yield_now().await;
            } else {
                self.output.delay_mut().delay_ms(IDLE_TICK_MS).await;
            }
        }
    }

    /// Parse and execute one text line.
    pub async fn handle_line(&mut self, line: &str, now: Instant) {
        if let Some(command) = parse_command(line) {
            tracing::debug!("command line: {}", line.trim());
            self.handle_command(command, now).await;
        }
    }

    /// Execute one command. Responses go to both surfaces.
    pub async fn handle_command(&mut self, command: Command, now: Instant) {
        let out = &mut self.output;
        match command {
            Command::Next => {
                let _ = self.controller.play_next(now, out).await;
            }
            Command::Previous => {
                let _ = self.controller.play_previous(now, out).await;
            }
            Command::Stop => {
                self.controller.stop();
                out.println("Stopped");
            }
            Command::Restart => {
                let _ = self.controller.restart(now, out).await;
            }
            Command::Rescan => self.rescan().await,
            Command::List => self.list(),
            Command::VolumeUp => self.step_volume(VolumeStep::Up),
            Command::VolumeDown => self.step_volume(VolumeStep::Down),
            Command::GoTo(None) => {}
            Command::GoTo(Some(number)) => match track_index(number, self.controller.playlist().len()) {
                Some(index) => {
                    let _ = self.controller.request_play(index, now, out).await;
                }
                None => out.println("Invalid track number"),
            },
            Command::Info => self.info(),
            Command::Help => write_help(out),
            Command::Unknown(letter) => {
                let _ = writeln!(out, "Unknown command: {letter}");
                out.println("Type 'h' for help");
            }
        }
        self.output.flush().await;
    }

    async fn service_link(&mut self, now: Instant) {
        let connected = self.output.transport().is_connected();
        match self.link.update(connected, now) {
            Some(LinkEvent::Connected) => {
                self.output.console_line("BLE Client Connected");
                if let Err(e) = self.output.transport_mut().stop_advertising().await {
                    tracing::warn!("stop advertising failed: {:?}", e);
                }
                let mut greeting: heapless::String<64> = heapless::String::new();
                let _ = write!(greeting, "Connected to {DEVICE_NAME}");
                self.output.remote_line(&greeting);
                self.output.remote_line("Type 'h' for help");
                self.output.flush().await;
            }
            Some(LinkEvent::Disconnected) => {
                self.output.discard_remote();
                self.output.console_line("BLE Client Disconnected");
            }
            None => {}
        }
        if self.link.take_readvertise(now) {
            if let Err(e) = self.output.transport_mut().start_advertising().await {
                tracing::warn!("advertising restart failed: {:?}", e);
            }
            self.output.console_line("Restarting BLE advertising");
        }
    }

    async fn rescan(&mut self) {
        self.output.println("Rescanning SD card...");
        self.output.flush().await;
        match LibraryScanner::scan(self.controller.storage_mut()).await {
            Ok(playlist) if !playlist.is_empty() => {
                if let Err(e) = self.cache.save(self.controller.storage_mut(), &playlist).await {
                    tracing::warn!("cache save failed: {}", e);
                }
                self.controller.replace_playlist(playlist);
                self.output.println("Cache updated");
            }
            Ok(_) => self.output.println("No audio files found"),
            Err(e) => {
                tracing::warn!("rescan failed: {}", e);
                self.output.println("No audio files found");
            }
        }
    }

    fn list(&mut self) {
        let out = &mut self.output;
        let playlist = self.controller.playlist();
        let current = self.controller.current_index();
        out.println("\n=== Playlist ===");
        for (i, entry) in playlist.iter().enumerate().take(LIST_PAGE_LEN) {
            let marker = if current == Some(i) { "> " } else { "  " };
            let _ = writeln!(out, "{marker}{}. {}", i.saturating_add(1), entry.path);
        }
        let more = playlist.len().saturating_sub(LIST_PAGE_LEN);
        if more > 0 {
            let _ = writeln!(out, "... and {more} more");
        }
        out.println("");
    }

    fn info(&mut self) {
        let out = &mut self.output;
        let session = self.controller.session();
        let len = self.controller.playlist().len();
        out.println("\n=== Status ===");
        let _ = writeln!(out, "State: {}", session.state.label());
        let position = session.current.map_or(0, |i| i.saturating_add(1));
        let _ = writeln!(out, "Track: {position}/{len}");
        let file = self.controller.current_entry().map_or("-", |e| e.path.as_str());
        let _ = writeln!(out, "File: {file}");
        let _ = writeln!(out, "Volume: {}%", playback::display_volume(session.gain));
        let _ = writeln!(out, "BLE: {}", self.link.label());
        out.println("");
    }

    fn step_volume(&mut self, step: VolumeStep) {
        let gain = self.controller.step_volume(step);
        let _ = writeln!(self.output, "Volume: {}", playback::display_volume(gain));
    }
}

fn write_help<W: core::fmt::Write>(out: &mut W) {
    let _ = out.write_str(concat!(
        "\n=== Commands ===\n",
        "n - Next track\n",
        "p - Previous track\n",
        "s - Stop playback\n",
        "r - Restart current track\n",
        "l - List tracks\n",
        "c - Rescan SD & update cache\n",
        "+ - Volume up\n",
        "- - Volume down\n",
        "g<num> - Go to track (e.g., g5)\n",
        "i - Show info\n",
        "h - Show this help\n",
        "\n",
    ));
}

/// Boot banner lines for the console.
pub fn write_banner<W: ConsoleWriter>(console: &mut W) {
    console.write_str("\n\n");
    console.write_str(banner());
    console.write_str("\n");
}
