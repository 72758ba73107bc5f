//! Desktop collaborators for the host player binary.
//!
//! The host has no buttons and no radio: the panel is always released and
//! the remote transport never connects. Audio is discarded at real-time pace
//! so track lengths and auto-advance behave as on the device.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use embassy_time::Instant;
use embedded_hal_async::delay::DelayNs;
use platform::{AudioConfig, AudioOutput, Button, ButtonPanel, ConsoleWriter, Gain, Line, LineSource, RemoteTransport};

/// `DelayNs` backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl DelayNs for TokioDelay {
    async fn delay_ns(&mut self, ns: u32) {
        tokio::time::sleep(std::time::Duration::from_nanos(u64::from(ns))).await;
    }
}

/// Monotonic clock mapped onto `embassy_time::Instant` (ms since start).
pub fn monotonic_clock() -> impl FnMut() -> Instant {
    let start = std::time::Instant::now();
    move || Instant::from_millis(u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX))
}

/// Console on stdout.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl ConsoleWriter for StdoutConsole {
    fn write_str(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

/// Lines typed on stdin, read by a background thread.
///
/// Like a serial port, one poll takes the next line and discards whatever
/// else arrived in the meantime.
pub struct StdinLines {
    rx: Receiver<String>,
    closed: bool,
}

impl StdinLines {
    /// Start the reader thread.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx, closed: false }
    }
}

impl LineSource for StdinLines {
    fn poll_line(&mut self) -> Option<Line> {
        if self.closed {
            return None;
        }
        let text = match self.rx.try_recv() {
            Ok(text) => text,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                tracing::info!("stdin closed");
                self.closed = true;
                return None;
            }
        };
        let dropped = self.rx.try_iter().count();
        if dropped > 0 {
            tracing::debug!("discarded {} pending lines", dropped);
        }
        let mut line = Line::new();
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        Some(line)
    }
}

/// Front panel with nothing attached.
#[derive(Debug, Default)]
pub struct NoButtons;

impl ButtonPanel for NoButtons {
    fn is_pressed(&mut self, _button: Button) -> bool {
        false
    }
}

/// Remote transport that never sees a peer.
#[derive(Debug, Default)]
pub struct OfflineTransport {
    advertising: bool,
}

impl RemoteTransport for OfflineTransport {
    type Error = core::convert::Infallible;

    fn is_connected(&self) -> bool {
        false
    }

    fn max_chunk_len(&self) -> usize {
        platform::config::REMOTE_CHUNK_LEN
    }

    async fn send_chunk(&mut self, _chunk: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn start_advertising(&mut self) -> Result<(), Self::Error> {
        if !self.advertising {
            tracing::info!("advertising as {}", platform::config::DEVICE_NAME);
        }
        self.advertising = true;
        Ok(())
    }

    async fn stop_advertising(&mut self) -> Result<(), Self::Error> {
        self.advertising = false;
        Ok(())
    }
}

impl LineSource for OfflineTransport {
    fn poll_line(&mut self) -> Option<Line> {
        None
    }
}

/// Audio sink that paces writes to the stream's sample rate. Samples are
/// scaled by the gain for the level meter and then discarded.
#[derive(Debug, Default)]
pub struct PacedAudio {
    config: AudioConfig,
    gain: Gain,
    peak: u16,
}

impl AudioOutput for PacedAudio {
    type Error = core::convert::Infallible;

    fn configure(&mut self, config: AudioConfig) {
        tracing::debug!("audio: {} Hz, {} ch (last peak {})", config.sample_rate, config.channels, self.peak);
        self.config = config;
        self.peak = 0;
    }

    fn set_gain(&mut self, gain: Gain) {
        self.gain = gain;
    }

    async fn write_samples(&mut self, samples: &[i16]) -> Result<(), Self::Error> {
        let gain = self.gain;
        self.peak = samples
            .iter()
            .map(|&s| gain.apply(s).unsigned_abs())
            .fold(self.peak, u16::max);
        let per_second = u64::from(self.config.sample_rate).saturating_mul(u64::from(self.config.channels.max(1)));
        if per_second == 0 {
            return Ok(());
        }
        let micros = u64::try_from(samples.len())
            .unwrap_or(u64::MAX)
            .saturating_mul(1_000_000)
            .checked_div(per_second)
            .unwrap_or(0);
        tokio::time::sleep(std::time::Duration::from_micros(micros)).await;
        Ok(())
    }
}
