//! Remote link state tracker.

use embassy_time::{Duration, Instant};

/// Wait after a disconnect before advertising again.
pub const READVERTISE_DELAY: Duration = Duration::from_millis(500);

/// Connection change seen by [`LinkState::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A peer connected since the last update
    Connected,
    /// The peer went away since the last update
    Disconnected,
}

/// Tracks whether a peer is connected and when advertising should resume.
///
/// The transport's callbacks only flip a flag; the control loop samples it
/// through [`update`](Self::update) once per iteration and acts on the edge.
#[derive(Debug)]
pub struct LinkState {
    connected: bool,
    readvertise_at: Option<Instant>,
    readvertise_delay: Duration,
}

impl LinkState {
    /// Create a new, disconnected state.
    pub fn new() -> Self {
        Self::with_readvertise_delay(READVERTISE_DELAY)
    }

    /// Disconnected state with a custom advertising restart delay.
    pub fn with_readvertise_delay(delay: Duration) -> Self {
        LinkState {
            connected: false,
            readvertise_at: None,
            readvertise_delay: delay,
        }
    }

    /// Feed the transport's current connection flag.
    ///
    /// Returns the edge, if any. A disconnect schedules the advertising
    /// restart; a connect cancels a pending one.
    pub fn update(&mut self, connected: bool, now: Instant) -> Option<LinkEvent> {
        if connected == self.connected {
            return None;
        }
        self.connected = connected;
        if connected {
            self.readvertise_at = None;
            tracing::info!("remote peer connected");
            Some(LinkEvent::Connected)
        } else {
            self.readvertise_at = now.checked_add(self.readvertise_delay).or(Some(now));
            tracing::info!("remote peer disconnected");
            Some(LinkEvent::Disconnected)
        }
    }

    /// `true` once, when the post-disconnect delay has elapsed.
    pub fn take_readvertise(&mut self, now: Instant) -> bool {
        match self.readvertise_at {
            Some(at) if now >= at => {
                self.readvertise_at = None;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if a peer is currently connected.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Label shown by the `i` command.
    #[must_use]
    pub fn label(&self) -> &'static str {
        if self.connected {
            "Connected"
        } else {
            "Disconnected"
        }
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}
