//! Shared response sink for the console and the remote peer.
//!
//! Text written through [`OutputSink`] reaches the local console at once.
//! While a peer is connected the same text is also queued and sent in
//! notification-sized chunks on [`OutputSink::flush`]. Command handlers never
//! know which surface asked.

use core::fmt;

use bluetooth::NotifyQueue;
use embedded_hal_async::delay::DelayNs;
use platform::{ConsoleWriter, RemoteTransport};
use playback::{EventSink, PlaybackEvent};

/// Bytes of remote output buffered between flushes. Holds a full `l` page.
pub const REMOTE_QUEUE_LEN: usize = 4096;

/// Console + remote text sink.
pub struct OutputSink<C, T, D> {
    console: C,
    transport: T,
    delay: D,
    queue: NotifyQueue<REMOTE_QUEUE_LEN>,
    chunk_delay_ms: u32,
}

impl<C, T, D> OutputSink<C, T, D>
where
    C: ConsoleWriter,
    T: RemoteTransport,
    D: DelayNs,
{
    /// Sink pausing `chunk_delay_ms` after every remote chunk
    pub fn new(console: C, transport: T, delay: D, chunk_delay_ms: u32) -> Self {
        Self {
            console,
            transport,
            delay,
            queue: NotifyQueue::new(),
            chunk_delay_ms,
        }
    }

    /// Write `text` plus a newline to both surfaces.
    pub fn println(&mut self, text: &str) {
        self.print(text);
        self.print("\n");
    }

    /// Write `text` to both surfaces.
    pub fn print(&mut self, text: &str) {
        self.console.write_str(text);
        if self.transport.is_connected() {
            // Overflow is logged by the queue; the console copy is complete.
            let _ = self.queue.push_str(text);
        }
    }

    /// Write to the console only.
    pub fn console_line(&mut self, text: &str) {
        self.console.write_str(text);
        self.console.write_str("\n");
    }

    /// Queue text for the remote peer only.
    pub fn remote_line(&mut self, text: &str) {
        if self.transport.is_connected() {
            let _ = self.queue.push_str(text);
            let _ = self.queue.push_str("\n");
        }
    }

    /// Send queued remote text. A failed send drops the rest of the queue.
    pub async fn flush(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        if let Err(e) = self.queue.flush(&mut self.transport, &mut self.delay, self.chunk_delay_ms).await {
            tracing::warn!("remote output dropped: {}", e);
        }
    }

    /// Drop queued remote text, e.g. after the peer went away.
    pub fn discard_remote(&mut self) {
        self.queue.clear();
    }

    /// The local console
    pub fn console(&self) -> &C {
        &self.console
    }

    /// The remote transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The remote transport, for advertising control and incoming lines
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Delay used between remote chunks
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }
}

impl<C, T, D> fmt::Write for OutputSink<C, T, D>
where
    C: ConsoleWriter,
    T: RemoteTransport,
    D: DelayNs,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s);
        Ok(())
    }
}

impl<C, T, D> EventSink for OutputSink<C, T, D>
where
    C: ConsoleWriter,
    T: RemoteTransport,
    D: DelayNs,
{
    fn notify(&mut self, event: PlaybackEvent<'_>) {
        use fmt::Write as _;
        let _ = writeln!(self, "{event}");
    }
}
