//! Outbound notification chunking.
//!
//! A BLE notification carries at most a transport-defined payload (20 bytes
//! on the default ATT MTU). Response text is queued while a command runs and
//! sent in pieces on flush, never splitting a UTF-8 sequence.

use embedded_hal_async::delay::DelayNs;
use platform::RemoteTransport;

/// Errors from queueing or sending notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// The queue was full; the tail of the text was dropped
    #[error("notification queue full")]
    Overflow,
    /// The transport refused a chunk; the rest of the queue was dropped
    #[error("transport rejected chunk")]
    Transport,
}

/// Iterator over `text` in pieces of at most `max` bytes, split on char
/// boundaries.
///
/// A single character wider than `max` is yielded on its own.
#[derive(Debug, Clone)]
pub struct Utf8Chunks<'a> {
    rest: &'a str,
    max: usize,
}

/// Split `text` into chunks of at most `max` bytes.
pub fn chunks(text: &str, max: usize) -> Utf8Chunks<'_> {
    Utf8Chunks { rest: text, max }
}

impl<'a> Iterator for Utf8Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let mut end = self.max.min(self.rest.len());
        while end > 0 && !self.rest.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        if end == 0 {
            end = self.rest.chars().next().map_or(self.rest.len(), char::len_utf8);
        }
        let (head, tail) = self.rest.split_at_checked(end)?;
        self.rest = tail;
        Some(head)
    }
}

/// Fixed-capacity buffer of text waiting for the remote peer.
#[derive(Debug, Default)]
pub struct NotifyQueue<const N: usize> {
    pending: heapless::String<N>,
}

impl<const N: usize> NotifyQueue<N> {
    /// Empty queue
    pub const fn new() -> Self {
        Self {
            pending: heapless::String::new(),
        }
    }

    /// Append `text`. On overflow as much as fits is kept.
    ///
    /// # Errors
    ///
    /// [`NotifyError::Overflow`] when part of `text` was dropped.
    pub fn push_str(&mut self, text: &str) -> Result<(), NotifyError> {
        if self.pending.push_str(text).is_ok() {
            return Ok(());
        }
        for c in text.chars() {
            if self.pending.push(c).is_err() {
                break;
            }
        }
        tracing::warn!("notify queue full, dropping output");
        Err(NotifyError::Overflow)
    }

    /// Text waiting to be sent
    pub fn as_str(&self) -> &str {
        self.pending.as_str()
    }

    /// `true` when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything queued
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Send the queue in chunks of `transport.max_chunk_len()` bytes, waiting
    /// `chunk_delay_ms` after each one. The queue is empty afterwards.
    ///
    /// Without a connected peer the text is discarded. Returns the number of
    /// chunks sent.
    ///
    /// # Errors
    ///
    /// [`NotifyError::Transport`] when a send fails; the remainder is dropped.
    pub async fn flush<T, D>(&mut self, transport: &mut T, delay: &mut D, chunk_delay_ms: u32) -> Result<usize, NotifyError>
    where
        T: RemoteTransport,
        D: DelayNs,
    {
        if !transport.is_connected() {
            self.pending.clear();
            return Ok(0);
        }
        let max = transport.max_chunk_len();
        let mut sent = 0usize;
        let mut result = Ok(());
        for chunk in chunks(self.pending.as_str(), max) {
            if let Err(e) = transport.send_chunk(chunk.as_bytes()).await {
                tracing::warn!("notify chunk failed: {:?}", e);
                result = Err(NotifyError::Transport);
                break;
            }
            sent = sent.saturating_add(1);
            delay.delay_ms(chunk_delay_ms).await;
        }
        self.pending.clear();
        result.map(|()| sent)
    }
}
