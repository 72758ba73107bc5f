//! Remote command channel abstraction (BLE notify/write characteristic pair)

/// Wireless transport used by the remote control surface.
///
/// Incoming command text is delivered through [`crate::LineSource`]; this
/// trait covers the outbound side and the advertising lifecycle.
pub trait RemoteTransport {
    /// Error type
    type Error: core::fmt::Debug;

    /// Check if a peer is connected
    fn is_connected(&self) -> bool;

    /// Largest payload accepted by one [`send_chunk`](Self::send_chunk) call
    fn max_chunk_len(&self) -> usize;

    /// Send one notification payload of at most `max_chunk_len` bytes
    async fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), Self::Error>;

    /// Start advertising
    async fn start_advertising(&mut self) -> Result<(), Self::Error>;

    /// Stop advertising
    async fn stop_advertising(&mut self) -> Result<(), Self::Error>;
}
