//! Generator abstraction: one interface for every decoder family.
//!
//! A generator pulls bytes from an open [`File`], validates the stream header
//! in [`Generator::begin`], then produces interleaved 16-bit PCM one block at
//! a time in [`Generator::advance`]. The pipeline owns the file handle; the
//! generator only borrows it per call.
//!
//! # Decoder crate selection
//!
//! * **MP3**: `nanomp3` (pure-Rust, `no_std`, c2rust translation of minimp3
//!   with soundness fixes), behind the `mp3` feature.
//! * **WAV**: PCM chunks are parsed directly; no third-party crate needed.

use platform::storage::File;
use platform::AudioConfig;

/// Interleaved samples produced per [`Generator::advance`] call at most.
///
/// Matches one stereo MP3 frame (1 152 samples per channel).
pub const PCM_BLOCK: usize = 2304;

/// Errors that a [`Generator`] may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The stream contains invalid or corrupt data.
    #[error("invalid stream data")]
    InvalidData,
    /// The stream ended before a complete header was read.
    #[error("unexpected end of stream")]
    EndOfStream,
    /// The stream is valid but uses parameters this generator cannot play.
    #[error("unsupported stream format")]
    UnsupportedFormat,
    /// The underlying file read failed.
    #[error("source read failed")]
    Io,
}

/// Frame-by-frame decoder for one file family.
pub trait Generator {
    /// Validate the stream header and position `source` at the first sample.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when the header is missing, corrupt, or
    /// unsupported. The generator is left stopped.
    async fn begin<F: File>(&mut self, source: &mut F) -> Result<AudioConfig, DecodeError>;

    /// Decode the next block into `out`, returning the number of samples
    /// written. `Ok(0)` means end of stream.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] on read failure or corrupt data.
    async fn advance<F: File>(&mut self, source: &mut F, out: &mut [i16]) -> Result<usize, DecodeError>;

    /// `true` between a successful `begin` and end of stream or `stop`
    fn is_running(&self) -> bool;

    /// Stop decoding. Idempotent.
    fn stop(&mut self);
}

/// Fill `buf` from `source`, retrying on short reads.
///
/// Returns the number of bytes read, less than `buf.len()` only at EOF.
pub(crate) async fn read_full<F: File>(source: &mut F, buf: &mut [u8]) -> Result<usize, DecodeError> {
    let mut pos = 0;
    while let Some(rest) = buf.get_mut(pos..) {
        if rest.is_empty() {
            break;
        }
        let n = source.read(rest).await.map_err(|e| {
            tracing::warn!("decoder: read failed: {:?}", e);
            DecodeError::Io
        })?;
        if n == 0 {
            break;
        }
        pos = pos.saturating_add(n);
    }
    Ok(pos)
}

/// Discard `count` bytes from `source`.
pub(crate) async fn skip_bytes<F: File>(source: &mut F, mut count: u32) -> Result<(), DecodeError> {
    let mut scratch = [0u8; 64];
    while count > 0 {
        let want = usize::try_from(count).unwrap_or(usize::MAX).min(scratch.len());
        let chunk = scratch.get_mut(..want).unwrap_or(&mut []);
        let n = read_full(source, chunk).await?;
        if n == 0 {
            return Err(DecodeError::EndOfStream);
        }
        count = count.saturating_sub(u32::try_from(n).unwrap_or(u32::MAX));
    }
    Ok(())
}
