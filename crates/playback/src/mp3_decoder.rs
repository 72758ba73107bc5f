//! nanomp3-based MP3 generator.
//!
//! nanomp3 is a pure-Rust, `no_std` c2rust translation of minimp3 with ARM
//! soundness fixes. It has no internal buffering, so this generator keeps a
//! rolling input window that always holds at least one whole frame.
//!
//! # Feature flag
//!
//! The `nanomp3` dependency and the real decode path are both gated behind
//! the `mp3` feature. Without it, `begin` still validates the header but
//! reports [`DecodeError::UnsupportedFormat`].

use library::metadata::detect_kind;
use library::EntryKind;
use platform::storage::File;
use platform::AudioConfig;

use crate::decoder::{DecodeError, Generator};

/// Rolling input window; large enough for the biggest Layer III frame.
const INPUT_LEN: usize = 4096;

/// Sample rate and channel layout from a 4-byte MPEG audio frame header.
///
/// Returns `None` unless the header is a valid Layer III sync.
pub fn parse_frame_header(header: &[u8]) -> Option<AudioConfig> {
    let &[b0, b1, b2, b3, ..] = header else {
        return None;
    };
    if b0 != 0xFF || b1 & 0xE0 != 0xE0 {
        return None;
    }
    // 0b11 = Layer I, 0b10 = Layer II, 0b01 = Layer III
    if (b1 >> 1) & 0b11 != 0b01 {
        return None;
    }
    let base = match (b2 >> 2) & 0b11 {
        0 => 44_100,
        1 => 48_000,
        2 => 32_000,
        _ => return None,
    };
    let sample_rate = match (b1 >> 3) & 0b11 {
        0b11 => base,     // MPEG-1
        0b10 => base / 2, // MPEG-2
        0b00 => base / 4, // MPEG-2.5
        _ => return None,
    };
    let bitrate_index = b2 >> 4;
    if bitrate_index == 0x0F {
        return None;
    }
    let channels = if b3 >> 6 == 0b11 { 1 } else { 2 };
    Some(AudioConfig {
        sample_rate,
        channels,
        bit_depth: 16,
    })
}

/// Total length of an ID3v2 tag starting at `header[0]`, if present.
fn id3_tag_len(header: &[u8]) -> Option<u32> {
    let &[b'I', b'D', b'3', _, _, flags, s0, s1, s2, s3, ..] = header else {
        return None;
    };
    // Synchsafe: 7 significant bits per byte.
    let body = [s0, s1, s2, s3]
        .iter()
        .fold(0u32, |acc, &b| acc.wrapping_shl(7) | u32::from(b & 0x7F));
    let footer = if flags & 0x10 != 0 { 10 } else { 0 };
    Some(body.saturating_add(10).saturating_add(footer))
}

/// MP3 generator backed by nanomp3.
pub struct Mp3Generator {
    input: [u8; INPUT_LEN],
    filled: usize,
    /// Tag bytes still to discard before frame data
    skip: u32,
    eof: bool,
    running: bool,
    #[cfg(feature = "mp3")]
    inner: nanomp3::Decoder,
    #[cfg(feature = "mp3")]
    frame: [f32; nanomp3::MAX_SAMPLES_PER_FRAME],
}

impl Mp3Generator {
    /// Create a stopped generator.
    pub fn new() -> Self {
        Self {
            input: [0; INPUT_LEN],
            filled: 0,
            skip: 0,
            eof: false,
            running: false,
            #[cfg(feature = "mp3")]
            inner: nanomp3::Decoder::new(),
            #[cfg(feature = "mp3")]
            frame: [0.0; nanomp3::MAX_SAMPLES_PER_FRAME],
        }
    }

    fn buffered(&self) -> &[u8] {
        self.input.get(..self.filled).unwrap_or(&[])
    }

    /// Drop `n` bytes from the front of the window.
    fn discard(&mut self, n: usize) {
        let n = n.min(self.filled);
        self.input.copy_within(n..self.filled, 0);
        self.filled = self.filled.saturating_sub(n);
    }

    /// Top up the window from `source`, discarding pending tag bytes.
    async fn refill<F: File>(&mut self, source: &mut F) -> Result<(), DecodeError> {
        while !self.eof && self.filled < INPUT_LEN {
            let free = self.input.get_mut(self.filled..).unwrap_or(&mut []);
            let n = source.read(free).await.map_err(|e| {
                tracing::warn!("mp3: read failed: {:?}", e);
                DecodeError::Io
            })?;
            if n == 0 {
                self.eof = true;
                break;
            }
            self.filled = self.filled.saturating_add(n).min(INPUT_LEN);
            if self.skip > 0 {
                let drop = usize::try_from(self.skip).unwrap_or(usize::MAX).min(self.filled);
                self.discard(drop);
                self.skip = self.skip.saturating_sub(u32::try_from(drop).unwrap_or(u32::MAX));
            }
        }
        Ok(())
    }

    /// Offset of the first Layer III frame header in the window.
    fn find_frame(&self) -> Option<(usize, AudioConfig)> {
        let data = self.buffered();
        (0..data.len()).find_map(|at| {
            let config = parse_frame_header(data.get(at..)?)?;
            Some((at, config))
        })
    }
}

impl Default for Mp3Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for Mp3Generator {
    async fn begin<F: File>(&mut self, source: &mut F) -> Result<AudioConfig, DecodeError> {
        self.stop();
        self.filled = 0;
        self.skip = 0;
        self.eof = false;
        self.refill(source).await?;

        if detect_kind(self.buffered()) != Some(EntryKind::Mp3) {
            return Err(if self.filled == 0 {
                DecodeError::EndOfStream
            } else {
                DecodeError::InvalidData
            });
        }

        if let Some(tag) = id3_tag_len(self.buffered()) {
            let in_window = usize::try_from(tag).unwrap_or(usize::MAX).min(self.filled);
            self.discard(in_window);
            self.skip = tag.saturating_sub(u32::try_from(in_window).unwrap_or(u32::MAX));
            self.refill(source).await?;
        }

        let (offset, config) = self.find_frame().ok_or(DecodeError::InvalidData)?;
        self.discard(offset);
        tracing::debug!("mp3: {} Hz, {} ch", config.sample_rate, config.channels);

        #[cfg(feature = "mp3")]
        {
            self.inner = nanomp3::Decoder::new();
            self.running = true;
            Ok(config)
        }

        #[cfg(not(feature = "mp3"))]
        {
            let _ = config;
            Err(DecodeError::UnsupportedFormat)
        }
    }

    #[cfg(feature = "mp3")]
    async fn advance<F: File>(&mut self, source: &mut F, out: &mut [i16]) -> Result<usize, DecodeError> {
        while self.running {
            self.refill(source).await?;
            if self.filled == 0 {
                break;
            }

            let window = self.input.get(..self.filled).unwrap_or(&[]);
            let (consumed, info) = self.inner.decode(window, &mut self.frame);
            self.discard(consumed);

            match info {
                Some(info) => {
                    // Channel count is 1 or 2.
                    #[allow(clippy::cast_possible_truncation)]
                    let channels = info.channels.num() as usize;
                    let total = info.samples_produced.saturating_mul(channels);
                    let mut written = 0usize;
                    for (dst, &src) in out.iter_mut().zip(self.frame.iter().take(total)) {
                        // Clamped to [-1, 1], the product always fits in i16.
                        #[allow(clippy::cast_possible_truncation)]
                        let sample = (src.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                        *dst = sample;
                        written = written.saturating_add(1);
                    }
                    if written > 0 {
                        return Ok(written);
                    }
                }
                None if consumed == 0 => {
                    if self.eof {
                        break;
                    }
                    if self.filled == INPUT_LEN {
                        // A full window without a frame is garbage.
                        self.filled = 0;
                    }
                }
                None => {}
            }
        }
        self.running = false;
        Ok(0)
    }

    #[cfg(not(feature = "mp3"))]
    async fn advance<F: File>(&mut self, _source: &mut F, _out: &mut [i16]) -> Result<usize, DecodeError> {
        self.running = false;
        Ok(0)
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use platform::mocks::MockStorage;
    use platform::{OpenMode, Storage};

    /// MPEG-1 Layer III, 128 kbps, 44.1 kHz, joint stereo
    const HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];

    #[test]
    fn test_parse_frame_header_mpeg1() {
        let config = parse_frame_header(&HEADER).unwrap();
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.channels, 2);
    }

    #[test]
    fn test_parse_frame_header_mono_mpeg2() {
        // MPEG-2 Layer III, 24 kHz, mono
        let config = parse_frame_header(&[0xFF, 0xF3, 0x94, 0xC0]).unwrap();
        assert_eq!(config.sample_rate, 24_000);
        assert_eq!(config.channels, 1);
    }

    #[test]
    fn test_parse_frame_header_rejects_layer_two() {
        assert!(parse_frame_header(&[0xFF, 0xFD, 0x90, 0x00]).is_none());
        assert!(parse_frame_header(&[0xFF, 0xFB, 0x9C, 0x00]).is_none());
        assert!(parse_frame_header(&[0xFF]).is_none());
    }

    #[test]
    fn test_id3_tag_len_is_synchsafe() {
        let tag = [b'I', b'D', b'3', 4, 0, 0, 0, 0, 0x02, 0x01];
        assert_eq!(id3_tag_len(&tag), Some(10 + 257));
        assert_eq!(id3_tag_len(&HEADER), None);
    }

    async fn begin_with(bytes: &[u8]) -> Result<AudioConfig, DecodeError> {
        let mut storage = MockStorage::new();
        storage.add_file("/t.mp3", bytes);
        let mut file = storage.open_file("/t.mp3", OpenMode::Read).await.unwrap();
        Mp3Generator::new().begin(&mut file).await
    }

    #[tokio::test]
    async fn test_begin_rejects_wav_bytes() {
        assert_eq!(begin_with(b"RIFF\x00\x00\x00\x00WAVE").await, Err(DecodeError::InvalidData));
    }

    #[tokio::test]
    async fn test_begin_rejects_empty_file() {
        assert_eq!(begin_with(&[]).await, Err(DecodeError::EndOfStream));
    }

    #[tokio::test]
    async fn test_begin_skips_id3_tag() {
        let mut bytes = vec![b'I', b'D', b'3', 4, 0, 0, 0, 0, 0, 20];
        bytes.extend_from_slice(&[0xFF; 20]); // tag body full of false syncs
        bytes.extend_from_slice(&HEADER);
        bytes.resize(bytes.len() + 413, 0);
        let result = begin_with(&bytes).await;

        #[cfg(feature = "mp3")]
        assert_eq!(result.unwrap().sample_rate, 44_100);

        #[cfg(not(feature = "mp3"))]
        assert_eq!(result, Err(DecodeError::UnsupportedFormat));
    }
}
