//! RIFF/WAVE generator for 16-bit PCM.

use platform::storage::File;
use platform::AudioConfig;

use crate::decoder::{read_full, skip_bytes, DecodeError, Generator};

/// WAVE `fmt ` tag for integer PCM.
const FORMAT_PCM: u16 = 1;

/// Chunks inspected before `data` is given up on.
const MAX_CHUNKS: usize = 16;

const BYTE_BLOCK: usize = 1024;

/// Streams the `data` chunk of a RIFF/WAVE file.
#[derive(Debug, Default)]
pub struct WavGenerator {
    remaining: u32,
    running: bool,
}

impl WavGenerator {
    /// Create a stopped generator.
    pub const fn new() -> Self {
        Self {
            remaining: 0,
            running: false,
        }
    }

    /// Bytes of sample data not yet decoded.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    match bytes.get(at..at.saturating_add(2)) {
        Some(&[a, b]) => u16::from_le_bytes([a, b]),
        _ => 0,
    }
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    match bytes.get(at..at.saturating_add(4)) {
        Some(&[a, b, c, d]) => u32::from_le_bytes([a, b, c, d]),
        _ => 0,
    }
}

/// Parse the 16 mandatory bytes of a `fmt ` chunk.
fn parse_fmt(fmt: &[u8; 16]) -> Result<AudioConfig, DecodeError> {
    let format = le_u16(fmt, 0);
    let channels = le_u16(fmt, 2);
    let sample_rate = le_u32(fmt, 4);
    let bits = le_u16(fmt, 14);
    if format != FORMAT_PCM || bits != 16 {
        return Err(DecodeError::UnsupportedFormat);
    }
    let channels = u8::try_from(channels).map_err(|_| DecodeError::UnsupportedFormat)?;
    if !(1..=2).contains(&channels) || sample_rate == 0 {
        return Err(DecodeError::UnsupportedFormat);
    }
    Ok(AudioConfig {
        sample_rate,
        channels,
        bit_depth: 16,
    })
}

impl Generator for WavGenerator {
    async fn begin<F: File>(&mut self, source: &mut F) -> Result<AudioConfig, DecodeError> {
        self.stop();

        let mut riff = [0u8; 12];
        if read_full(source, &mut riff).await? < riff.len() {
            return Err(DecodeError::EndOfStream);
        }
        if riff.get(..4) != Some(b"RIFF".as_slice()) || riff.get(8..) != Some(b"WAVE".as_slice()) {
            return Err(DecodeError::InvalidData);
        }

        let mut config = None;
        for _ in 0..MAX_CHUNKS {
            let mut header = [0u8; 8];
            if read_full(source, &mut header).await? < header.len() {
                return Err(DecodeError::EndOfStream);
            }
            let size = le_u32(&header, 4);
            // Chunks are word aligned.
            let padded = size.saturating_add(size & 1);

            match header.get(..4) {
                Some(b"fmt ") => {
                    let mut fmt = [0u8; 16];
                    if size < 16 || read_full(source, &mut fmt).await? < fmt.len() {
                        return Err(DecodeError::InvalidData);
                    }
                    config = Some(parse_fmt(&fmt)?);
                    skip_bytes(source, padded.saturating_sub(16)).await?;
                }
                Some(b"data") => {
                    let config = config.ok_or(DecodeError::InvalidData)?;
                    self.remaining = size;
                    self.running = true;
                    tracing::debug!(
                        "wav: {} Hz, {} ch, {} data bytes",
                        config.sample_rate,
                        config.channels,
                        size
                    );
                    return Ok(config);
                }
                _ => skip_bytes(source, padded).await?,
            }
        }
        Err(DecodeError::InvalidData)
    }

    async fn advance<F: File>(&mut self, source: &mut F, out: &mut [i16]) -> Result<usize, DecodeError> {
        if !self.running || self.remaining == 0 {
            self.running = false;
            return Ok(0);
        }

        let mut bytes = [0u8; BYTE_BLOCK];
        let want = usize::try_from(self.remaining)
            .unwrap_or(usize::MAX)
            .min(out.len().saturating_mul(2))
            .min(BYTE_BLOCK);
        let block = bytes.get_mut(..want).unwrap_or(&mut []);
        let n = read_full(source, block).await?;
        self.remaining = self.remaining.saturating_sub(u32::try_from(n).unwrap_or(u32::MAX));
        if n < 2 {
            // Truncated file: treat as end of stream.
            self.running = false;
            return Ok(0);
        }

        let filled = block.get(..n).unwrap_or(&[]);
        let mut written = 0usize;
        for (dst, pair) in out.iter_mut().zip(filled.chunks_exact(2)) {
            if let &[lo, hi] = pair {
                *dst = i16::from_le_bytes([lo, hi]);
                written = written.saturating_add(1);
            }
        }
        Ok(written)
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn stop(&mut self) {
        self.running = false;
        self.remaining = 0;
    }
}

/// Build a minimal 16-bit PCM WAV file in memory.
#[cfg(any(test, feature = "std"))]
pub fn wav_bytes(sample_rate: u32, channels: u16, samples: &[i16]) -> std::vec::Vec<u8> {
    let data_len = u32::try_from(samples.len().saturating_mul(2)).unwrap_or(u32::MAX);
    let mut out = std::vec::Vec::new();
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&data_len.saturating_add(36).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    let block_align = channels.saturating_mul(2);
    out.extend_from_slice(&sample_rate.saturating_mul(u32::from(block_align)).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use platform::mocks::MockStorage;
    use platform::{OpenMode, Storage};

    async fn open(bytes: &[u8]) -> platform::mocks::MockFile {
        let mut storage = MockStorage::new();
        storage.add_file("/t.wav", bytes);
        storage.open_file("/t.wav", OpenMode::Read).await.unwrap()
    }

    #[tokio::test]
    async fn test_begin_reads_format() {
        let mut file = open(&wav_bytes(22_050, 1, &[1, 2, 3])).await;
        let mut wav = WavGenerator::new();
        let config = wav.begin(&mut file).await.unwrap();
        assert_eq!(config.sample_rate, 22_050);
        assert_eq!(config.channels, 1);
        assert!(wav.is_running());
        assert_eq!(wav.remaining(), 6);
    }

    #[tokio::test]
    async fn test_advance_streams_samples_then_ends() {
        let samples: std::vec::Vec<i16> = (0..1000).map(|i| i16::try_from(i).unwrap() - 500).collect();
        let mut file = open(&wav_bytes(44_100, 2, &samples)).await;
        let mut wav = WavGenerator::new();
        wav.begin(&mut file).await.unwrap();

        let mut out = [0i16; 256];
        let mut decoded = std::vec::Vec::new();
        loop {
            let n = wav.advance(&mut file, &mut out).await.unwrap();
            if n == 0 {
                break;
            }
            decoded.extend_from_slice(&out[..n]);
        }
        assert_eq!(decoded, samples);
        assert!(!wav.is_running());
    }

    #[tokio::test]
    async fn test_skips_unknown_chunks() {
        let mut bytes = wav_bytes(8_000, 1, &[7, 8]);
        // Insert an odd-sized LIST chunk (padded) after fmt.
        let list = b"LIST\x03\x00\x00\x00abc\x00";
        let at = 12 + 8 + 16;
        bytes.splice(at..at, list.iter().copied());
        let mut file = open(&bytes).await;
        let mut wav = WavGenerator::new();
        wav.begin(&mut file).await.unwrap();
        let mut out = [0i16; 4];
        assert_eq!(wav.advance(&mut file, &mut out).await.unwrap(), 2);
        assert_eq!(&out[..2], &[7, 8]);
    }

    #[tokio::test]
    async fn test_rejects_non_riff() {
        let mut file = open(b"ID3\x04\x00\x00\x00\x00\x00\x00\x00\x00").await;
        assert_eq!(WavGenerator::new().begin(&mut file).await, Err(DecodeError::InvalidData));
    }

    #[tokio::test]
    async fn test_rejects_8_bit_pcm() {
        let mut bytes = wav_bytes(8_000, 1, &[0]);
        bytes[34] = 8;
        let mut file = open(&bytes).await;
        assert_eq!(WavGenerator::new().begin(&mut file).await, Err(DecodeError::UnsupportedFormat));
    }

    #[tokio::test]
    async fn test_truncated_header() {
        let mut file = open(b"RIFF\x00\x00").await;
        assert_eq!(WavGenerator::new().begin(&mut file).await, Err(DecodeError::EndOfStream));
    }
}
