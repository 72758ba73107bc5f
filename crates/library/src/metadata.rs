//! Metadata: magic-byte format detection.
//!
//! No file-system I/O is performed here; the caller supplies the bytes.
//! The decode pipeline uses this to reject a file whose contents do not
//! match the kind its extension promised.

use crate::track::EntryKind;

/// Detect the decoder family from the first bytes of a file.
///
/// | Kind | Magic bytes                                             |
/// |------|---------------------------------------------------------|
/// | MP3  | `ID3` (0x49 0x44 0x33)                                  |
/// | MP3  | MPEG sync word (0xFF, high 3 bits of next byte = 0xE0)  |
/// | WAV  | `RIFF` (0x52 0x49 0x46 0x46)                            |
///
/// Returns `None` when the header is too short or unknown.
pub fn detect_kind(header: &[u8]) -> Option<EntryKind> {
    if header.starts_with(b"ID3") {
        return Some(EntryKind::Mp3);
    }

    if let [0xFF, second, ..] = header {
        if second & 0xE0 == 0xE0 {
            return Some(EntryKind::Mp3);
        }
    }

    if header.starts_with(b"RIFF") {
        return Some(EntryKind::Wav);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp3_id3_signature() {
        assert_eq!(detect_kind(&[0x49, 0x44, 0x33, 0x03]), Some(EntryKind::Mp3));
    }

    #[test]
    fn test_mp3_sync_signature() {
        // MPEG1, Layer III, 128 kbps
        assert_eq!(detect_kind(&[0xFF, 0xFB, 0x90, 0x00]), Some(EntryKind::Mp3));
    }

    #[test]
    fn test_wav_riff_signature() {
        assert_eq!(detect_kind(b"RIFF\x24\x08\x00\x00WAVE"), Some(EntryKind::Wav));
    }

    #[test]
    fn test_flac_is_not_playable() {
        assert_eq!(detect_kind(b"fLaC"), None);
    }

    #[test]
    fn test_short_or_empty_header() {
        assert_eq!(detect_kind(&[0xFF]), None);
        assert_eq!(detect_kind(&[]), None);
    }
}
