//! PlaylistEntry: core data type representing a single playable file.

use heapless::String;
use platform::config::MAX_PATH_LEN;

/// Absolute path of a playlist entry, at most [`MAX_PATH_LEN`] bytes.
pub type EntryPath = String<MAX_PATH_LEN>;

/// Decoder family of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// MPEG Audio Layer III
    Mp3,
    /// Waveform Audio File Format
    Wav,
}

impl EntryKind {
    /// Classify a file name by its last four characters (`.mp3` / `.wav`,
    /// case-insensitive). Anything else is not playable.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.len().checked_sub(4).and_then(|start| name.get(start..))?;
        if ext.eq_ignore_ascii_case(".mp3") {
            Some(Self::Mp3)
        } else if ext.eq_ignore_ascii_case(".wav") {
            Some(Self::Wav)
        } else {
            None
        }
    }

    /// Flag written to the cache file: `1` for MP3, `0` for WAV.
    pub const fn cache_flag(self) -> char {
        match self {
            Self::Mp3 => '1',
            Self::Wav => '0',
        }
    }

    /// Inverse of [`cache_flag`](Self::cache_flag). Only an exact `1` means
    /// MP3; every other flag reads back as WAV.
    pub fn from_cache_flag(flag: &str) -> Self {
        if flag == "1" {
            Self::Mp3
        } else {
            Self::Wav
        }
    }
}

/// One playable file. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Absolute path on the card, always starting with `/`
    pub path: EntryPath,
    /// Decoder family
    pub kind: EntryKind,
    /// File size in bytes
    pub size: u32,
}

impl PlaylistEntry {
    /// Build an entry from a raw name, normalizing it with [`normalize_path`].
    ///
    /// Returns `None` for an empty name.
    pub fn new(name: &str, kind: EntryKind, size: u32) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        Some(Self {
            path: normalize_path(name),
            kind,
            size,
        })
    }

    /// File name without the leading `/`
    pub fn file_name(&self) -> &str {
        self.path.as_str().trim_start_matches('/')
    }
}

/// Make `name` absolute and fit it into [`EntryPath`].
///
/// A name that already starts with `/` is kept as-is, otherwise `/` is
/// prepended. Overlong results are truncated to [`MAX_PATH_LEN`] bytes on a
/// character boundary.
pub fn normalize_path(name: &str) -> EntryPath {
    let mut path = EntryPath::new();
    if !name.starts_with('/') {
        // Capacity is non-zero, the first push cannot fail.
        let _ = path.push('/');
    }
    for c in name.chars() {
        if path.push(c).is_err() {
            break;
        }
    }
    path
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension_is_case_insensitive() {
        assert_eq!(EntryKind::from_file_name("a.mp3"), Some(EntryKind::Mp3));
        assert_eq!(EntryKind::from_file_name("B.WAV"), Some(EntryKind::Wav));
        assert_eq!(EntryKind::from_file_name("Song.Mp3"), Some(EntryKind::Mp3));
    }

    #[test]
    fn test_kind_rejects_other_extensions() {
        assert_eq!(EntryKind::from_file_name("cover.jpg"), None);
        assert_eq!(EntryKind::from_file_name("track.flac"), None);
        assert_eq!(EntryKind::from_file_name("mp3"), None);
        assert_eq!(EntryKind::from_file_name(""), None);
    }

    #[test]
    fn test_kind_on_bare_extension() {
        // Exactly four characters still match.
        assert_eq!(EntryKind::from_file_name(".wav"), Some(EntryKind::Wav));
    }

    #[test]
    fn test_kind_with_multibyte_tail_is_rejected() {
        assert_eq!(EntryKind::from_file_name("tüne"), None);
    }

    #[test]
    fn test_cache_flag_round_trip() {
        assert_eq!(EntryKind::from_cache_flag("1"), EntryKind::Mp3);
        assert_eq!(EntryKind::from_cache_flag("0"), EntryKind::Wav);
        assert_eq!(EntryKind::from_cache_flag("x"), EntryKind::Wav);
        assert_eq!(EntryKind::Mp3.cache_flag(), '1');
        assert_eq!(EntryKind::Wav.cache_flag(), '0');
    }

    #[test]
    fn test_normalize_prefixes_slash() {
        assert_eq!(normalize_path("a.mp3").as_str(), "/a.mp3");
        assert_eq!(normalize_path("/a.mp3").as_str(), "/a.mp3");
    }

    #[test]
    fn test_normalize_truncates_to_limit() {
        let long = "x".repeat(200);
        let path = normalize_path(&long);
        assert_eq!(path.len(), MAX_PATH_LEN);
        assert!(path.starts_with('/'));
    }

    #[test]
    fn test_normalize_truncates_on_char_boundary() {
        // 126 ASCII bytes after the slash leaves one byte, too small for 'é'.
        let name = format!("{}é", "a".repeat(126));
        let path = normalize_path(&name);
        assert_eq!(path.len(), MAX_PATH_LEN);
        assert!(path.ends_with('a'));
    }

    #[test]
    fn test_entry_rejects_empty_name() {
        assert!(PlaylistEntry::new("", EntryKind::Mp3, 0).is_none());
        let e = PlaylistEntry::new("x.wav", EntryKind::Wav, 5).unwrap();
        assert_eq!(e.file_name(), "x.wav");
    }
}
