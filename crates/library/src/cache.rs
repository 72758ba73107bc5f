//! PlaylistCache: persisted text snapshot of the playlist.
//!
//! # Format
//!
//! ```text
//! V1
//! <count>
//! <path>|<flag>|<size>      (count lines, flag 1 = MP3, 0 = WAV)
//! ```
//!
//! Loading is tolerant: malformed lines and entries whose file has vanished
//! are skipped with a warning, and a truncated file simply yields fewer
//! entries. Saving overwrites in place.

use core::fmt::Write as _;

use heapless::{String, Vec};
use platform::config::{CACHE_FILE_PATH, MAX_FILES, MAX_PATH_LEN};
use platform::storage::{File, OpenMode, Storage};

use crate::index::Playlist;
use crate::track::{normalize_path, EntryKind, PlaylistEntry};

/// Version tag on the first line.
pub const CACHE_VERSION: &str = "V1";

/// Longest cache line accepted; longer lines are treated as malformed.
pub const MAX_CACHE_LINE: usize = 256;

const READ_CHUNK: usize = 64;

/// Reasons the cache cannot be used. All of them mean "rescan".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// No cache file on the card.
    #[error("no cache file found")]
    NotFound,
    /// The file exists but could not be opened or read.
    #[error("failed to open cache file")]
    Unreadable,
    /// First line is not `V1`.
    #[error("invalid cache version")]
    InvalidVersion,
    /// Declared count is not in `1..=MAX_FILES`.
    #[error("invalid file count in cache")]
    InvalidCount,
    /// Header was fine but no entry survived validation.
    #[error("no valid entries in cache")]
    NoValidEntries,
    /// The cache file could not be written.
    #[error("failed to write cache file")]
    WriteFailed,
}

/// Per-line conditions recovered during load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CacheWarning {
    /// Fewer than two `|` separators, empty path, or unreadable text.
    #[error("malformed cache line")]
    MalformedLine,
    /// Entry refers to a file that no longer exists.
    #[error("cached file missing")]
    StaleEntry,
}

/// Counters gathered by [`PlaylistCache::load_with_report`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Count declared on line 2
    pub declared: usize,
    /// Entries accepted
    pub loaded: usize,
    /// Lines skipped as [`CacheWarning::MalformedLine`]
    pub malformed: usize,
    /// Lines skipped as [`CacheWarning::StaleEntry`]
    pub stale: usize,
}

impl LoadReport {
    fn record(&mut self, warning: CacheWarning) {
        let counter = match warning {
            CacheWarning::MalformedLine => &mut self.malformed,
            CacheWarning::StaleEntry => &mut self.stale,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Cache file handle.
#[derive(Debug, Clone, Copy)]
pub struct PlaylistCache {
    path: &'static str,
}

impl Default for PlaylistCache {
    fn default() -> Self {
        Self::new(CACHE_FILE_PATH)
    }
}

impl PlaylistCache {
    /// Cache stored at absolute `path`.
    pub const fn new(path: &'static str) -> Self {
        Self { path }
    }

    /// Path of the cache file
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Load the playlist.
    ///
    /// # Errors
    ///
    /// Any [`CacheError`] means the cache is unusable and the caller should
    /// rescan.
    pub async fn load<S: Storage>(&self, storage: &mut S) -> Result<Playlist, CacheError> {
        self.load_with_report(storage).await.map(|(playlist, _)| playlist)
    }

    /// Load the playlist, also returning how many lines were skipped.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn load_with_report<S: Storage>(
        &self,
        storage: &mut S,
    ) -> Result<(Playlist, LoadReport), CacheError> {
        match storage.exists(self.path).await {
            Ok(true) => {}
            Ok(false) => return Err(CacheError::NotFound),
            Err(e) => {
                tracing::warn!("cache: exists check failed: {:?}", e);
                return Err(CacheError::Unreadable);
            }
        }

        let mut file = storage.open_file(self.path, OpenMode::Read).await.map_err(|e| {
            tracing::warn!("cache: open failed: {:?}", e);
            CacheError::Unreadable
        })?;
        let mut lines = LineReader::new(&mut file);

        match lines.next_line().await {
            Ok(Some(RawLine::Text(version))) if version.trim() == CACHE_VERSION => {}
            Ok(_) => return Err(CacheError::InvalidVersion),
            Err(()) => return Err(CacheError::Unreadable),
        }

        let declared = match lines.next_line().await {
            Ok(Some(RawLine::Text(count))) => parse_leading_int(count.trim()),
            Ok(_) => 0,
            Err(()) => return Err(CacheError::Unreadable),
        };
        let declared = match usize::try_from(declared) {
            Ok(n) if (1..=MAX_FILES).contains(&n) => n,
            _ => return Err(CacheError::InvalidCount),
        };

        let mut report = LoadReport {
            declared,
            ..LoadReport::default()
        };
        let mut playlist = Playlist::new();
        while playlist.len() < declared {
            let parsed = match lines.next_line().await {
                Ok(Some(RawLine::Text(line))) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    parse_entry(line)
                }
                Ok(Some(RawLine::Garbled)) => None,
                Ok(None) => break,
                Err(()) => {
                    tracing::warn!("cache: read error, keeping {} entries", playlist.len());
                    break;
                }
            };

            let Some(entry) = parsed else {
                tracing::warn!("cache: {}", CacheWarning::MalformedLine);
                report.record(CacheWarning::MalformedLine);
                continue;
            };

            if !path_exists(storage, entry.path.as_str()).await {
                tracing::warn!("cache: {}: {}", CacheWarning::StaleEntry, entry.path.as_str());
                report.record(CacheWarning::StaleEntry);
                continue;
            }

            tracing::debug!("cache: loaded {}", entry.path.as_str());
            if playlist.push(entry).is_err() {
                break;
            }
        }

        report.loaded = playlist.len();
        if playlist.is_empty() {
            return Err(CacheError::NoValidEntries);
        }
        tracing::info!("cache: loaded {} files from cache", report.loaded);
        Ok((playlist, report))
    }

    /// Overwrite the cache with `playlist`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::WriteFailed`] if the file cannot be created or
    /// a write is refused. A partial write leaves a truncated cache behind,
    /// which the next load tolerates.
    pub async fn save<S: Storage>(&self, storage: &mut S, playlist: &Playlist) -> Result<(), CacheError> {
        let mut file = storage.open_file(self.path, OpenMode::Write).await.map_err(|e| {
            tracing::warn!("cache: create failed: {:?}", e);
            CacheError::WriteFailed
        })?;

        let mut line: String<{ MAX_PATH_LEN + 16 }> = String::new();
        write_line(&mut file, &mut line, format_args!("{CACHE_VERSION}")).await?;
        write_line(&mut file, &mut line, format_args!("{}", playlist.len())).await?;
        for entry in playlist.iter() {
            write_line(
                &mut file,
                &mut line,
                format_args!("{}|{}|{}", entry.path.as_str(), entry.kind.cache_flag(), entry.size),
            )
            .await?;
        }

        tracing::info!("cache: saved {} entries", playlist.len());
        Ok(())
    }
}

/// Split `path|flag|size` on the first and last `|`.
fn parse_entry(line: &str) -> Option<PlaylistEntry> {
    let first = line.find('|')?;
    let last = line.rfind('|')?;
    if first == last {
        return None;
    }
    let path = line.get(..first)?;
    let flag = line.get(first.saturating_add(1)..last)?;
    let size = line.get(last.saturating_add(1)..)?;
    if path.is_empty() {
        return None;
    }
    let size = u32::try_from(parse_leading_int(size).max(0)).unwrap_or(u32::MAX);
    Some(PlaylistEntry {
        path: normalize_path(path),
        kind: EntryKind::from_cache_flag(flag),
        size,
    })
}

/// Parse an optional sign followed by leading decimal digits. Anything after
/// the digits is ignored and no digits at all reads as 0.
fn parse_leading_int(text: &str) -> i64 {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b.wrapping_sub(b'0')))
        });
    if negative {
        value.saturating_neg()
    } else {
        value
    }
}

async fn path_exists<S: Storage>(storage: &mut S, path: &str) -> bool {
    match storage.exists(path).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!("cache: exists check failed for {}: {:?}", path, e);
            false
        }
    }
}

async fn write_line<F: File, const N: usize>(
    file: &mut F,
    line: &mut String<N>,
    args: core::fmt::Arguments<'_>,
) -> Result<(), CacheError> {
    line.clear();
    line.write_fmt(args).map_err(|_| CacheError::WriteFailed)?;
    line.push('\n').map_err(|_| CacheError::WriteFailed)?;
    write_all(file, line.as_bytes()).await
}

async fn write_all<F: File>(file: &mut F, mut bytes: &[u8]) -> Result<(), CacheError> {
    while !bytes.is_empty() {
        let n = file.write(bytes).await.map_err(|e| {
            tracing::warn!("cache: write failed: {:?}", e);
            CacheError::WriteFailed
        })?;
        if n == 0 {
            return Err(CacheError::WriteFailed);
        }
        bytes = bytes.get(n..).unwrap_or(&[]);
    }
    Ok(())
}

/// One line as returned by [`LineReader::next_line`].
enum RawLine<'a> {
    /// Valid UTF-8 without the trailing newline
    Text(&'a str),
    /// Longer than [`MAX_CACHE_LINE`] or not UTF-8
    Garbled,
}

/// Buffered newline splitter over a [`File`].
struct LineReader<'f, F: File> {
    file: &'f mut F,
    chunk: [u8; READ_CHUNK],
    start: usize,
    end: usize,
    line: Vec<u8, MAX_CACHE_LINE>,
    overflowed: bool,
}

impl<'f, F: File> LineReader<'f, F> {
    fn new(file: &'f mut F) -> Self {
        Self {
            file,
            chunk: [0; READ_CHUNK],
            start: 0,
            end: 0,
            line: Vec::new(),
            overflowed: false,
        }
    }

    /// Next line, or `Ok(None)` at end of file. Read errors are logged and
    /// reported as `Err(())`.
    async fn next_line(&mut self) -> Result<Option<RawLine<'_>>, ()> {
        self.line.clear();
        self.overflowed = false;
        let mut seen = false;
        loop {
            if self.start >= self.end {
                let n = self.file.read(&mut self.chunk).await.map_err(|e| {
                    tracing::warn!("cache: read failed: {:?}", e);
                })?;
                if n == 0 {
                    break;
                }
                self.start = 0;
                self.end = n.min(READ_CHUNK);
            }
            seen = true;
            let pending = self.chunk.get(self.start..self.end).unwrap_or(&[]);
            match pending.iter().position(|&b| b == b'\n') {
                Some(i) => {
                    let head = pending.get(..i).unwrap_or(&[]);
                    if self.line.extend_from_slice(head).is_err() {
                        self.overflowed = true;
                    }
                    self.start = self.start.saturating_add(i).saturating_add(1);
                    return Ok(Some(self.finish()));
                }
                None => {
                    if self.line.extend_from_slice(pending).is_err() {
                        self.overflowed = true;
                    }
                    self.start = self.end;
                }
            }
        }
        if seen {
            Ok(Some(self.finish()))
        } else {
            Ok(None)
        }
    }

    fn finish(&self) -> RawLine<'_> {
        if self.overflowed {
            return RawLine::Garbled;
        }
        match core::str::from_utf8(&self.line) {
            Ok(text) => RawLine::Text(text),
            Err(_) => RawLine::Garbled,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use platform::mocks::MockStorage;

    fn card_with(files: &[(&str, usize)], cache: &str) -> MockStorage {
        let storage = MockStorage::new();
        for (path, size) in files {
            storage.add_sized_file(path, *size);
        }
        storage.add_file(CACHE_FILE_PATH, cache.as_bytes());
        storage
    }

    #[test]
    fn test_parse_entry_uses_first_and_last_pipe() {
        let e = parse_entry("/a|b.mp3|1|100").unwrap();
        assert_eq!(e.path.as_str(), "/a");
        // Middle field "b.mp3|1" is not exactly "1".
        assert_eq!(e.kind, EntryKind::Wav);
        assert_eq!(e.size, 100);
    }

    #[test]
    fn test_parse_entry_rejects_single_pipe() {
        assert!(parse_entry("/a.mp3|1").is_none());
        assert!(parse_entry("/a.mp3").is_none());
        assert!(parse_entry("|1|5").is_none());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), 42);
        assert_eq!(parse_leading_int("7abc"), 7);
        assert_eq!(parse_leading_int("-3"), -3);
        assert_eq!(parse_leading_int("abc"), 0);
        assert_eq!(parse_leading_int(""), 0);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let mut storage = MockStorage::new();
        let err = PlaylistCache::default().load(&mut storage).await.unwrap_err();
        assert_eq!(err, CacheError::NotFound);
    }

    #[tokio::test]
    async fn test_load_wrong_version() {
        let mut storage = card_with(&[("/a.mp3", 1)], "V2\n1\n/a.mp3|1|1\n");
        let err = PlaylistCache::default().load(&mut storage).await.unwrap_err();
        assert_eq!(err, CacheError::InvalidVersion);
    }

    #[tokio::test]
    async fn test_load_invalid_counts() {
        for count in ["0", "-1", "301", "abc"] {
            let text = format!("V1\n{count}\n/a.mp3|1|1\n");
            let mut storage = card_with(&[("/a.mp3", 1)], &text);
            let err = PlaylistCache::default().load(&mut storage).await.unwrap_err();
            assert_eq!(err, CacheError::InvalidCount, "count {count}");
        }
    }

    #[tokio::test]
    async fn test_load_skips_stale_entries_and_keeps_reading() {
        let mut storage = card_with(
            &[("/b.wav", 2), ("/c.mp3", 3)],
            "V1\n2\n/a.mp3|1|1\n/b.wav|0|2\n/c.mp3|1|3\n",
        );
        let (playlist, report) = PlaylistCache::default().load_with_report(&mut storage).await.unwrap();
        assert_eq!(playlist.len(), 2);
        assert_eq!(playlist.get(0).unwrap().path.as_str(), "/b.wav");
        assert_eq!(playlist.get(1).unwrap().path.as_str(), "/c.mp3");
        assert_eq!(report.stale, 1);
        assert_eq!(report.loaded, 2);
    }

    #[tokio::test]
    async fn test_load_stops_at_declared_count() {
        let mut storage = card_with(&[("/a.mp3", 1), ("/b.mp3", 1)], "V1\n1\n/a.mp3|1|1\n/b.mp3|1|1\n");
        let playlist = PlaylistCache::default().load(&mut storage).await.unwrap();
        assert_eq!(playlist.len(), 1);
    }

    #[tokio::test]
    async fn test_load_all_stale_is_no_valid_entries() {
        let mut storage = card_with(&[], "V1\n1\n/gone.mp3|1|1\n");
        let err = PlaylistCache::default().load(&mut storage).await.unwrap_err();
        assert_eq!(err, CacheError::NoValidEntries);
    }

    #[tokio::test]
    async fn test_load_handles_crlf_and_blank_lines() {
        let mut storage = card_with(&[("/a.mp3", 9)], "V1\r\n1\r\n\r\n/a.mp3|1|9\r\n");
        let playlist = PlaylistCache::default().load(&mut storage).await.unwrap();
        let e = playlist.get(0).unwrap();
        assert_eq!((e.path.as_str(), e.kind, e.size), ("/a.mp3", EntryKind::Mp3, 9));
    }

    #[tokio::test]
    async fn test_load_overlong_line_is_malformed() {
        let long = format!("/{}.mp3|1|1", "x".repeat(300));
        let text = format!("V1\n2\n{long}\n/a.mp3|1|1\n");
        let mut storage = card_with(&[("/a.mp3", 1)], &text);
        let (playlist, report) = PlaylistCache::default().load_with_report(&mut storage).await.unwrap();
        assert_eq!(playlist.len(), 1);
        assert_eq!(report.malformed, 1);
    }

    #[tokio::test]
    async fn test_save_writes_exact_text() {
        let mut storage = MockStorage::new();
        let mut playlist = Playlist::new();
        playlist.push(PlaylistEntry::new("/a.mp3", EntryKind::Mp3, 100).unwrap()).unwrap();
        playlist.push(PlaylistEntry::new("/B.WAV", EntryKind::Wav, 200).unwrap()).unwrap();
        PlaylistCache::default().save(&mut storage, &playlist).await.unwrap();
        let written = storage.contents(CACHE_FILE_PATH).unwrap();
        assert_eq!(written, b"V1\n2\n/a.mp3|1|100\n/B.WAV|0|200\n");
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_cache() {
        let mut storage = card_with(&[], "V1\n9\nold|1|1\n");
        PlaylistCache::default().save(&mut storage, &Playlist::new()).await.unwrap();
        assert_eq!(storage.contents(CACHE_FILE_PATH).unwrap(), b"V1\n0\n");
    }
}
