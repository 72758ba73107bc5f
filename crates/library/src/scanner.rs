//! Scanner: walks the card root and builds a playlist from audio files.

use platform::storage::{Directory, Storage};

use crate::index::Playlist;
use crate::track::{EntryKind, PlaylistEntry};

/// Error from [`LibraryScanner::scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// The root directory could not be opened.
    #[error("failed to open root directory")]
    RootUnavailable,
}

/// Stateless helper for root listing and extension filtering.
pub struct LibraryScanner;

impl LibraryScanner {
    /// Returns `true` when `name` ends in `.mp3` or `.wav` (any case).
    pub fn is_audio_file(name: &str) -> bool {
        EntryKind::from_file_name(name).is_some()
    }

    /// Enumerate the storage root (non-recursive) into a playlist.
    ///
    /// Directories and non-audio files are skipped. Entries past the playlist
    /// capacity are ignored. An empty result is not an error here; callers
    /// decide whether zero entries is fatal.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::RootUnavailable`] if the root cannot be opened.
    pub async fn scan<S: Storage>(storage: &mut S) -> Result<Playlist, ScanError> {
        let mut root = storage.open_root().await.map_err(|e| {
            tracing::warn!("scan: open root failed: {:?}", e);
            ScanError::RootUnavailable
        })?;

        let mut playlist = Playlist::new();
        while !playlist.is_full() {
            let entry = match root.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("scan: listing aborted: {:?}", e);
                    break;
                }
            };
            if entry.is_dir {
                continue;
            }
            let Some(kind) = EntryKind::from_file_name(entry.name.as_str()) else {
                continue;
            };
            if let Some(item) = PlaylistEntry::new(entry.name.as_str(), kind, entry.size) {
                tracing::debug!("scan: {} ({:?}, {} bytes)", item.path.as_str(), kind, item.size);
                // Loop condition guarantees room.
                let _ = playlist.push(item);
            }
        }

        tracing::info!("scan: found {} audio files", playlist.len());
        Ok(playlist)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use platform::mocks::MockStorage;

    #[test]
    fn test_scanner_recognises_audio_extensions() {
        assert!(LibraryScanner::is_audio_file("a.mp3"));
        assert!(LibraryScanner::is_audio_file("B.WAV"));
        assert!(!LibraryScanner::is_audio_file("cover.jpg"));
        assert!(!LibraryScanner::is_audio_file(""));
    }

    #[tokio::test]
    async fn test_scan_keeps_listing_order_and_kinds() {
        let mut storage = MockStorage::new();
        storage.add_sized_file("/a.mp3", 100);
        storage.add_sized_file("/B.WAV", 200);
        let playlist = LibraryScanner::scan(&mut storage).await.unwrap();
        assert_eq!(playlist.len(), 2);
        let a = playlist.get(0).unwrap();
        assert_eq!((a.path.as_str(), a.kind, a.size), ("/a.mp3", EntryKind::Mp3, 100));
        let b = playlist.get(1).unwrap();
        assert_eq!((b.path.as_str(), b.kind, b.size), ("/B.WAV", EntryKind::Wav, 200));
    }

    #[tokio::test]
    async fn test_scan_skips_directories_and_other_files() {
        let mut storage = MockStorage::new();
        storage.add_dir("/music.mp3");
        storage.add_sized_file("/notes.txt", 3);
        storage.add_sized_file("/song.wav", 10);
        let playlist = LibraryScanner::scan(&mut storage).await.unwrap();
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.get(0).unwrap().path.as_str(), "/song.wav");
    }

    #[tokio::test]
    async fn test_scan_stops_at_capacity() {
        let mut storage = MockStorage::new();
        for i in 0..310 {
            storage.add_sized_file(&format!("/t{i:03}.mp3"), 1);
        }
        let playlist = LibraryScanner::scan(&mut storage).await.unwrap();
        assert_eq!(playlist.len(), platform::config::MAX_FILES);
        assert_eq!(playlist.get(299).unwrap().path.as_str(), "/t299.mp3");
    }

    #[tokio::test]
    async fn test_scan_root_unavailable() {
        let mut storage = MockStorage::new();
        storage.set_root_unavailable(true);
        assert_eq!(LibraryScanner::scan(&mut storage).await, Err(ScanError::RootUnavailable));
    }

    #[tokio::test]
    async fn test_scan_empty_card_is_ok() {
        let mut storage = MockStorage::new();
        let playlist = LibraryScanner::scan(&mut storage).await.unwrap();
        assert!(playlist.is_empty());
    }
}
