//! Playlist: fixed-capacity, ordered catalogue of playable entries.
//!
//! Order is playback-significant: it defines next/previous. The playlist is
//! only ever rebuilt wholesale (scan or cache load), never edited in place.

use crate::track::PlaylistEntry;
use heapless::Vec;
use platform::config::MAX_FILES;

/// Error type for playlist operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// The playlist has reached [`MAX_FILES`] entries.
    #[error("playlist is full")]
    Full,
}

/// Ordered playlist of at most [`MAX_FILES`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<PlaylistEntry, MAX_FILES>,
}

impl Playlist {
    /// Create an empty playlist.
    pub const fn new() -> Self {
        Playlist { entries: Vec::new() }
    }

    /// Append `entry` at the end.
    ///
    /// Returns `Err(IndexError::Full)` when capacity is exhausted.
    pub fn push(&mut self, entry: PlaylistEntry) -> Result<(), IndexError> {
        self.entries.push(entry).map_err(|_| IndexError::Full)
    }

    /// Entry at zero-based `pos`, or `None`.
    pub fn get(&self, pos: usize) -> Option<&PlaylistEntry> {
        self.entries.get(pos)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the playlist has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` once no more entries can be added.
    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    /// Entries in playback order.
    pub fn iter(&self) -> impl Iterator<Item = &PlaylistEntry> {
        self.entries.iter()
    }
}
