//! Local filesystem Storage implementation for the desktop player.
//!
//! `LocalFileStorage` implements `platform::Storage` using `std::fs`.
//! Used when the `std` feature is enabled (host builds only).
//! Absolute card paths (`/track.mp3`) are resolved relative to the music
//! directory provided at construction.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use heapless::String;

use crate::storage::{DirEntry, Directory, File, OpenMode, Storage, MAX_NAME_LEN};

/// Error type for local filesystem operations.
#[derive(Debug, thiserror::Error)]
#[error("local storage error: {0}")]
pub struct LocalStorageError(#[from] pub std::io::Error);

/// An open file on the local filesystem.
pub struct LocalFile {
    inner: fs::File,
    size: u64,
}

impl File for LocalFile {
    type Error = LocalStorageError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Read::read(&mut self.inner, buf).map_err(LocalStorageError)
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Write::write(&mut self.inner, buf).map_err(LocalStorageError)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Root directory listing, sorted by name so scan order is reproducible
/// across host filesystems.
pub struct LocalDir {
    entries: std::vec::IntoIter<DirEntry>,
}

impl Directory for LocalDir {
    type Error = LocalStorageError;

    async fn next_entry(&mut self) -> Result<Option<DirEntry>, Self::Error> {
        Ok(self.entries.next())
    }
}

/// A `platform::Storage` implementation backed by `std::fs`.
///
/// # Example
/// ```no_run
/// # async fn example() {
/// use platform::storage_local::LocalFileStorage;
/// use platform::{OpenMode, Storage};
/// let mut storage = LocalFileStorage::new("/home/user/music");
/// let file = storage.open_file("/track.mp3", OpenMode::Read).await.unwrap();
/// # }
/// ```
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create a new storage rooted at `music_root`.
    #[must_use]
    pub fn new(music_root: &str) -> Self {
        Self { root: PathBuf::from(music_root) }
    }

    /// Create from the `MUSIC_PATH` environment variable.
    ///
    /// Returns `None` if `MUSIC_PATH` is not set or is not valid UTF-8.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var("MUSIC_PATH").ok().map(|p| Self::new(&p))
    }

    fn resolve(&self, path: &str) -> PathBuf {
        // `PathBuf::join` replaces the base for absolute paths.
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Storage for LocalFileStorage {
    type Error = LocalStorageError;
    type File = LocalFile;
    type Dir = LocalDir;

    async fn open_file(&mut self, path: &str, mode: OpenMode) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path);
        let file = match mode {
            OpenMode::Read => fs::File::open(&full)?,
            OpenMode::Write => fs::File::create(&full)?,
        };
        let meta = file.metadata()?;
        Ok(LocalFile { inner: file, size: meta.len() })
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        Ok(self.resolve(path).exists())
    }

    async fn open_root(&mut self) -> Result<Self::Dir, Self::Error> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            let os_name = entry.file_name();
            let Some(name) = os_name.to_str() else {
                continue; // non-UTF-8 names cannot be stored in the playlist
            };
            let Ok(name) = String::<MAX_NAME_LEN>::try_from(name) else {
                continue;
            };
            entries.push(DirEntry {
                name,
                is_dir: meta.is_dir(),
                size: u32::try_from(meta.len()).unwrap_or(u32::MAX),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(LocalDir { entries: entries.into_iter() })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::storage::{Directory, File, Storage};
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn local_storage_read_full_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("test.wav"), b"hello world").unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let mut file = storage.open_file("/test.wav", OpenMode::Read).await.unwrap();
        let mut buf = [0u8; 11];
        let n = file.read(&mut buf).await.unwrap();
        assert_eq!(n, 11);
        assert_eq!(&buf, b"hello world");
    }

    #[tokio::test]
    async fn local_storage_size_matches() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("size.mp3"), [0u8; 64]).unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let file = storage.open_file("/size.mp3", OpenMode::Read).await.unwrap();
        assert_eq!(file.size(), 64);
    }

    #[tokio::test]
    async fn local_storage_write_truncates() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("playlist.cache"), b"old contents that are long").unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let mut file = storage.open_file("/playlist.cache", OpenMode::Write).await.unwrap();
        file.write(b"V1\n").await.unwrap();
        drop(file);
        assert_eq!(fs::read(tmp.path().join("playlist.cache")).unwrap(), b"V1\n");
    }

    #[tokio::test]
    async fn local_storage_exists_true() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("exists.wav"), b"x").unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        assert!(storage.exists("/exists.wav").await.unwrap());
    }

    #[tokio::test]
    async fn local_storage_exists_false() {
        let tmp = TempDir::new().unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        assert!(!storage.exists("/missing.wav").await.unwrap());
    }

    #[tokio::test]
    async fn local_storage_root_listing_is_sorted_and_flags_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.wav"), [0u8; 3]).unwrap();
        fs::write(tmp.path().join("a.mp3"), [0u8; 5]).unwrap();
        fs::create_dir(tmp.path().join("albums")).unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let mut dir = storage.open_root().await.unwrap();

        let first = dir.next_entry().await.unwrap().unwrap();
        assert_eq!(first.name.as_str(), "a.mp3");
        assert_eq!(first.size, 5);
        assert!(!first.is_dir);

        let second = dir.next_entry().await.unwrap().unwrap();
        assert_eq!(second.name.as_str(), "albums");
        assert!(second.is_dir);

        let third = dir.next_entry().await.unwrap().unwrap();
        assert_eq!(third.name.as_str(), "b.wav");

        assert!(dir.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn local_storage_missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let mut storage = LocalFileStorage::new(missing.to_str().unwrap());
        assert!(storage.open_root().await.is_err());
    }
}
