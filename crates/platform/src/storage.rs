//! Storage abstraction for the removable card file system
//!
//! Mirrors the three primitives the player needs from the card driver:
//! root directory listing, opening a file by absolute path, and an
//! existence check. Paths are always absolute (`/name.ext`).

use heapless::String;

/// Maximum byte length of a name yielded by [`Directory::next_entry`].
pub const MAX_NAME_LEN: usize = 255;

/// How [`Storage::open_file`] opens a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing file for reading from the start.
    Read,
    /// Create the file, truncating any previous contents.
    Write,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name as reported by the driver (may or may not start with `/`).
    pub name: String<MAX_NAME_LEN>,
    /// `true` for sub-directories.
    pub is_dir: bool,
    /// File size in bytes (0 for directories).
    pub size: u32,
}

/// Storage trait for file system access
pub trait Storage {
    /// Error type
    type Error: core::fmt::Debug;
    /// File type
    type File: File<Error = Self::Error>;
    /// Directory iterator type
    type Dir: Directory<Error = Self::Error>;

    /// Open `path` in the given mode
    fn open_file(
        &mut self,
        path: &str,
        mode: OpenMode,
    ) -> impl core::future::Future<Output = Result<Self::File, Self::Error>>;

    /// Check if path exists
    fn exists(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<bool, Self::Error>>;

    /// Open the root directory for a non-recursive listing
    fn open_root(&mut self) -> impl core::future::Future<Output = Result<Self::Dir, Self::Error>>;
}

/// File trait for reading and writing files
///
/// Dropping a `File` closes it.
pub trait File {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read from current position. `Ok(0)` means end of file.
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Write at current position, returning the number of bytes accepted
    fn write(
        &mut self,
        buf: &[u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Get file size
    fn size(&self) -> u64;
}

/// Sequential directory listing, one entry per call (`openNextFile` style).
pub trait Directory {
    /// Error type
    type Error: core::fmt::Debug;

    /// Next entry, or `Ok(None)` once the listing is exhausted
    fn next_entry(
        &mut self,
    ) -> impl core::future::Future<Output = Result<Option<DirEntry>, Self::Error>>;
}
