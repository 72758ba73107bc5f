//! Music library management: root scan, playlist cache, format sniffing.
//!
//! # Modules
//!
//! - [`track`]: `PlaylistEntry` record and `EntryKind` enum
//! - [`index`]: `Playlist` fixed-capacity, order-significant catalogue
//! - [`scanner`]: root directory walk and extension filtering
//! - [`cache`]: `/playlist.cache` load/save
//! - [`metadata`]: magic-byte format detection

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]
#![allow(missing_docs)]

pub mod cache;
pub mod index;
pub mod metadata;
pub mod scanner;
pub mod track;

// Top-level re-exports for convenience
pub use cache::{CacheError, CacheWarning, LoadReport, PlaylistCache};
pub use index::{IndexError, Playlist};
pub use metadata::detect_kind;
pub use scanner::{LibraryScanner, ScanError};
pub use track::{EntryKind, EntryPath, PlaylistEntry};
