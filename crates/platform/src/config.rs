//! Application configuration and constants
//!
//! Central values shared across crates. Tunable timing lives in the
//! `PlaybackConfig` / `PlayerConfig` structs; everything here is fixed by the
//! storage format or the hardware.

/// The application name
pub const APP_NAME: &str = "SoulAudio Player";

/// Name advertised over the remote channel
pub const DEVICE_NAME: &str = "SoulAudio_Player";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Absolute path of the playlist cache on the card
pub const CACHE_FILE_PATH: &str = "/playlist.cache";

/// Maximum number of playlist entries
pub const MAX_FILES: usize = 300;

/// Maximum byte length of a stored playlist path
pub const MAX_PATH_LEN: usize = 127;

/// Notification payload limit of the remote channel
pub const REMOTE_CHUNK_LEN: usize = 20;

/// Entries shown by the `l` command before the "... and K more" suffix
pub const LIST_PAGE_LEN: usize = 30;

/// Boot banner
pub const fn banner() -> &'static str {
    "=== SoulAudio Player ==="
}
