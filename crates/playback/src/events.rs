//! Playback notices reported by the controller.
//!
//! The controller never writes text itself; it hands each [`PlaybackEvent`]
//! to an [`EventSink`], and the firmware renders them through its output
//! sink so the console and the remote peer see the same lines.

use core::fmt;

/// User-visible playback notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent<'a> {
    /// A switch to `index` (0-based) is starting
    Loading {
        /// Target index
        index: usize,
        /// Target path
        path: &'a str,
    },
    /// Opening the file failed on the given 1-based attempt
    OpenRetry {
        /// Attempt number
        attempt: u8,
    },
    /// The generator refused the file on the given 1-based attempt
    GeneratorRetry {
        /// Attempt number
        attempt: u8,
    },
    /// Decoding started
    Started,
    /// Every attempt failed; the session is in `Error`
    LoadFailed,
    /// Switch rejected by the minimum spacing
    TooFast,
    /// Requested index is not in the playlist
    InvalidIndex,
    /// End of stream reached; auto-advancing
    TrackEnded,
    /// Auto/explicit next failed; playback stopped
    NextFailed,
    /// Previous failed; the session stays where it was
    PreviousFailed,
    /// Health check is moving the session from `Error` to `Stopped`
    Recovering,
}

impl fmt::Display for PlaybackEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading { index, path } => {
                write!(f, "Loading [{}]: {}", index.saturating_add(1), path)
            }
            Self::OpenRetry { attempt } => write!(f, "File open failed, retry {attempt}"),
            Self::GeneratorRetry { attempt } => write!(f, "Generator failed, retry {attempt}"),
            Self::Started => f.write_str("Playback started"),
            Self::LoadFailed => f.write_str("File load failed completely"),
            Self::TooFast => f.write_str("Switch too fast, skipping"),
            Self::InvalidIndex => f.write_str("Invalid file index"),
            Self::TrackEnded => f.write_str("Song ended, playing next"),
            Self::NextFailed => f.write_str("Next song failed, stopping playback"),
            Self::PreviousFailed => f.write_str("Previous song failed, staying on current"),
            Self::Recovering => f.write_str("Recovering from error state"),
        }
    }
}

/// Receiver of [`PlaybackEvent`]s.
pub trait EventSink {
    /// Handle one notice
    fn notify(&mut self, event: PlaybackEvent<'_>);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&mut self, _event: PlaybackEvent<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_is_one_based() {
        let event = PlaybackEvent::Loading { index: 0, path: "/a.mp3" };
        assert_eq!(event.to_string(), "Loading [1]: /a.mp3");
    }

    #[test]
    fn test_retry_texts() {
        assert_eq!(PlaybackEvent::OpenRetry { attempt: 2 }.to_string(), "File open failed, retry 2");
        assert_eq!(
            PlaybackEvent::GeneratorRetry { attempt: 3 }.to_string(),
            "Generator failed, retry 3"
        );
    }
}
