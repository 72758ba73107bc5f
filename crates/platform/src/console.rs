//! Serial console abstraction (local text surface)

use heapless::String;

/// Longest command line accepted from any text source.
pub const MAX_LINE_LEN: usize = 128;

/// One line of command text.
pub type Line = String<MAX_LINE_LEN>;

/// Sink for local console text (USB serial on hardware, stdout on desktop).
pub trait ConsoleWriter {
    /// Write text as-is; newlines are part of `text`
    fn write_str(&mut self, text: &str);
}

/// Non-blocking source of command lines.
pub trait LineSource {
    /// Take the next complete line, if one is pending
    fn poll_line(&mut self) -> Option<Line>;
}
