//! Text command parsing.
//!
//! Both the serial console and the remote channel feed lines through
//! [`parse_line`] and [`Command::from_parts`], so the two surfaces accept
//! exactly the same language.

/// One user command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `n`
    Next,
    /// `p`
    Previous,
    /// `s`
    Stop,
    /// `r`
    Restart,
    /// `c`: rescan the card and rewrite the cache
    Rescan,
    /// `l`
    List,
    /// `+`
    VolumeUp,
    /// `-`
    VolumeDown,
    /// `g<digits>`: 1-based track number as typed; `None` when no argument
    GoTo(Option<i64>),
    /// `i`
    Info,
    /// `h` or `?`
    Help,
    /// Anything else
    Unknown(char),
}

impl Command {
    /// Map a command letter and its argument to a command.
    pub fn from_parts(letter: char, arg: &str) -> Self {
        match letter {
            'n' | 'N' => Self::Next,
            'p' | 'P' => Self::Previous,
            's' | 'S' => Self::Stop,
            'r' | 'R' => Self::Restart,
            'c' | 'C' => Self::Rescan,
            'l' | 'L' => Self::List,
            '+' => Self::VolumeUp,
            '-' => Self::VolumeDown,
            'g' => Self::GoTo((!arg.is_empty()).then(|| leading_int(arg))),
            'i' => Self::Info,
            'h' | 'H' | '?' => Self::Help,
            other => Self::Unknown(other),
        }
    }
}

/// Split a line into its command letter and trimmed argument.
///
/// Returns `None` for blank lines.
pub fn parse_line(text: &str) -> Option<(char, &str)> {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    let letter = chars.next()?;
    Some((letter, chars.as_str().trim()))
}

/// Parse a full line into a command.
pub fn parse_command(text: &str) -> Option<Command> {
    parse_line(text).map(|(letter, arg)| Command::from_parts(letter, arg))
}

/// Integer value of the leading digits of `text`, 0 when there are none.
fn leading_int(text: &str) -> i64 {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b.wrapping_sub(b'0'))));
    if negative {
        value.saturating_neg()
    } else {
        value
    }
}

/// 0-based index for a typed 1-based track number, if it is in range.
pub fn track_index(number: i64, playlist_len: usize) -> Option<usize> {
    let index = usize::try_from(number.checked_sub(1)?).ok()?;
    (index < playlist_len).then_some(index)
}
