//! Button panel abstraction

/// Physical buttons on the front panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Previous track
    Previous,
    /// Next track
    Next,
    /// Restart the current track
    Restart,
    /// Stop playback
    Stop,
}

impl Button {
    /// Every button, in panel order.
    pub const ALL: [Button; 4] = [Button::Previous, Button::Next, Button::Restart, Button::Stop];

    /// Position of this button in [`Button::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Button::Previous => 0,
            Button::Next => 1,
            Button::Restart => 2,
            Button::Stop => 3,
        }
    }
}

/// Raw level sampling of the panel (active-low pins with pull-ups on hardware).
///
/// No debouncing happens here; edge detection and press spacing are the
/// firmware's job.
pub trait ButtonPanel {
    /// `true` while the button is held down
    fn is_pressed(&mut self, button: Button) -> bool;
}

#[cfg(test)]
mod tests {
    use super::Button;

    #[test]
    fn index_matches_position_in_all() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }
}
