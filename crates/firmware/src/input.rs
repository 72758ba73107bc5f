//! Button debouncing.
//!
//! The panel is sampled once per loop iteration. A press is recognized on
//! the rising edge only, and only when the same button has not produced a
//! press within [`DebounceConfig::min_press_interval`]. Holding a button
//! never repeats.

use embassy_time::Instant;
use platform::{Button, ButtonPanel};

use crate::command::Command;
use crate::config::DebounceConfig;

/// Action bound to each front-panel button.
pub const fn button_command(button: Button) -> Command {
    match button {
        Button::Previous => Command::Previous,
        Button::Next => Command::Next,
        Button::Restart => Command::Restart,
        Button::Stop => Command::Stop,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ButtonTrack {
    was_pressed: bool,
    last_press: Option<Instant>,
}

/// Edge detector and press spacer for the four panel buttons.
#[derive(Debug)]
pub struct ButtonPoller {
    config: DebounceConfig,
    buttons: [ButtonTrack; Button::ALL.len()],
}

impl ButtonPoller {
    /// Poller with no button held and no press history.
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            buttons: [ButtonTrack::default(); Button::ALL.len()],
        }
    }

    /// Sample every button and return the commands for recognized presses,
    /// in panel order.
    pub fn poll<B: ButtonPanel>(&mut self, panel: &mut B, now: Instant) -> heapless::Vec<Command, 4> {
        let mut commands = heapless::Vec::new();
        for button in Button::ALL {
            let pressed = panel.is_pressed(button);
            let Some(track) = self.buttons.get_mut(button.index()) else {
                continue;
            };
            let rising = pressed && !track.was_pressed;
            track.was_pressed = pressed;
            if !rising {
                continue;
            }
            let spaced = track.last_press.map_or(true, |last| {
                now.checked_duration_since(last)
                    .is_some_and(|elapsed| elapsed >= self.config.min_press_interval)
            });
            if spaced {
                track.last_press = Some(now);
                tracing::debug!("button {} pressed", button.index());
                // Capacity equals the button count.
                let _ = commands.push(button_command(button));
            }
        }
        commands
    }
}
