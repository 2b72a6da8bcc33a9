//! # Input State
//!
//! This module defines the input state types used by the input manager.
//! It provides enums and structs for representing the state of input devices.

use std::collections::HashMap;
use winit::{event::MouseButton, keyboard::KeyCode};

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed this frame
    Pressed,
    /// Key/button has been held down for multiple frames
    Held,
    /// Key/button was just released this frame
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Determines if the input was just pressed this frame
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Derives the transition from the previous and current down states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of the input gathered since the previous tick.
///
/// Keys carry their state transition; mouse buttons are reported as the list of
/// presses in the order they happened, so a click that is pressed and released
/// between two ticks is still seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedInputState {
    /// Transition state of every key that was down this tick or the previous one
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// Mouse button presses since the last tick, oldest first
    pub mouse_clicks: Vec<MouseButton>,

    /// Accumulated pointer motion since the last tick (x, y)
    pub mouse_delta: Option<(f64, f64)>,
}

impl ProcessedInputState {
    /// Gets the state of a keyboard key
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// Whether any of `keys` is down
    pub fn any_active(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|key| self.get_key_state(*key).is_active())
    }

    /// Mouse button presses since the last tick
    pub fn get_mouse_clicks(&self) -> &[MouseButton] {
        &self.mouse_clicks
    }

    /// Gets the mouse movement delta since the last frame
    pub fn get_mouse_delta(&self) -> Option<(f64, f64)> {
        self.mouse_delta
    }
}
